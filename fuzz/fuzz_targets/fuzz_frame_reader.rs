#![no_main]

use std::io::Cursor;

use biff_records::{ReaderLimits, RecordFrameReader};
use libfuzzer_sys::fuzz_target;

const MAX_INPUT_BYTES: usize = 256 * 1024;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }
    let data = &data[..data.len().min(MAX_INPUT_BYTES)];

    // The first byte picks the sequence of reads; the rest is the stream.
    let selector = data[0];
    let Ok(mut r) = RecordFrameReader::with_limits(Cursor::new(&data[1..]), ReaderLimits::default())
    else {
        return;
    };

    let mut op = selector;
    while r.has_next_frame() {
        if r.advance_to_next_frame().is_err() {
            return;
        }
        r.set_auto_continue(selector & 0x80 == 0);
        let _ = match op % 6 {
            0 => r.read_u16().map(drop),
            1 => r.read_xnum().map(drop),
            2 => r.read_unicode_string().map(drop),
            3 => r.read_short_unicode_string().map(drop),
            4 => r.read_all_continued_remainder().map(drop),
            _ => r.skip_record(),
        };
        op = op.rotate_left(1).wrapping_add(1);
    }
});

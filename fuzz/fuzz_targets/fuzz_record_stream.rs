#![no_main]

use std::io::Cursor;

use biff_records::{FrameWriter, Record, RecordStream};
use libfuzzer_sys::fuzz_target;

const MAX_INPUT_BYTES: usize = 256 * 1024;

fuzz_target!(|data: &[u8]| {
    let data = &data[..data.len().min(MAX_INPUT_BYTES)];

    let Ok(stream) = RecordStream::new(Cursor::new(data)) else {
        return;
    };
    let records: Vec<Record> = stream.filter_map(Result::ok).collect();

    // Whatever decoded must re-encode and decode to the same records.
    let mut w = FrameWriter::new(Vec::new());
    for record in &records {
        if record.write_to(&mut w).is_err() {
            return;
        }
    }
    let Ok(reread) = biff_records::read_records(Cursor::new(w.into_inner())) else {
        panic!("re-encoded stream failed to decode");
    };
    assert_eq!(reread.len(), records.len());
});

use std::io::Cursor;

use proptest::prelude::*;

use crate::frame::{MAX_FRAME_PAYLOAD, RECORD_CONTINUE};
use crate::reader::RecordFrameReader;
use crate::records::RecordStream;
use crate::writer::{FrameWriter, PayloadBuilder};

const MAX_INPUT_LEN: usize = 32 * 1024;

fn frame(tag: u16, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&tag.to_le_bytes());
    out.extend_from_slice(&(payload.len() as u16).to_le_bytes());
    out.extend_from_slice(payload);
    out
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        // Deterministic so failures reproduce, and no regression files on disk.
        rng_seed: proptest::test_runner::RngSeed::Fixed(0),
        failure_persistence: None,
        .. ProptestConfig::default()
    })]

    #[test]
    fn record_stream_is_panic_free_on_arbitrary_input(buf in proptest::collection::vec(any::<u8>(), 0..=MAX_INPUT_LEN)) {
        prop_assert!(
            std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                let Ok(stream) = RecordStream::new(Cursor::new(&buf)) else {
                    return;
                };
                let mut seen = 0usize;
                for item in stream {
                    // Each item consumes at least one 4-byte frame header.
                    seen += 1;
                    assert!(seen <= buf.len() / 4 + 1);
                    let _ = item;
                }
            }))
            .is_ok(),
            "RecordStream panicked"
        );
    }

    #[test]
    fn typed_reads_reassemble_the_payload(
        payload in proptest::collection::vec(any::<u8>(), 0..=MAX_FRAME_PAYLOAD),
        widths in proptest::collection::vec(prop_oneof![Just(1usize), Just(2), Just(4), Just(8)], 0..64),
    ) {
        let stream = frame(0x0001, &payload);
        let mut r = RecordFrameReader::new(Cursor::new(stream)).unwrap();
        r.advance_to_next_frame().unwrap();

        let mut out = Vec::new();
        for width in widths {
            if r.remaining_in_frame() < width {
                break;
            }
            match width {
                1 => out.push(r.read_u8().unwrap()),
                2 => out.extend_from_slice(&r.read_u16().unwrap().to_le_bytes()),
                4 => out.extend_from_slice(&r.read_u32().unwrap().to_le_bytes()),
                _ => out.extend_from_slice(&r.read_xnum().unwrap().to_le_bytes()),
            }
        }
        out.extend_from_slice(&r.read_remainder_of_frame());

        prop_assert_eq!(out, payload);
        prop_assert_eq!(r.peek_next_tag(), 0);
    }

    #[test]
    fn continued_remainder_concatenates_fragments(
        fragments in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..64), 1..8),
    ) {
        let mut stream = frame(0x00EB, &fragments[0]);
        for fragment in &fragments[1..] {
            stream.extend_from_slice(&frame(RECORD_CONTINUE, fragment));
        }
        let mut r = RecordFrameReader::new(Cursor::new(stream)).unwrap();
        r.advance_to_next_frame().unwrap();
        prop_assert_eq!(r.read_all_continued_remainder().unwrap(), fragments.concat());
    }

    #[test]
    fn written_strings_read_back(value in "\\PC{0,200}", fragment_len in 8usize..64) {
        let mut payload = PayloadBuilder::with_fragment_len(fragment_len);
        payload.put_u16(0xABCD);
        payload.put_unicode_string(&value).unwrap();
        payload.put_u32(0x1234_5678);

        let mut w = FrameWriter::new(Vec::new());
        w.write_payload(0x0207, payload).unwrap();

        let mut r = RecordFrameReader::new(Cursor::new(w.into_inner())).unwrap();
        r.advance_to_next_frame().unwrap();
        prop_assert_eq!(r.read_u16().unwrap(), 0xABCD);
        // Compressed strings only hold U+0000..=U+00FF, which Latin-1 expansion maps back exactly.
        prop_assert_eq!(r.read_unicode_string().unwrap(), value);
        prop_assert_eq!(r.read_u32().unwrap(), 0x1234_5678);
        prop_assert!(!r.has_next_frame());
    }
}

use std::io::Cursor;

use biff_records::records::{
    BofRecord, BoundSheetRecord, CellHeader, CodepageRecord, DateModeRecord, LabelRecord,
    NumberRecord, SheetVisibility, SstRecord, StringRecord, UnknownRecord, BOF_WORKBOOK_GLOBALS,
    BOF_WORKSHEET,
};
use biff_records::{
    read_records, write_records, FrameFormatError, FrameWriter, Record, RecordStream, Xnum,
};
use pretty_assertions::assert_eq;

mod common;

use common::{
    bof, label_payload, push_record, sheet_stream, split_compressed_string, RECORD_BOF,
    RECORD_BOUNDSHEET, RECORD_CODEPAGE, RECORD_CONTINUE, RECORD_DATEMODE, RECORD_EOF, RECORD_FONT,
    RECORD_LABEL, RECORD_NUMBER, RECORD_SST,
};

fn globals_stream() -> Vec<u8> {
    let mut out = Vec::new();
    push_record(&mut out, RECORD_BOF, &bof(BOF_WORKBOOK_GLOBALS));
    push_record(&mut out, RECORD_CODEPAGE, &1252u16.to_le_bytes());
    push_record(&mut out, RECORD_DATEMODE, &1u16.to_le_bytes());

    let mut sheet = Vec::new();
    sheet.extend_from_slice(&0x0000_1234u32.to_le_bytes());
    sheet.push(1); // hidden
    sheet.push(0); // worksheet
    sheet.push(6);
    sheet.push(0);
    sheet.extend_from_slice(b"Sheet1");
    push_record(&mut out, RECORD_BOUNDSHEET, &sheet);
    push_record(&mut out, RECORD_EOF, &[]);
    out
}

#[test]
fn decodes_workbook_globals() {
    let records = read_records(Cursor::new(globals_stream())).expect("read globals");

    let Record::Bof(bof) = &records[0] else {
        panic!("expected BOF, got {:?}", records[0]);
    };
    assert_eq!(bof.substream_type, BOF_WORKBOOK_GLOBALS);
    assert_eq!(bof.substream_name(), "workbook");

    let Record::Codepage(codepage) = records[1] else {
        panic!("expected CODEPAGE, got {:?}", records[1]);
    };
    assert_eq!(codepage.encoding(), Some(encoding_rs::WINDOWS_1252));

    assert_eq!(records[2], Record::DateMode(DateModeRecord { flag: 1 }));

    let Record::BoundSheet(sheet) = &records[3] else {
        panic!("expected BOUNDSHEET, got {:?}", records[3]);
    };
    assert_eq!(sheet.name, "Sheet1");
    assert_eq!(sheet.stream_position, 0x1234);
    assert_eq!(sheet.visibility(), SheetVisibility::Hidden);

    assert_eq!(records[4], Record::Eof);
    assert_eq!(records.len(), 5);
}

#[test]
fn decodes_worksheet_cells() {
    let records = read_records(Cursor::new(sheet_stream())).expect("read sheet");
    assert_eq!(
        records,
        vec![
            Record::Bof(BofRecord::worksheet()),
            Record::Number(NumberRecord {
                cell: CellHeader {
                    row: 0,
                    col: 1,
                    xf_index: 15
                },
                value: Xnum::new(123.0),
            }),
            Record::Label(LabelRecord {
                cell: CellHeader {
                    row: 2,
                    col: 0,
                    xf_index: 15
                },
                value: "Hello".to_owned(),
            }),
            Record::Eof,
        ]
    );
}

#[test]
fn rewrites_stream_byte_for_byte() {
    let stream = sheet_stream();
    let records = read_records(Cursor::new(stream.clone())).unwrap();

    let mut w = FrameWriter::new(Vec::new());
    write_records(&mut w, &records).unwrap();
    assert_eq!(w.frames_written(), 4);
    assert_eq!(w.into_inner(), stream);
}

#[test]
fn unknown_records_and_orphan_continues_round_trip() {
    let mut stream = Vec::new();
    push_record(&mut stream, RECORD_FONT, &[1, 2, 3]);
    push_record(&mut stream, RECORD_CONTINUE, &[4, 5]);
    push_record(&mut stream, RECORD_EOF, &[]);

    let records = read_records(Cursor::new(stream.clone())).unwrap();
    assert_eq!(
        records,
        vec![
            Record::Unknown(UnknownRecord {
                tag: RECORD_FONT,
                data: vec![1, 2, 3],
            }),
            Record::Unknown(UnknownRecord {
                tag: RECORD_CONTINUE,
                data: vec![4, 5],
            }),
            Record::Eof,
        ]
    );

    let mut w = FrameWriter::new(Vec::new());
    write_records(&mut w, &records).unwrap();
    assert_eq!(w.into_inner(), stream);
}

#[test]
fn long_strings_span_continue_frames() {
    let compressed = "x".repeat(20_000);
    let wide = "\u{e9}\u{20ac}".repeat(3_000);
    let records = vec![
        Record::StringValue(StringRecord {
            value: compressed.clone(),
        }),
        Record::StringValue(StringRecord { value: wide.clone() }),
    ];

    let mut w = FrameWriter::new(Vec::new());
    write_records(&mut w, &records).unwrap();
    // 20_003 bytes need three frames; 12_003 bytes (plus a marker) need two.
    assert_eq!(w.frames_written(), 5);

    let mut stream = RecordStream::new(Cursor::new(w.into_inner())).unwrap();
    let decoded: Vec<Record> = stream.by_ref().collect::<Result<_, _>>().unwrap();
    assert_eq!(decoded, records);
    assert_eq!(stream.reader().frames_read(), 5);
}

#[test]
fn nan_payload_survives_round_trip() {
    let bits = 0x7FF8_0000_DEAD_BEEF_u64;
    let mut payload = common::cell(4, 2, 0);
    payload.extend_from_slice(&bits.to_le_bytes());
    let mut stream = Vec::new();
    push_record(&mut stream, RECORD_NUMBER, &payload);

    let records = read_records(Cursor::new(stream.clone())).unwrap();
    let Record::Number(number) = records[0] else {
        panic!("expected NUMBER, got {:?}", records[0]);
    };
    assert!(number.value.is_nan());
    assert_eq!(number.value.to_bits(), bits);

    let mut w = FrameWriter::new(Vec::new());
    write_records(&mut w, &records).unwrap();
    assert_eq!(w.into_inner(), stream);
}

#[test]
fn malformed_record_is_reported_and_skipped() {
    let mut stream = Vec::new();
    push_record(&mut stream, RECORD_BOF, &bof(BOF_WORKSHEET));
    // NUMBER is 14 bytes; this one stops inside the value.
    push_record(&mut stream, RECORD_NUMBER, &[0, 0, 1, 0, 0, 0, 0xAA]);
    push_record(&mut stream, RECORD_CONTINUE, &[0xBB]);
    push_record(&mut stream, RECORD_LABEL, &label_payload(1, 1, "after"));
    push_record(&mut stream, RECORD_EOF, &[]);

    let items: Vec<_> = RecordStream::new(Cursor::new(stream)).unwrap().collect();
    assert_eq!(items.len(), 4);
    assert!(matches!(items[0], Ok(Record::Bof(_))));
    assert!(matches!(
        items[1],
        Err(FrameFormatError::FrameOverrunWithoutContinuation { tag: RECORD_NUMBER, .. })
    ));
    match &items[2] {
        Ok(Record::Label(label)) => assert_eq!(label.value, "after"),
        other => panic!("expected LABEL, got {other:?}"),
    }
    assert!(matches!(items[3], Ok(Record::Eof)));
}

#[test]
fn truncated_stream_ends_iteration() {
    let mut stream = sheet_stream();
    stream.truncate(stream.len() - 6);

    let items: Vec<_> = RecordStream::new(Cursor::new(stream)).unwrap().collect();
    assert!(matches!(items[0], Ok(Record::Bof(_))));
    assert!(matches!(items[1], Ok(Record::Number(_))));
    assert!(matches!(
        items.last(),
        Some(Err(FrameFormatError::UnexpectedEndOfStream { .. }))
    ));
    assert_eq!(items.len(), 3);
}

#[test]
fn display_is_one_line_per_record() {
    let records = read_records(Cursor::new(globals_stream())).unwrap();
    let lines: Vec<String> = records.iter().map(ToString::to_string).collect();
    assert!(lines[0].starts_with("BOF version=0x0600 type=0x0005 (workbook)"));
    assert!(lines[1].starts_with("CODEPAGE 1252"));
    assert_eq!(lines[2], "DATEMODE 1904=true");
    assert!(lines[3].contains("Sheet1"), "{}", lines[3]);
    assert_eq!(lines[4], "EOF");

    let sheet = BoundSheetRecord {
        stream_position: 0,
        hidden_state: 0,
        sheet_type: 0,
        name: "S".to_owned(),
    };
    assert_eq!(sheet.visibility(), SheetVisibility::Visible);
    assert_eq!(CodepageRecord { codepage: 1 }.encoding(), None);
}

#[test]
fn shared_strings_span_continue_frames() {
    let strings: Vec<String> = (0..3_000).map(|i| format!("shared string #{i}")).collect();
    let records = vec![
        Record::Bof(BofRecord::workbook_globals()),
        Record::Sst(SstRecord::new(4_500, strings)),
        Record::Eof,
    ];

    let mut w = FrameWriter::new(Vec::new());
    write_records(&mut w, &records).unwrap();
    let bytes = w.into_inner();

    let mut stream = RecordStream::new(Cursor::new(bytes.clone())).unwrap();
    let decoded: Vec<Record> = stream.by_ref().collect::<Result<_, _>>().unwrap();
    assert_eq!(decoded, records);
    assert!(stream.reader().frames_read() > 5);

    let mut w = FrameWriter::new(Vec::new());
    write_records(&mut w, &decoded).unwrap();
    assert_eq!(w.into_inner(), bytes);
}

#[test]
fn shared_strings_from_hand_split_frames() {
    let (head_chars, tail_chars) = split_compressed_string("continued", 4);
    let mut head = Vec::new();
    head.extend_from_slice(&2u32.to_le_bytes());
    head.extend_from_slice(&2u32.to_le_bytes());
    head.extend_from_slice(&head_chars);
    let mut tail = tail_chars;
    tail.extend_from_slice(&common::compressed_string("next"));

    let mut stream = Vec::new();
    push_record(&mut stream, RECORD_SST, &head);
    push_record(&mut stream, RECORD_CONTINUE, &tail);
    push_record(&mut stream, RECORD_EOF, &[]);

    let records = read_records(Cursor::new(stream)).unwrap();
    assert_eq!(
        records,
        vec![
            Record::Sst(SstRecord::new(
                2,
                vec!["continued".to_owned(), "next".to_owned()]
            )),
            Record::Eof,
        ]
    );
}

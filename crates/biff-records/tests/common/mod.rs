#![allow(dead_code)]

use std::io::{Cursor, Write};

pub const RECORD_CONTINUE: u16 = 0x003C;
pub const RECORD_BOF: u16 = 0x0809;
pub const RECORD_EOF: u16 = 0x000A;
pub const RECORD_CODEPAGE: u16 = 0x0042;
pub const RECORD_DATEMODE: u16 = 0x0022;
pub const RECORD_BOUNDSHEET: u16 = 0x0085;
pub const RECORD_NUMBER: u16 = 0x0203;
pub const RECORD_LABEL: u16 = 0x0204;
pub const RECORD_STRING: u16 = 0x0207;
pub const RECORD_SST: u16 = 0x00FC;
pub const RECORD_FONT: u16 = 0x0031;

pub fn record(id: u16, data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    push_record(&mut out, id, data);
    out
}

pub fn push_record(out: &mut Vec<u8>, id: u16, data: &[u8]) {
    out.extend_from_slice(&id.to_le_bytes());
    out.extend_from_slice(&(data.len() as u16).to_le_bytes());
    out.extend_from_slice(data);
}

pub fn bof(dt: u16) -> [u8; 16] {
    let mut out = [0u8; 16];
    out[0..2].copy_from_slice(&0x0600u16.to_le_bytes());
    out[2..4].copy_from_slice(&dt.to_le_bytes());
    out[4..6].copy_from_slice(&0x0DBBu16.to_le_bytes());
    out[6..8].copy_from_slice(&0x07CCu16.to_le_bytes());
    out[12..16].copy_from_slice(&6u32.to_le_bytes());
    out
}

/// `XLUnicodeString` payload with compressed (8-bit) characters.
pub fn compressed_string(value: &str) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&(value.len() as u16).to_le_bytes());
    out.push(0);
    out.extend_from_slice(value.as_bytes());
    out
}

pub fn cell(row: u16, col: u16, xf: u16) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&row.to_le_bytes());
    out.extend_from_slice(&col.to_le_bytes());
    out.extend_from_slice(&xf.to_le_bytes());
    out
}

pub fn number_payload(row: u16, col: u16, value: f64) -> Vec<u8> {
    let mut out = cell(row, col, 15);
    out.extend_from_slice(&value.to_le_bytes());
    out
}

pub fn label_payload(row: u16, col: u16, value: &str) -> Vec<u8> {
    let mut out = cell(row, col, 15);
    out.extend_from_slice(&compressed_string(value));
    out
}

/// A small worksheet substream: BOF, one number, one label, EOF.
pub fn sheet_stream() -> Vec<u8> {
    let mut out = Vec::new();
    push_record(&mut out, RECORD_BOF, &bof(0x0010));
    push_record(&mut out, RECORD_NUMBER, &number_payload(0, 1, 123.0));
    push_record(&mut out, RECORD_LABEL, &label_payload(2, 0, "Hello"));
    push_record(&mut out, RECORD_EOF, &[]);
    out
}

/// Wrap `workbook_stream` in an OLE compound file under the `Workbook` stream name.
pub fn build_xls_bytes(workbook_stream: &[u8]) -> Vec<u8> {
    let cursor = Cursor::new(Vec::new());
    let mut ole = cfb::CompoundFile::create(cursor).expect("create cfb");
    {
        let mut stream = ole.create_stream("Workbook").expect("Workbook stream");
        stream.write_all(workbook_stream).expect("write Workbook stream");
    }
    ole.into_inner().into_inner()
}

/// `XLUnicodeString` header plus the first `split` characters (compressed), and the continuation
/// fragment holding the `0` marker and the rest.
pub fn split_compressed_string(value: &str, split: usize) -> (Vec<u8>, Vec<u8>) {
    let mut head = Vec::new();
    head.extend_from_slice(&(value.len() as u16).to_le_bytes());
    head.push(0);
    head.extend_from_slice(&value.as_bytes()[..split]);
    let mut tail = vec![0];
    tail.extend_from_slice(&value.as_bytes()[split..]);
    (head, tail)
}

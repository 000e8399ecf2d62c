//! Reader and writer for BIFF record streams (the framing used inside legacy Excel 97-2003
//! `.xls` workbooks).
//!
//! A BIFF sub-stream is a sequence of `(tag: u16, len: u16, payload)` frames. Payloads longer than
//! [`MAX_FRAME_PAYLOAD`] bytes continue in `CONTINUE` frames. This crate provides:
//! - [`RecordFrameReader`]: a cursor over the current frame with typed little-endian reads that
//!   step into `CONTINUE` frames, including the per-fragment marker byte used by continued strings
//! - [`PayloadBuilder`] / [`FrameWriter`]: the inverse, splitting payloads into frames
//! - [`records`]: a small set of typed records plus an `Unknown` fallback, and [`RecordStream`] to
//!   scan a stream record by record
//!
//! Cell values, formulas, styles and the OLE container are out of scope; see the `biff-dump`
//! binary for pulling a workbook stream out of an `.xls` file.

mod error;
pub mod frame;
mod options;
mod reader;
pub mod records;
mod writer;
mod xnum;

#[cfg(test)]
mod fuzz_tests;

pub use error::FrameFormatError;
pub use frame::{FrameHeader, END_OF_STREAM, FRAME_HEADER_LEN, MAX_FRAME_PAYLOAD, RECORD_CONTINUE};
pub use options::ReaderLimits;
pub use reader::RecordFrameReader;
pub use records::{read_records, write_records, Record, RecordStream};
pub use writer::{FrameWriter, PayloadBuilder};
pub use xnum::Xnum;

//! Typed records decoded from a [`RecordFrameReader`].
//!
//! [`Record`] is a closed set of variants, one per supported record id, with an
//! [`Record::Unknown`] fallback that keeps the raw bytes of anything else. Decoding dispatches on
//! the tag reported by [`RecordFrameReader::peek_next_tag`] before the frame is loaded.
//!
//! Known records consume exactly the fields they define; any bytes left in the head frame are
//! dropped. `CONTINUE` frames a record doesn't read itself surface as `Unknown` records with tag
//! `0x003C`, which keeps round-trips of unsupported layouts byte-identical.

use std::fmt;
use std::io::{self, Read, Write};

use crate::error::FrameFormatError;
use crate::frame::RECORD_CONTINUE;
use crate::reader::RecordFrameReader;
use crate::writer::{FrameWriter, PayloadBuilder};

mod bof;
mod cells;
mod globals;
mod sst;

pub use bof::{
    BofRecord, BIFF8_VERSION, BOF_CHART, BOF_MACRO_SHEET, BOF_VISUAL_BASIC_MODULE,
    BOF_WORKBOOK_GLOBALS, BOF_WORKSHEET, BOF_WORKSPACE,
};
pub use cells::{CellHeader, LabelRecord, NumberRecord, StringRecord};
pub use globals::{BoundSheetRecord, CodepageRecord, DateModeRecord, SheetVisibility};
pub use sst::SstRecord;

pub const RECORD_BOF: u16 = 0x0809;
pub const RECORD_EOF: u16 = 0x000A;
pub const RECORD_DATEMODE: u16 = 0x0022;
pub const RECORD_CODEPAGE: u16 = 0x0042;
pub const RECORD_BOUNDSHEET: u16 = 0x0085;
pub const RECORD_SST: u16 = 0x00FC;
pub const RECORD_NUMBER: u16 = 0x0203;
pub const RECORD_LABEL: u16 = 0x0204;
pub const RECORD_STRING: u16 = 0x0207;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRecord {
    pub tag: u16,
    pub data: Vec<u8>,
}

impl fmt::Display for UnknownRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = if self.tag == RECORD_CONTINUE {
            "CONTINUE"
        } else {
            "UNKNOWN"
        };
        write!(f, "{label} 0x{:04X} len={}", self.tag, self.data.len())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Bof(BofRecord),
    Eof,
    Codepage(CodepageRecord),
    DateMode(DateModeRecord),
    BoundSheet(BoundSheetRecord),
    Sst(SstRecord),
    Number(NumberRecord),
    Label(LabelRecord),
    StringValue(StringRecord),
    Unknown(UnknownRecord),
}

impl Record {
    /// Decode the frame just loaded into `r`, whose tag is `tag`.
    pub fn decode<R: Read>(
        tag: u16,
        r: &mut RecordFrameReader<R>,
    ) -> Result<Self, FrameFormatError> {
        Ok(match tag {
            RECORD_BOF => Record::Bof(BofRecord::read(r)?),
            RECORD_EOF => Record::Eof,
            RECORD_CODEPAGE => Record::Codepage(CodepageRecord::read(r)?),
            RECORD_DATEMODE => Record::DateMode(DateModeRecord::read(r)?),
            RECORD_BOUNDSHEET => Record::BoundSheet(BoundSheetRecord::read(r)?),
            RECORD_SST => Record::Sst(SstRecord::read(r)?),
            RECORD_NUMBER => Record::Number(NumberRecord::read(r)?),
            RECORD_LABEL => Record::Label(LabelRecord::read(r)?),
            RECORD_STRING => Record::StringValue(StringRecord::read(r)?),
            _ => Record::Unknown(UnknownRecord {
                tag,
                data: r.read_remainder_of_frame(),
            }),
        })
    }

    pub fn tag(&self) -> u16 {
        match self {
            Record::Bof(_) => RECORD_BOF,
            Record::Eof => RECORD_EOF,
            Record::Codepage(_) => RECORD_CODEPAGE,
            Record::DateMode(_) => RECORD_DATEMODE,
            Record::BoundSheet(_) => RECORD_BOUNDSHEET,
            Record::Sst(_) => RECORD_SST,
            Record::Number(_) => RECORD_NUMBER,
            Record::Label(_) => RECORD_LABEL,
            Record::StringValue(_) => RECORD_STRING,
            Record::Unknown(record) => record.tag,
        }
    }

    pub fn encode(&self, out: &mut PayloadBuilder) -> io::Result<()> {
        match self {
            Record::Bof(record) => record.encode(out),
            Record::Eof => Ok(()),
            Record::Codepage(record) => record.encode(out),
            Record::DateMode(record) => record.encode(out),
            Record::BoundSheet(record) => record.encode(out),
            Record::Sst(record) => record.encode(out),
            Record::Number(record) => record.encode(out),
            Record::Label(record) => record.encode(out),
            Record::StringValue(record) => record.encode(out),
            Record::Unknown(record) => {
                out.put_bytes(&record.data);
                Ok(())
            }
        }
    }

    pub fn write_to<W: Write>(&self, out: &mut FrameWriter<W>) -> io::Result<()> {
        let mut payload = PayloadBuilder::new();
        self.encode(&mut payload)?;
        out.write_payload(self.tag(), payload)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Record::Bof(record) => fmt::Display::fmt(record, f),
            Record::Eof => f.write_str("EOF"),
            Record::Codepage(record) => fmt::Display::fmt(record, f),
            Record::DateMode(record) => write!(f, "DATEMODE 1904={}", record.is_1904()),
            Record::BoundSheet(record) => fmt::Display::fmt(record, f),
            Record::Sst(record) => fmt::Display::fmt(record, f),
            Record::Number(record) => write!(f, "NUMBER {} = {}", record.cell, record.value),
            Record::Label(record) => write!(f, "LABEL {} = {:?}", record.cell, record.value),
            Record::StringValue(record) => write!(f, "STRING {:?}", record.value),
            Record::Unknown(record) => fmt::Display::fmt(record, f),
        }
    }
}

/// Iterator over the records of one stream.
///
/// A record that fails to decode is skipped together with its `CONTINUE` frames and reported as an
/// `Err`; iteration then resumes at the next record. Errors that leave the underlying reader off a
/// frame boundary end iteration.
pub struct RecordStream<R: Read> {
    reader: RecordFrameReader<R>,
    finished: bool,
}

impl<R: Read> RecordStream<R> {
    pub fn new(inner: R) -> Result<Self, FrameFormatError> {
        Ok(Self::from_reader(RecordFrameReader::new(inner)?))
    }

    pub fn from_reader(reader: RecordFrameReader<R>) -> Self {
        Self {
            reader,
            finished: false,
        }
    }

    pub fn reader(&self) -> &RecordFrameReader<R> {
        &self.reader
    }

    pub fn into_reader(self) -> RecordFrameReader<R> {
        self.reader
    }
}

impl<R: Read> Iterator for RecordStream<R> {
    type Item = Result<Record, FrameFormatError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished || !self.reader.has_next_frame() {
            return None;
        }

        let tag = self.reader.peek_next_tag();
        if let Err(err) = self.reader.advance_to_next_frame() {
            self.finished = true;
            return Some(Err(err));
        }

        match Record::decode(tag, &mut self.reader) {
            Ok(record) => {
                let trailing = self.reader.remaining_in_frame();
                if trailing > 0 {
                    log::debug!("ignoring {trailing} trailing bytes in record 0x{tag:04X}");
                    self.reader.read_remainder_of_frame();
                }
                Some(Ok(record))
            }
            Err(err) => {
                if err.is_stream_fatal() {
                    self.finished = true;
                    return Some(Err(err));
                }
                log::warn!("skipping malformed record 0x{tag:04X}: {err}");
                if let Err(skip_err) = self.reader.skip_record() {
                    log::warn!("cannot resynchronize after record 0x{tag:04X}: {skip_err}");
                    self.finished = true;
                }
                Some(Err(err))
            }
        }
    }
}

/// Decode every record in `inner`, stopping at the first error.
pub fn read_records<R: Read>(inner: R) -> Result<Vec<Record>, FrameFormatError> {
    RecordStream::new(inner)?.collect()
}

pub fn write_records<W: Write>(out: &mut FrameWriter<W>, records: &[Record]) -> io::Result<()> {
    for record in records {
        record.write_to(out)?;
    }
    Ok(())
}

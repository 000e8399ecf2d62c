//! Worksheet cell records.

use std::fmt;
use std::io::{self, Read};

use crate::error::FrameFormatError;
use crate::reader::RecordFrameReader;
use crate::writer::PayloadBuilder;
use crate::xnum::Xnum;

/// Row, column and XF index shared by every cell record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellHeader {
    pub row: u16,
    pub col: u16,
    pub xf_index: u16,
}

impl CellHeader {
    fn read<R: Read>(r: &mut RecordFrameReader<R>) -> Result<Self, FrameFormatError> {
        Ok(Self {
            row: r.read_u16()?,
            col: r.read_u16()?,
            xf_index: r.read_u16()?,
        })
    }

    fn encode(&self, out: &mut PayloadBuilder) {
        out.put_u16(self.row);
        out.put_u16(self.col);
        out.put_u16(self.xf_index);
    }
}

impl fmt::Display for CellHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}C{} xf={}", self.row, self.col, self.xf_index)
    }
}

/// `NUMBER`: a floating-point cell value. The value keeps its raw bits (see [`Xnum`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberRecord {
    pub cell: CellHeader,
    pub value: Xnum,
}

impl NumberRecord {
    pub fn read<R: Read>(r: &mut RecordFrameReader<R>) -> Result<Self, FrameFormatError> {
        let cell = CellHeader::read(r)?;
        let value = r.read_xnum()?;
        Ok(Self { cell, value })
    }

    pub fn encode(&self, out: &mut PayloadBuilder) -> io::Result<()> {
        self.cell.encode(out);
        out.put_xnum(self.value);
        Ok(())
    }
}

/// `LABEL`: a cell holding an inline string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRecord {
    pub cell: CellHeader,
    pub value: String,
}

impl LabelRecord {
    pub fn read<R: Read>(r: &mut RecordFrameReader<R>) -> Result<Self, FrameFormatError> {
        let cell = CellHeader::read(r)?;
        let value = r.read_unicode_string()?;
        Ok(Self { cell, value })
    }

    pub fn encode(&self, out: &mut PayloadBuilder) -> io::Result<()> {
        self.cell.encode(out);
        out.put_unicode_string(&self.value)
    }
}

/// `STRING`: cached string result of the preceding formula cell. Long values span `CONTINUE`
/// frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringRecord {
    pub value: String,
}

impl StringRecord {
    pub fn read<R: Read>(r: &mut RecordFrameReader<R>) -> Result<Self, FrameFormatError> {
        Ok(Self {
            value: r.read_unicode_string()?,
        })
    }

    pub fn encode(&self, out: &mut PayloadBuilder) -> io::Result<()> {
        out.put_unicode_string(&self.value)
    }
}

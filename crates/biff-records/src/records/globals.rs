//! Workbook-global records.

use std::fmt;
use std::io::{self, Read};

use encoding_rs::{
    Encoding, BIG5, EUC_KR, GBK, MACINTOSH, SHIFT_JIS, UTF_16LE, UTF_8, WINDOWS_1250,
    WINDOWS_1251, WINDOWS_1252, WINDOWS_1253, WINDOWS_1254, WINDOWS_1255, WINDOWS_1256,
    WINDOWS_1257, WINDOWS_1258, WINDOWS_874,
};

use crate::error::FrameFormatError;
use crate::reader::RecordFrameReader;
use crate::writer::PayloadBuilder;

/// `CODEPAGE`: code page used for 8-bit strings in the workbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodepageRecord {
    pub codepage: u16,
}

impl CodepageRecord {
    pub fn read<R: Read>(r: &mut RecordFrameReader<R>) -> Result<Self, FrameFormatError> {
        Ok(Self {
            codepage: r.read_u16()?,
        })
    }

    pub fn encode(&self, out: &mut PayloadBuilder) -> io::Result<()> {
        out.put_u16(self.codepage);
        Ok(())
    }

    /// The `encoding_rs` encoding for this code page, if it is one we know.
    pub fn encoding(&self) -> Option<&'static Encoding> {
        Some(match self.codepage as u32 {
            // 367 is US-ASCII; decode as 1252 which is a superset.
            367 => WINDOWS_1252,
            874 => WINDOWS_874,
            932 => SHIFT_JIS,
            936 => GBK,
            949 => EUC_KR,
            950 => BIG5,
            1200 => UTF_16LE,
            1250 => WINDOWS_1250,
            1251 => WINDOWS_1251,
            1252 | 32769 => WINDOWS_1252,
            1253 => WINDOWS_1253,
            1254 => WINDOWS_1254,
            1255 => WINDOWS_1255,
            1256 => WINDOWS_1256,
            1257 => WINDOWS_1257,
            1258 => WINDOWS_1258,
            10000 | 32768 => MACINTOSH,
            65001 => UTF_8,
            _ => return None,
        })
    }
}

impl fmt::Display for CodepageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.encoding() {
            Some(encoding) => write!(f, "CODEPAGE {} ({})", self.codepage, encoding.name()),
            None => write!(f, "CODEPAGE {}", self.codepage),
        }
    }
}

/// `DATEMODE` (a.k.a. `DATE1904`): which date system serial numbers use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateModeRecord {
    pub flag: u16,
}

impl DateModeRecord {
    pub fn read<R: Read>(r: &mut RecordFrameReader<R>) -> Result<Self, FrameFormatError> {
        Ok(Self {
            flag: r.read_u16()?,
        })
    }

    pub fn encode(&self, out: &mut PayloadBuilder) -> io::Result<()> {
        out.put_u16(self.flag);
        Ok(())
    }

    pub fn is_1904(&self) -> bool {
        self.flag != 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetVisibility {
    Visible,
    Hidden,
    VeryHidden,
    Other(u8),
}

/// `BOUNDSHEET`: sheet name, type and the stream offset of its BOF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundSheetRecord {
    pub stream_position: u32,
    pub hidden_state: u8,
    pub sheet_type: u8,
    pub name: String,
}

impl BoundSheetRecord {
    pub fn read<R: Read>(r: &mut RecordFrameReader<R>) -> Result<Self, FrameFormatError> {
        let stream_position = r.read_u32()?;
        let hidden_state = r.read_u8()?;
        let sheet_type = r.read_u8()?;
        let name = r.read_short_unicode_string()?;
        Ok(Self {
            stream_position,
            hidden_state,
            sheet_type,
            name,
        })
    }

    pub fn encode(&self, out: &mut PayloadBuilder) -> io::Result<()> {
        out.put_u32(self.stream_position);
        out.put_u8(self.hidden_state);
        out.put_u8(self.sheet_type);
        out.put_short_unicode_string(&self.name)
    }

    pub fn visibility(&self) -> SheetVisibility {
        match self.hidden_state & 0x03 {
            0 => SheetVisibility::Visible,
            1 => SheetVisibility::Hidden,
            2 => SheetVisibility::VeryHidden,
            other => SheetVisibility::Other(other),
        }
    }
}

impl fmt::Display for BoundSheetRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BOUNDSHEET {:?} at {} type=0x{:02X} {:?}",
            self.name,
            self.stream_position,
            self.sheet_type,
            self.visibility()
        )
    }
}

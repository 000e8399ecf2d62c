use std::fmt;
use std::io::{self, Read};

use crate::error::FrameFormatError;
use crate::reader::RecordFrameReader;
use crate::writer::PayloadBuilder;

/// BOF substream types (`dt`).
pub const BOF_WORKBOOK_GLOBALS: u16 = 0x0005;
pub const BOF_VISUAL_BASIC_MODULE: u16 = 0x0006;
pub const BOF_WORKSHEET: u16 = 0x0010;
pub const BOF_CHART: u16 = 0x0020;
pub const BOF_MACRO_SHEET: u16 = 0x0040;
pub const BOF_WORKSPACE: u16 = 0x0100;

/// BIFF8 version number stored in `vers`.
pub const BIFF8_VERSION: u16 = 0x0600;

/// Beginning of a substream.
///
/// BIFF5 writers only emit the first four fields; the trailing history/lowest-version words are
/// `None` in that case and are not written back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BofRecord {
    pub version: u16,
    pub substream_type: u16,
    pub build_id: u16,
    pub build_year: u16,
    pub history_flags: Option<u32>,
    pub lowest_version: Option<u32>,
}

impl BofRecord {
    pub fn workbook_globals() -> Self {
        Self::biff8(BOF_WORKBOOK_GLOBALS)
    }

    pub fn worksheet() -> Self {
        Self::biff8(BOF_WORKSHEET)
    }

    fn biff8(substream_type: u16) -> Self {
        Self {
            version: BIFF8_VERSION,
            substream_type,
            build_id: 0x0DBB,
            build_year: 0x07CC,
            history_flags: Some(0),
            lowest_version: Some(0x0006),
        }
    }

    pub fn read<R: Read>(r: &mut RecordFrameReader<R>) -> Result<Self, FrameFormatError> {
        let version = r.read_u16()?;
        let substream_type = r.read_u16()?;
        let build_id = r.read_u16()?;
        let build_year = r.read_u16()?;
        let (history_flags, lowest_version) = if r.remaining_in_frame() >= 8 {
            (Some(r.read_u32()?), Some(r.read_u32()?))
        } else {
            (None, None)
        };
        Ok(Self {
            version,
            substream_type,
            build_id,
            build_year,
            history_flags,
            lowest_version,
        })
    }

    pub fn encode(&self, out: &mut PayloadBuilder) -> io::Result<()> {
        out.put_u16(self.version);
        out.put_u16(self.substream_type);
        out.put_u16(self.build_id);
        out.put_u16(self.build_year);
        if let (Some(history), Some(lowest)) = (self.history_flags, self.lowest_version) {
            out.put_u32(history);
            out.put_u32(lowest);
        }
        Ok(())
    }

    pub fn substream_name(&self) -> &'static str {
        match self.substream_type {
            BOF_WORKBOOK_GLOBALS => "workbook",
            BOF_VISUAL_BASIC_MODULE => "vb module",
            BOF_WORKSHEET => "worksheet",
            BOF_CHART => "chart",
            BOF_MACRO_SHEET => "macro sheet",
            BOF_WORKSPACE => "workspace",
            _ => "unknown",
        }
    }
}

impl fmt::Display for BofRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BOF version=0x{:04X} type=0x{:04X} ({}) build={} year={}",
            self.version,
            self.substream_type,
            self.substream_name(),
            self.build_id,
            self.build_year
        )
    }
}

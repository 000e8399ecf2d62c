//! `SST`: the workbook's shared string table.
//!
//! The table is usually far larger than one frame. Its strings run on into `CONTINUE` frames: a
//! frame boundary that falls inside a string's character data is followed by the encoding marker
//! byte, while one that falls between strings (or inside a string header) is not.

use std::fmt;
use std::io::{self, Read};

use crate::error::FrameFormatError;
use crate::reader::RecordFrameReader;
use crate::writer::PayloadBuilder;

// Each entry takes at least 3 bytes (count + flags), which bounds the up-front reservation.
const MIN_ENTRY_LEN: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SstRecord {
    /// Number of string references in the workbook (`cstTotal`).
    pub total: u32,
    /// Number of entries in the table (`cstUnique`).
    pub unique: u32,
    pub strings: Vec<String>,
}

impl SstRecord {
    pub fn new(total: u32, strings: Vec<String>) -> Self {
        Self {
            total,
            unique: strings.len() as u32,
            strings,
        }
    }

    /// Read the header and `unique` strings, following `CONTINUE` frames as needed.
    pub fn read<R: Read>(r: &mut RecordFrameReader<R>) -> Result<Self, FrameFormatError> {
        let total = r.read_u32()?;
        let unique = r.read_u32()?;

        let mut strings = Vec::new();
        let hint = (unique as usize).min(r.remaining_in_frame() / MIN_ENTRY_LEN);
        strings
            .try_reserve_exact(hint)
            .map_err(|_| io::Error::new(io::ErrorKind::OutOfMemory, "shared strings"))?;
        for _ in 0..unique {
            strings.push(r.read_unicode_string()?);
        }

        Ok(Self {
            total,
            unique,
            strings,
        })
    }

    pub fn encode(&self, out: &mut PayloadBuilder) -> io::Result<()> {
        out.put_u32(self.total);
        out.put_u32(self.unique);
        for value in &self.strings {
            out.put_unicode_string(value)?;
        }
        Ok(())
    }
}

impl fmt::Display for SstRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SST total={} unique={}", self.total, self.unique)
    }
}

//! Cursor over a framed BIFF stream.
//!
//! [`RecordFrameReader`] holds exactly one frame payload at a time. Typed reads advance a cursor
//! through that payload and, when the frame is used up, step into a directly following
//! `CONTINUE` frame so callers see one logical record. Everything handed back to callers is owned,
//! so nothing returned by a read is invalidated by the next frame advance.

use std::io::{self, Read};

use crate::error::FrameFormatError;
use crate::frame::{END_OF_STREAM, MAX_FRAME_PAYLOAD, RECORD_CONTINUE};
use crate::options::ReaderLimits;
use crate::xnum::Xnum;

// Marker byte at the start of a `CONTINUE` frame that resumes the character data of a string.
const STRING_MARKER_COMPRESSED: u8 = 0x00;
const STRING_MARKER_WIDE: u8 = 0x01;

// Option flags of `XLUnicodeString` / `ShortXLUnicodeString`.
const STR_FLAG_HIGH_BYTE: u8 = 0x01;
const STR_FLAG_EXT: u8 = 0x04;
const STR_FLAG_RICH_TEXT: u8 = 0x08;

/// Cursor over the frames of one BIFF sub-stream.
///
/// The tag of the next frame is always known ([`peek_next_tag`](Self::peek_next_tag)), so callers
/// can pick a record decoder before loading the frame with
/// [`advance_to_next_frame`](Self::advance_to_next_frame). Reads are little-endian and step into
/// `CONTINUE` frames only at a frame boundary; see [`set_auto_continue`](Self::set_auto_continue).
pub struct RecordFrameReader<R: Read> {
    inner: R,
    buf: Vec<u8>,
    cursor: usize,
    current_tag: Option<u16>,
    next_tag: u16,
    auto_continue: bool,
    frames_read: usize,
    limits: ReaderLimits,
}

impl<R: Read> RecordFrameReader<R> {
    /// Create a reader and eagerly peek the tag of the first frame.
    pub fn new(inner: R) -> Result<Self, FrameFormatError> {
        Self::with_limits(inner, ReaderLimits::default())
    }

    pub fn with_limits(inner: R, limits: ReaderLimits) -> Result<Self, FrameFormatError> {
        let mut reader = Self {
            inner,
            buf: Vec::with_capacity(MAX_FRAME_PAYLOAD),
            cursor: 0,
            current_tag: None,
            next_tag: END_OF_STREAM,
            auto_continue: true,
            frames_read: 0,
            limits,
        };
        reader.next_tag = reader.read_next_tag()?;
        Ok(reader)
    }

    /// Tag of the frame that the next [`advance_to_next_frame`](Self::advance_to_next_frame) will
    /// load. Returns [`END_OF_STREAM`] once no frames remain.
    pub fn peek_next_tag(&self) -> u16 {
        self.next_tag
    }

    pub fn has_next_frame(&self) -> bool {
        self.next_tag != END_OF_STREAM
    }

    /// Whether the next frame continues the current record.
    pub fn is_continue_next(&self) -> bool {
        self.next_tag == RECORD_CONTINUE
    }

    /// Tag of the frame currently loaded, or `None` before the first advance.
    pub fn current_tag(&self) -> Option<u16> {
        self.current_tag
    }

    pub fn current_frame_len(&self) -> usize {
        self.buf.len()
    }

    /// Cursor position within the current frame.
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn remaining_in_frame(&self) -> usize {
        self.buf.len() - self.cursor
    }

    /// Number of frames loaded so far, continuations included.
    pub fn frames_read(&self) -> usize {
        self.frames_read
    }

    pub fn limits(&self) -> ReaderLimits {
        self.limits
    }

    pub fn set_auto_continue(&mut self, enabled: bool) {
        self.auto_continue = enabled;
    }

    pub fn auto_continue(&self) -> bool {
        self.auto_continue
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Load the next frame into the payload buffer.
    ///
    /// Resets the cursor, re-enables auto-continue and peeks the tag after the new frame.
    pub fn advance_to_next_frame(&mut self) -> Result<(), FrameFormatError> {
        let result = self.load_next_frame();
        if let Err(err) = &result {
            if err.is_stream_fatal() {
                // The underlying reader is no longer at a frame boundary.
                self.next_tag = END_OF_STREAM;
            }
        }
        result
    }

    fn load_next_frame(&mut self) -> Result<(), FrameFormatError> {
        let tag = self.next_tag;
        if tag == END_OF_STREAM {
            return Err(FrameFormatError::UnexpectedEndOfStream {
                context: "next frame header",
            });
        }

        let mut len_bytes = [0u8; 2];
        self.inner
            .read_exact(&mut len_bytes)
            .map_err(|err| FrameFormatError::from_read(err, "frame length"))?;
        let declared_len = u16::from_le_bytes(len_bytes) as usize;
        if declared_len > MAX_FRAME_PAYLOAD {
            return Err(FrameFormatError::FrameTooLarge {
                tag,
                declared_len,
                max: MAX_FRAME_PAYLOAD,
            });
        }

        self.current_tag = Some(tag);
        self.cursor = 0;
        self.buf.clear();
        self.buf.resize(declared_len, 0);
        self.inner
            .read_exact(&mut self.buf)
            .map_err(|err| FrameFormatError::from_read(err, "frame payload"))?;

        self.auto_continue = true;
        self.frames_read += 1;
        self.next_tag = self.read_next_tag()?;

        log::trace!(
            "frame #{} tag=0x{tag:04X} len={declared_len} next=0x{:04X}",
            self.frames_read,
            self.next_tag
        );
        Ok(())
    }

    fn read_next_tag(&mut self) -> Result<u16, FrameFormatError> {
        // A clean end of the underlying stream between frames is the normal way for a stream to
        // finish; a lone trailing byte is a truncated header.
        let mut lo = [0u8; 1];
        loop {
            match self.inner.read(&mut lo) {
                Ok(0) => return Ok(END_OF_STREAM),
                Ok(_) => break,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameFormatError::Io(err)),
            }
        }
        let mut hi = [0u8; 1];
        self.inner
            .read_exact(&mut hi)
            .map_err(|err| FrameFormatError::from_read(err, "frame tag"))?;
        Ok(u16::from_le_bytes([lo[0], hi[0]]))
    }

    fn overrun(&self, requested: usize) -> FrameFormatError {
        FrameFormatError::FrameOverrunWithoutContinuation {
            tag: self.current_tag.unwrap_or(END_OF_STREAM),
            frame_len: self.buf.len(),
            cursor: self.cursor,
            requested,
            next_tag: self.next_tag,
        }
    }

    /// Make sure `n` bytes can be taken from the current frame.
    ///
    /// Steps into a following `CONTINUE` frame only when the current frame is fully consumed, so a
    /// multi-byte value is never assembled from both sides of a frame boundary.
    fn ensure_available(&mut self, n: usize) -> Result<(), FrameFormatError> {
        if self.current_tag.is_none() {
            return Err(self.overrun(n));
        }
        loop {
            let remaining = self.remaining_in_frame();
            if remaining >= n {
                return Ok(());
            }
            if remaining != 0 || !self.auto_continue || !self.is_continue_next() {
                return Err(self.overrun(n));
            }
            log::debug!(
                "auto-continuing record 0x{:04X} after {} bytes",
                self.current_tag.unwrap_or(END_OF_STREAM),
                self.cursor
            );
            self.advance_to_next_frame()?;
        }
    }

    fn take(&mut self, n: usize) -> Result<&[u8], FrameFormatError> {
        self.ensure_available(n)?;
        let start = self.cursor;
        self.cursor += n;
        Ok(&self.buf[start..start + n])
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], FrameFormatError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, FrameFormatError> {
        Ok(self.take_array::<1>()?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8, FrameFormatError> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_u16(&mut self) -> Result<u16, FrameFormatError> {
        Ok(u16::from_le_bytes(self.take_array()?))
    }

    pub fn read_i16(&mut self) -> Result<i16, FrameFormatError> {
        Ok(i16::from_le_bytes(self.take_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, FrameFormatError> {
        Ok(u32::from_le_bytes(self.take_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32, FrameFormatError> {
        Ok(i32::from_le_bytes(self.take_array()?))
    }

    /// Read an 8-byte little-endian IEEE-754 double.
    pub fn read_f64(&mut self) -> Result<f64, FrameFormatError> {
        Ok(self.read_xnum()?.value())
    }

    /// Read an 8-byte double keeping its exact bit pattern (see [`Xnum`]).
    pub fn read_xnum(&mut self) -> Result<Xnum, FrameFormatError> {
        Ok(Xnum::from_le_bytes(self.take_array()?))
    }

    pub fn read_u16_array(&mut self, count: usize) -> Result<Vec<u16>, FrameFormatError> {
        let mut out = Vec::new();
        out.try_reserve_exact(count.min(MAX_FRAME_PAYLOAD / 2))
            .map_err(|_| io::Error::new(io::ErrorKind::OutOfMemory, "u16 array"))?;
        for _ in 0..count {
            out.push(self.read_u16()?);
        }
        Ok(out)
    }

    /// Read `n` raw bytes, stepping into `CONTINUE` frames at frame boundaries.
    pub fn read_bytes(&mut self, mut n: usize) -> Result<Vec<u8>, FrameFormatError> {
        let mut out = Vec::new();
        out.try_reserve_exact(n.min(MAX_FRAME_PAYLOAD))
            .map_err(|_| io::Error::new(io::ErrorKind::OutOfMemory, "byte buffer"))?;
        while n > 0 {
            self.ensure_available(1)?;
            let take = n.min(self.remaining_in_frame());
            out.extend_from_slice(self.take(take)?);
            n -= take;
        }
        Ok(out)
    }

    pub fn skip(&mut self, mut n: usize) -> Result<(), FrameFormatError> {
        while n > 0 {
            self.ensure_available(1)?;
            let take = n.min(self.remaining_in_frame());
            self.cursor += take;
            n -= take;
        }
        Ok(())
    }

    /// Read `char_count` characters of string data.
    ///
    /// Compressed characters (`wide == false`) are single bytes expanded as Latin-1; wide
    /// characters are UTF-16LE code units. If the characters run into a `CONTINUE` frame, that
    /// frame starts with a marker byte that must match the encoding being read (`0` compressed,
    /// `1` wide).
    pub fn read_fixed_length_string(
        &mut self,
        char_count: usize,
        wide: bool,
    ) -> Result<String, FrameFormatError> {
        let expected = if wide {
            STRING_MARKER_WIDE
        } else {
            STRING_MARKER_COMPRESSED
        };

        let mut narrow = String::new();
        let mut units: Vec<u16> = Vec::new();
        if wide {
            units
                .try_reserve_exact(char_count.min(MAX_FRAME_PAYLOAD / 2))
                .map_err(|_| io::Error::new(io::ErrorKind::OutOfMemory, "utf-16 string"))?;
        } else {
            narrow
                .try_reserve_exact(char_count.min(MAX_FRAME_PAYLOAD))
                .map_err(|_| io::Error::new(io::ErrorKind::OutOfMemory, "string"))?;
        }

        for _ in 0..char_count {
            // Every continuation the characters enter carries its own marker, including one that
            // holds nothing but the marker.
            while self.remaining_in_frame() == 0 && self.auto_continue && self.is_continue_next() {
                let tag = self.current_tag.unwrap_or(END_OF_STREAM);
                self.advance_to_next_frame()?;
                if self.remaining_in_frame() == 0 {
                    continue;
                }
                let found = self.read_u8()?;
                if found != expected {
                    return Err(FrameFormatError::ContinuationMarkerMismatch {
                        tag,
                        expected,
                        found,
                    });
                }
            }
            if wide {
                units.push(self.read_u16()?);
            } else {
                narrow.push(char::from(self.read_u8()?));
            }
        }

        if wide {
            Ok(String::from_utf16_lossy(&units))
        } else {
            Ok(narrow)
        }
    }

    /// BIFF8 `XLUnicodeString`: 16-bit character count followed by option flags.
    pub fn read_unicode_string(&mut self) -> Result<String, FrameFormatError> {
        let cch = self.read_u16()? as usize;
        self.read_string_body(cch)
    }

    /// BIFF8 `ShortXLUnicodeString`: 8-bit character count followed by option flags.
    pub fn read_short_unicode_string(&mut self) -> Result<String, FrameFormatError> {
        let cch = self.read_u8()? as usize;
        self.read_string_body(cch)
    }

    fn read_string_body(&mut self, cch: usize) -> Result<String, FrameFormatError> {
        let flags = self.read_u8()?;
        let runs = if flags & STR_FLAG_RICH_TEXT != 0 {
            self.read_u16()? as usize
        } else {
            0
        };
        let ext_size = if flags & STR_FLAG_EXT != 0 {
            self.read_u32()? as usize
        } else {
            0
        };

        let value = self.read_fixed_length_string(cch, flags & STR_FLAG_HIGH_BYTE != 0)?;

        // Formatting runs (4 bytes each) and the extended block are not interpreted.
        self.skip(runs * 4)?;
        self.skip(ext_size)?;
        Ok(value)
    }

    /// Consume and return whatever is left of the current frame. Never crosses into a
    /// continuation.
    pub fn read_remainder_of_frame(&mut self) -> Vec<u8> {
        let out = self.buf[self.cursor..].to_vec();
        self.cursor = self.buf.len();
        out
    }

    /// Consume the rest of the current frame and every directly following `CONTINUE` frame.
    pub fn read_all_continued_remainder(&mut self) -> Result<Vec<u8>, FrameFormatError> {
        let tag = self.current_tag.unwrap_or(END_OF_STREAM);
        let mut out = self.read_remainder_of_frame();
        let mut frames = 1usize;

        while self.is_continue_next() {
            if frames >= self.limits.max_continued_frames {
                return Err(FrameFormatError::ContinuedRecordTooLarge {
                    tag,
                    limit: format!("{} frames", self.limits.max_continued_frames),
                });
            }
            self.advance_to_next_frame()?;
            frames += 1;

            let new_len = out.len().saturating_add(self.remaining_in_frame());
            if new_len > self.limits.max_continued_bytes {
                return Err(FrameFormatError::ContinuedRecordTooLarge {
                    tag,
                    limit: format!("{} bytes", self.limits.max_continued_bytes),
                });
            }
            out.extend_from_slice(&self.buf[self.cursor..]);
            self.cursor = self.buf.len();
        }

        Ok(out)
    }

    /// Discard the rest of the current record, continuations included, leaving the reader
    /// positioned before the next record's head frame.
    pub fn skip_record(&mut self) -> Result<(), FrameFormatError> {
        self.cursor = self.buf.len();
        while self.is_continue_next() {
            self.advance_to_next_frame()?;
            self.cursor = self.buf.len();
        }
        Ok(())
    }
}

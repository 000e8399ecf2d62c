//! Serialize logical records back into frames.
//!
//! [`PayloadBuilder`] lays a record's fields out across as many frame-sized fragments as needed,
//! following the same rules [`RecordFrameReader`](crate::RecordFrameReader) expects when reading:
//! scalars never straddle a fragment boundary, and string characters that spill into a new
//! fragment are preceded by the `0`/`1` encoding marker byte. [`FrameWriter`] then emits the first
//! fragment under the record's tag and the rest as `CONTINUE` frames.

use std::io::{self, Write};

use crate::frame::{FrameHeader, MAX_FRAME_PAYLOAD, RECORD_CONTINUE};
use crate::xnum::Xnum;

// The widest scalar is an 8-byte double; fragments must be able to hold one.
const MIN_FRAGMENT_LEN: usize = 8;

#[derive(Debug, Clone)]
pub struct PayloadBuilder {
    fragments: Vec<Vec<u8>>,
    fragment_len: usize,
}

impl Default for PayloadBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PayloadBuilder {
    pub fn new() -> Self {
        Self::with_fragment_len(MAX_FRAME_PAYLOAD)
    }

    /// Builder with a smaller fragment size, clamped to `8..=MAX_FRAME_PAYLOAD`.
    pub fn with_fragment_len(fragment_len: usize) -> Self {
        Self {
            fragments: vec![Vec::new()],
            fragment_len: fragment_len.clamp(MIN_FRAGMENT_LEN, MAX_FRAME_PAYLOAD),
        }
    }

    /// Total payload bytes written so far, across all fragments.
    pub fn len(&self) -> usize {
        self.fragments.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn current(&mut self) -> &mut Vec<u8> {
        if self.fragments.is_empty() {
            self.fragments.push(Vec::new());
        }
        let last = self.fragments.len() - 1;
        &mut self.fragments[last]
    }

    fn has_room(&mut self, n: usize) -> bool {
        let limit = self.fragment_len;
        self.current().len() + n <= limit
    }

    fn start_fragment(&mut self) {
        self.fragments.push(Vec::new());
    }

    fn put_scalar(&mut self, bytes: &[u8]) {
        if !self.has_room(bytes.len()) {
            self.start_fragment();
        }
        self.current().extend_from_slice(bytes);
    }

    pub fn put_u8(&mut self, value: u8) {
        self.put_scalar(&[value]);
    }

    pub fn put_u16(&mut self, value: u16) {
        self.put_scalar(&value.to_le_bytes());
    }

    pub fn put_i16(&mut self, value: i16) {
        self.put_scalar(&value.to_le_bytes());
    }

    pub fn put_u32(&mut self, value: u32) {
        self.put_scalar(&value.to_le_bytes());
    }

    pub fn put_i32(&mut self, value: i32) {
        self.put_scalar(&value.to_le_bytes());
    }

    pub fn put_xnum(&mut self, value: Xnum) {
        self.put_scalar(&value.to_le_bytes());
    }

    /// Opaque bytes; split wherever a fragment fills up.
    pub fn put_bytes(&mut self, mut bytes: &[u8]) {
        while !bytes.is_empty() {
            if !self.has_room(1) {
                self.start_fragment();
            }
            let room = self.fragment_len - self.current().len();
            let (head, tail) = bytes.split_at(room.min(bytes.len()));
            self.current().extend_from_slice(head);
            bytes = tail;
        }
    }

    /// Character data only (no count or flags). Each fragment the characters spill into starts
    /// with the encoding marker byte.
    pub fn put_string_chars(&mut self, value: &str, wide: bool) {
        let unit = if wide { 2 } else { 1 };
        let marker = u8::from(wide);
        let emit = |builder: &mut Self, bytes: &[u8]| {
            if !builder.has_room(unit) {
                builder.start_fragment();
                builder.current().push(marker);
            }
            builder.current().extend_from_slice(bytes);
        };

        if wide {
            for cu in value.encode_utf16() {
                emit(self, &cu.to_le_bytes());
            }
        } else {
            for ch in value.chars() {
                let byte = u8::try_from(u32::from(ch)).unwrap_or(b'?');
                emit(self, &[byte]);
            }
        }
    }

    /// `XLUnicodeString`: 16-bit count, flags, characters. Strings with any character above
    /// U+00FF are written wide.
    pub fn put_unicode_string(&mut self, value: &str) -> io::Result<()> {
        let wide = needs_wide(value);
        let count = char_units(value, wide);
        let count = u16::try_from(count).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("string of {count} characters does not fit XLUnicodeString"),
            )
        })?;
        self.put_u16(count);
        self.put_u8(u8::from(wide));
        self.put_string_chars(value, wide);
        Ok(())
    }

    /// `ShortXLUnicodeString`: 8-bit count, flags, characters.
    pub fn put_short_unicode_string(&mut self, value: &str) -> io::Result<()> {
        let wide = needs_wide(value);
        let count = char_units(value, wide);
        let count = u8::try_from(count).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("string of {count} characters does not fit ShortXLUnicodeString"),
            )
        })?;
        self.put_u8(count);
        self.put_u8(u8::from(wide));
        self.put_string_chars(value, wide);
        Ok(())
    }

    pub fn finish(mut self) -> Vec<Vec<u8>> {
        if self.fragments.len() > 1 && self.fragments.last().is_some_and(Vec::is_empty) {
            self.fragments.pop();
        }
        self.fragments
    }
}

fn needs_wide(value: &str) -> bool {
    value.chars().any(|ch| u32::from(ch) > 0xFF)
}

fn char_units(value: &str, wide: bool) -> usize {
    if wide {
        value.encode_utf16().count()
    } else {
        value.chars().count()
    }
}

/// Writes `(tag, len, payload)` frames to an underlying writer.
pub struct FrameWriter<W: Write> {
    inner: W,
    frames_written: usize,
}

impl<W: Write> FrameWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            frames_written: 0,
        }
    }

    pub fn frames_written(&self) -> usize {
        self.frames_written
    }

    pub fn write_frame(&mut self, tag: u16, payload: &[u8]) -> io::Result<()> {
        if payload.len() > MAX_FRAME_PAYLOAD {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "frame 0x{tag:04X} payload of {} bytes exceeds {MAX_FRAME_PAYLOAD}",
                    payload.len()
                ),
            ));
        }
        let header = FrameHeader {
            tag,
            declared_len: payload.len() as u16,
        };
        self.inner.write_all(&header.to_bytes())?;
        self.inner.write_all(payload)?;
        self.frames_written += 1;
        Ok(())
    }

    /// Write the first fragment under `tag` and every following one as `CONTINUE`.
    pub fn write_fragments<B: AsRef<[u8]>>(&mut self, tag: u16, fragments: &[B]) -> io::Result<()> {
        let Some((first, rest)) = fragments.split_first() else {
            return self.write_frame(tag, &[]);
        };
        self.write_frame(tag, first.as_ref())?;
        for fragment in rest {
            self.write_frame(RECORD_CONTINUE, fragment.as_ref())?;
        }
        Ok(())
    }

    pub fn write_payload(&mut self, tag: u16, payload: PayloadBuilder) -> io::Result<()> {
        self.write_fragments(tag, &payload.finish())
    }

    /// Write an opaque payload, splitting it at the frame size limit.
    pub fn write_record(&mut self, tag: u16, payload: &[u8]) -> io::Result<()> {
        if payload.is_empty() {
            return self.write_frame(tag, &[]);
        }
        let chunks: Vec<&[u8]> = payload.chunks(MAX_FRAME_PAYLOAD).collect();
        self.write_fragments(tag, &chunks)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

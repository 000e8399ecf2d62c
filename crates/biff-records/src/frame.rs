//! Physical frame layout.
//!
//! Every frame in a BIFF sub-stream is `[tag: u16][len: u16][payload: len bytes]`, with both
//! header fields little-endian. Payloads larger than [`MAX_FRAME_PAYLOAD`] are split into a head
//! frame followed by one or more [`RECORD_CONTINUE`] frames.

/// Size of a frame header (tag + declared length).
pub const FRAME_HEADER_LEN: usize = 4;

/// Largest payload a single frame may declare.
pub const MAX_FRAME_PAYLOAD: usize = 8224;

/// BIFF `CONTINUE` record id.
pub const RECORD_CONTINUE: u16 = 0x003C;

/// Tag reported by [`crate::RecordFrameReader::peek_next_tag`] once the stream is exhausted.
pub const END_OF_STREAM: u16 = 0x0000;

/// A decoded frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub tag: u16,
    pub declared_len: u16,
}

impl FrameHeader {
    pub fn from_bytes(bytes: [u8; FRAME_HEADER_LEN]) -> Self {
        Self {
            tag: u16::from_le_bytes([bytes[0], bytes[1]]),
            declared_len: u16::from_le_bytes([bytes[2], bytes[3]]),
        }
    }

    pub fn to_bytes(self) -> [u8; FRAME_HEADER_LEN] {
        let tag = self.tag.to_le_bytes();
        let len = self.declared_len.to_le_bytes();
        [tag[0], tag[1], len[0], len[1]]
    }

    pub fn is_continue(self) -> bool {
        self.tag == RECORD_CONTINUE
    }

    /// Whether the declared length fits in a single frame.
    pub fn is_within_limit(self) -> bool {
        self.declared_len as usize <= MAX_FRAME_PAYLOAD
    }
}

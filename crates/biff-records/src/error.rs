use std::io;

use thiserror::Error;

/// Failure while reading a framed BIFF stream.
///
/// None of these are retried: bytes already pulled from the underlying reader cannot be put
/// back. Use [`FrameFormatError::is_stream_fatal`] to decide whether scanning can resume at the
/// next frame boundary.
#[derive(Debug, Error)]
pub enum FrameFormatError {
    #[error("frame 0x{tag:04X} declares {declared_len} bytes (max {max})")]
    FrameTooLarge {
        tag: u16,
        declared_len: usize,
        max: usize,
    },
    #[error("unexpected end of stream while reading {context}")]
    UnexpectedEndOfStream { context: &'static str },
    #[error(
        "read of {requested} bytes overruns frame 0x{tag:04X} (len={frame_len}, cursor={cursor}, next tag=0x{next_tag:04X})"
    )]
    FrameOverrunWithoutContinuation {
        tag: u16,
        frame_len: usize,
        cursor: usize,
        requested: usize,
        next_tag: u16,
    },
    #[error(
        "continuation of frame 0x{tag:04X} starts with string marker {found} (expected {expected})"
    )]
    ContinuationMarkerMismatch { tag: u16, expected: u8, found: u8 },
    #[error("continued record 0x{tag:04X} exceeds {limit}")]
    ContinuedRecordTooLarge { tag: u16, limit: String },
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl FrameFormatError {
    /// Returns true when the underlying stream position is no longer at a frame boundary (or the
    /// stream itself failed), so no further frames can be read.
    pub fn is_stream_fatal(&self) -> bool {
        matches!(
            self,
            FrameFormatError::FrameTooLarge { .. }
                | FrameFormatError::UnexpectedEndOfStream { .. }
                | FrameFormatError::Io(_)
        )
    }

    pub(crate) fn from_read(err: io::Error, context: &'static str) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            FrameFormatError::UnexpectedEndOfStream { context }
        } else {
            FrameFormatError::Io(err)
        }
    }
}

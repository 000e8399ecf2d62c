/// Caps applied when a reader reassembles a record from a run of `CONTINUE` frames.
///
/// A malformed stream can contain arbitrarily long runs of `CONTINUE` frames, which would
/// otherwise lead to unbounded allocations in
/// [`RecordFrameReader::read_all_continued_remainder`](crate::RecordFrameReader::read_all_continued_remainder).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderLimits {
    /// Upper bound on the reassembled payload size, in bytes.
    pub max_continued_bytes: usize,
    /// Upper bound on the number of frames (head + continuations) in one record.
    pub max_continued_frames: usize,
}

#[cfg(not(test))]
const DEFAULT_MAX_CONTINUED_BYTES: usize = 16 * 1024 * 1024;
// Keep unit tests fast with a much smaller cap.
#[cfg(test)]
const DEFAULT_MAX_CONTINUED_BYTES: usize = 64 * 1024;

#[cfg(not(test))]
const DEFAULT_MAX_CONTINUED_FRAMES: usize = 4096;
#[cfg(test)]
const DEFAULT_MAX_CONTINUED_FRAMES: usize = 64;

impl Default for ReaderLimits {
    fn default() -> Self {
        Self {
            max_continued_bytes: DEFAULT_MAX_CONTINUED_BYTES,
            max_continued_frames: DEFAULT_MAX_CONTINUED_FRAMES,
        }
    }
}

impl ReaderLimits {
    /// No caps beyond what the platform can allocate.
    pub fn unbounded() -> Self {
        Self {
            max_continued_bytes: usize::MAX,
            max_continued_frames: usize::MAX,
        }
    }
}

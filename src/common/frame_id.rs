//! Frame identifier type.

use std::fmt;

/// Identifies a frame in the buffer pool.
///
/// Frames form a fixed ring: the successor of frame `i` is `(i + 1) mod N`.
/// Replacement policy cursors are plain `FrameId`s into that ring.
///
/// # Example
/// ```
/// use pagepool::FrameId;
///
/// let frame_id = FrameId::new(2);
/// assert_eq!(frame_id.successor(3), FrameId::new(0));
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(pub usize);

impl FrameId {
    #[inline]
    pub fn new(id: usize) -> Self {
        FrameId(id)
    }

    /// The next frame in a ring of `ring_len` frames.
    #[inline]
    pub fn successor(self, ring_len: usize) -> Self {
        debug_assert!(ring_len > 0);
        FrameId((self.0 + 1) % ring_len)
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame({})", self.0)
    }
}

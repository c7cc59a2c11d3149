//! Frame Table - the fixed ring of frames backing a buffer pool.

use std::ops::Index;

use crate::buffer::Frame;
use crate::common::{FrameId, PageId};

/// A fixed-capacity ring of [`Frame`]s.
///
/// The ring order is the index order, fixed at construction: the successor
/// of frame `i` is `(i + 1) mod N`. Every replacement policy scans in this
/// order and the per-frame snapshots are reported in it.
///
/// The table holds no policy logic.
pub struct FrameTable {
    frames: Vec<Frame>,
}

impl FrameTable {
    /// Allocate `capacity` empty frames.
    pub fn new(capacity: usize) -> Self {
        Self {
            frames: (0..capacity).map(|_| Frame::new()).collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Ring successor of `frame_id`.
    #[inline]
    pub fn successor(&self, frame_id: FrameId) -> FrameId {
        frame_id.successor(self.frames.len())
    }

    /// All frames in ring order, starting at frame 0.
    pub fn iter(&self) -> impl Iterator<Item = (FrameId, &Frame)> {
        self.frames
            .iter()
            .enumerate()
            .map(|(i, frame)| (FrameId::new(i), frame))
    }

    /// One full turn of the ring starting at `start`.
    pub fn ring_from(&self, start: FrameId) -> impl Iterator<Item = (FrameId, &Frame)> {
        let len = self.frames.len();
        (0..len).map(move |step| {
            let id = FrameId::new((start.0 + step) % len);
            (id, &self.frames[id.0])
        })
    }

    /// Linear scan for the frame hosting `page_id`.
    pub fn find(&self, page_id: PageId) -> Option<FrameId> {
        if !page_id.is_valid() {
            return None;
        }
        self.iter()
            .find(|(_, frame)| frame.page_id() == page_id)
            .map(|(id, _)| id)
    }
}

impl Index<FrameId> for FrameTable {
    type Output = Frame;

    #[inline]
    fn index(&self, frame_id: FrameId) -> &Frame {
        &self.frames[frame_id.0]
    }
}

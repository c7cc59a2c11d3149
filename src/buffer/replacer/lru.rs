//! LRU (Least Recently Used) replacement policy.

use crate::buffer::FrameTable;
use crate::common::FrameId;

use super::{least_recently_used, Replacer};

/// Evicts the unpinned frame with the smallest `last_access` timestamp.
///
/// One full scan of the ring; ties go to the first frame in ring order.
/// Empty frames have never been accessed, so they are chosen first.
#[derive(Debug, Default)]
pub struct LruReplacer;

impl LruReplacer {
    pub fn new() -> Self {
        LruReplacer
    }
}

impl Replacer for LruReplacer {
    fn select_victim(&mut self, frames: &FrameTable) -> Option<FrameId> {
        least_recently_used(frames)
    }
}

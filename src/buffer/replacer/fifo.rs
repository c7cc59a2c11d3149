//! FIFO (First-In-First-Out) replacement policy.

use crate::buffer::FrameTable;
use crate::common::FrameId;

use super::Replacer;

/// Evicts the oldest insertion point that is not pinned.
///
/// A persistent cursor marks the oldest still-resident insertion. A miss
/// scans forward from the cursor (wrapping) and takes the first unpinned
/// frame; after the load the cursor moves to the victim's successor.
///
/// Pinned frames are skipped, not rotated to the back, so once frames are
/// pinned and unpinned out of order the eviction order is no longer strict
/// insertion order. That scan behavior is the contract.
#[derive(Debug, Default)]
pub struct FifoReplacer {
    cursor: FrameId,
}

impl FifoReplacer {
    pub fn new() -> Self {
        Self {
            cursor: FrameId::new(0),
        }
    }

    #[inline]
    pub fn cursor(&self) -> FrameId {
        self.cursor
    }
}

impl Replacer for FifoReplacer {
    fn select_victim(&mut self, frames: &FrameTable) -> Option<FrameId> {
        frames
            .ring_from(self.cursor)
            .find(|(_, frame)| !frame.is_pinned())
            .map(|(id, _)| id)
    }

    fn record_install(&mut self, frame_id: FrameId, frames: &FrameTable) {
        self.cursor = frames.successor(frame_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::replacer::test_util::load;
    use crate::common::PageId;

    #[test]
    fn test_fifo_fills_in_ring_order() {
        let frames = FrameTable::new(3);
        let mut replacer = FifoReplacer::new();

        for expected in 0..3 {
            let victim = replacer.select_victim(&frames).unwrap();
            assert_eq!(victim, FrameId::new(expected));
            frames[victim].install(PageId::new(expected as u32), 1);
            replacer.record_install(victim, &frames);
        }

        // Wrapped around to the oldest insertion
        assert_eq!(replacer.cursor(), FrameId::new(0));
    }

    #[test]
    fn test_fifo_skips_pinned() {
        let frames = FrameTable::new(3);
        load(&frames, 0, 1, 1);
        load(&frames, 1, 2, 2);
        load(&frames, 2, 3, 3);
        frames[FrameId::new(0)].pin();

        let mut replacer = FifoReplacer::new();
        assert_eq!(replacer.select_victim(&frames), Some(FrameId::new(1)));
    }

    #[test]
    fn test_fifo_cursor_moves_only_on_install() {
        let frames = FrameTable::new(3);
        load(&frames, 0, 1, 1);
        load(&frames, 1, 2, 2);
        load(&frames, 2, 3, 3);

        let mut replacer = FifoReplacer::new();
        assert_eq!(replacer.select_victim(&frames), Some(FrameId::new(0)));
        // Selection alone does not advance the cursor
        assert_eq!(replacer.select_victim(&frames), Some(FrameId::new(0)));

        replacer.record_install(FrameId::new(0), &frames);
        assert_eq!(replacer.select_victim(&frames), Some(FrameId::new(1)));
    }

    #[test]
    fn test_fifo_ignores_recency() {
        let frames = FrameTable::new(2);
        load(&frames, 0, 1, 1);
        load(&frames, 1, 2, 2);
        // A later hit on frame 0 changes nothing for FIFO
        frames[FrameId::new(0)].record_access(10);

        let mut replacer = FifoReplacer::new();
        assert_eq!(replacer.select_victim(&frames), Some(FrameId::new(0)));
    }

    #[test]
    fn test_fifo_all_pinned() {
        let frames = FrameTable::new(2);
        frames[FrameId::new(0)].install(PageId::new(1), 1);
        frames[FrameId::new(1)].install(PageId::new(2), 2);

        let mut replacer = FifoReplacer::new();
        assert_eq!(replacer.select_victim(&frames), None);
    }
}

//! CLOCK (second chance) replacement policy.

use crate::buffer::FrameTable;
use crate::common::FrameId;

use super::Replacer;

/// Sweeps a persistent hand around the ring.
///
/// At each step:
/// - pinned frame: advance
/// - unpinned with reference bit set: clear the bit, advance
/// - unpinned with reference bit clear: victim
///
/// The sweep gives up after `2 × N` steps, which is enough to clear every
/// bit once and come back around, so a fully pinned pool never hangs. After
/// a victim is found the hand rests on its successor.
#[derive(Debug, Default)]
pub struct ClockReplacer {
    hand: FrameId,
}

impl ClockReplacer {
    pub fn new() -> Self {
        Self {
            hand: FrameId::new(0),
        }
    }

    #[inline]
    pub fn hand(&self) -> FrameId {
        self.hand
    }
}

impl Replacer for ClockReplacer {
    fn select_victim(&mut self, frames: &FrameTable) -> Option<FrameId> {
        for _ in 0..2 * frames.len() {
            let frame = &frames[self.hand];
            if !frame.is_pinned() {
                if !frame.reference_bit() {
                    let victim = self.hand;
                    self.hand = frames.successor(victim);
                    return Some(victim);
                }
                frame.set_reference_bit(false);
            }
            self.hand = frames.successor(self.hand);
        }
        None
    }
}

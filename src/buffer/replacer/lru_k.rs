//! LRU-K replacement policy (K = 2).

use crate::buffer::FrameTable;
use crate::common::FrameId;

use super::{least_recently_used, Replacer};

/// Evicts the frame whose K-th most recent access is oldest.
///
/// Only unpinned frames with at least K recorded accesses compete under the
/// primary rule. Their score is the oldest entry of the bounded history,
/// which approximates the backward K-distance; ties go to the smaller
/// `last_access`, then to ring order.
///
/// If no unpinned frame has K accesses the policy falls back to plain LRU
/// over all unpinned frames.
#[derive(Debug, Default)]
pub struct LruKReplacer;

impl LruKReplacer {
    pub fn new() -> Self {
        LruKReplacer
    }
}

impl Replacer for LruKReplacer {
    fn select_victim(&mut self, frames: &FrameTable) -> Option<FrameId> {
        let mut victim: Option<(FrameId, u64, u64)> = None;

        for (id, frame) in frames.iter() {
            if frame.is_pinned() {
                continue;
            }
            let Some(kth) = frame.history().kth_most_recent() else {
                continue;
            };
            let last = frame.last_access();
            let better = match victim {
                None => true,
                Some((_, best_kth, best_last)) => (kth, last) < (best_kth, best_last),
            };
            if better {
                victim = Some((id, kth, last));
            }
        }

        match victim {
            Some((id, _, _)) => Some(id),
            None => least_recently_used(frames),
        }
    }
}

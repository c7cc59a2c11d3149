//! Eviction policy implementations (replacers).
//!
//! Four interchangeable policies, all scanning the [`FrameTable`] ring:
//! - [`FifoReplacer`] - persistent cursor, first unpinned frame from it
//! - [`LruReplacer`] - smallest `last_access`
//! - [`ClockReplacer`] - second chance with a persistent hand
//! - [`LruKReplacer`] - oldest K-th most recent access, LRU fallback
//!
//! The policy is chosen once per pool through [`ReplacementStrategy`] and
//! dispatched through the closed [`EvictionPolicy`] enum.
//!
//! A policy only chooses. It never touches a frame's bytes, dirty flag or
//! pin count; the buffer pool does that once a victim is picked.

mod clock;
mod fifo;
mod lru;
mod lru_k;

use std::fmt;
use std::str::FromStr;

pub use clock::ClockReplacer;
pub use fifo::FifoReplacer;
pub use lru::LruReplacer;
pub use lru_k::LruKReplacer;

use crate::buffer::FrameTable;
use crate::common::{Error, FrameId};

/// Victim selection over a frame table.
pub trait Replacer {
    /// Choose an unpinned frame to evict, or `None` if every frame is pinned.
    fn select_victim(&mut self, frames: &FrameTable) -> Option<FrameId>;

    /// Called after a page was successfully loaded into `frame_id`.
    fn record_install(&mut self, _frame_id: FrameId, _frames: &FrameTable) {}
}

/// Names the replacement algorithm of a buffer pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplacementStrategy {
    Fifo,
    Lru,
    Clock,
    LruK,
}

impl ReplacementStrategy {
    pub const ALL: [ReplacementStrategy; 4] = [
        ReplacementStrategy::Fifo,
        ReplacementStrategy::Lru,
        ReplacementStrategy::Clock,
        ReplacementStrategy::LruK,
    ];
}

impl fmt::Display for ReplacementStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReplacementStrategy::Fifo => "FIFO",
            ReplacementStrategy::Lru => "LRU",
            ReplacementStrategy::Clock => "CLOCK",
            ReplacementStrategy::LruK => "LRU-K",
        };
        f.write_str(name)
    }
}

impl FromStr for ReplacementStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FIFO" => Ok(ReplacementStrategy::Fifo),
            "LRU" => Ok(ReplacementStrategy::Lru),
            "CLOCK" => Ok(ReplacementStrategy::Clock),
            "LRU-K" | "LRUK" | "LRU_K" => Ok(ReplacementStrategy::LruK),
            _ => Err(Error::UnknownStrategy(s.to_string())),
        }
    }
}

/// The active replacer of a pool, with its persistent cursors.
#[derive(Debug)]
pub enum EvictionPolicy {
    Fifo(FifoReplacer),
    Lru(LruReplacer),
    Clock(ClockReplacer),
    LruK(LruKReplacer),
}

impl EvictionPolicy {
    pub fn new(strategy: ReplacementStrategy) -> Self {
        match strategy {
            ReplacementStrategy::Fifo => EvictionPolicy::Fifo(FifoReplacer::new()),
            ReplacementStrategy::Lru => EvictionPolicy::Lru(LruReplacer::new()),
            ReplacementStrategy::Clock => EvictionPolicy::Clock(ClockReplacer::new()),
            ReplacementStrategy::LruK => EvictionPolicy::LruK(LruKReplacer::new()),
        }
    }

    pub fn strategy(&self) -> ReplacementStrategy {
        match self {
            EvictionPolicy::Fifo(_) => ReplacementStrategy::Fifo,
            EvictionPolicy::Lru(_) => ReplacementStrategy::Lru,
            EvictionPolicy::Clock(_) => ReplacementStrategy::Clock,
            EvictionPolicy::LruK(_) => ReplacementStrategy::LruK,
        }
    }

    fn as_replacer(&mut self) -> &mut dyn Replacer {
        match self {
            EvictionPolicy::Fifo(r) => r,
            EvictionPolicy::Lru(r) => r,
            EvictionPolicy::Clock(r) => r,
            EvictionPolicy::LruK(r) => r,
        }
    }
}

impl Replacer for EvictionPolicy {
    fn select_victim(&mut self, frames: &FrameTable) -> Option<FrameId> {
        self.as_replacer().select_victim(frames)
    }

    fn record_install(&mut self, frame_id: FrameId, frames: &FrameTable) {
        self.as_replacer().record_install(frame_id, frames)
    }
}

/// Plain LRU over the unpinned frames: smallest `last_access`, first in
/// ring order on ties. Shared by [`LruReplacer`] and LRU-K's fallback.
pub(crate) fn least_recently_used(frames: &FrameTable) -> Option<FrameId> {
    let mut victim: Option<(FrameId, u64)> = None;
    for (id, frame) in frames.iter() {
        if frame.is_pinned() {
            continue;
        }
        let last = frame.last_access();
        match victim {
            Some((_, best)) if best <= last => {}
            _ => victim = Some((id, last)),
        }
    }
    victim.map(|(id, _)| id)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_parse() {
        assert_eq!(
            "fifo".parse::<ReplacementStrategy>().unwrap(),
            ReplacementStrategy::Fifo
        );
        assert_eq!(
            "LRU".parse::<ReplacementStrategy>().unwrap(),
            ReplacementStrategy::Lru
        );
        assert_eq!(
            " Clock ".parse::<ReplacementStrategy>().unwrap(),
            ReplacementStrategy::Clock
        );
        assert_eq!(
            "lru-k".parse::<ReplacementStrategy>().unwrap(),
            ReplacementStrategy::LruK
        );
        assert!(matches!(
            "MRU".parse::<ReplacementStrategy>(),
            Err(Error::UnknownStrategy(_))
        ));
    }

    #[test]
    fn test_strategy_display_round_trips() {
        for strategy in ReplacementStrategy::ALL {
            let parsed: ReplacementStrategy = strategy.to_string().parse().unwrap();
            assert_eq!(parsed, strategy);
        }
    }

    #[test]
    fn test_policy_reports_strategy() {
        for strategy in ReplacementStrategy::ALL {
            assert_eq!(EvictionPolicy::new(strategy).strategy(), strategy);
        }
    }

    #[test]
    fn test_every_policy_reports_saturation() {
        let frames = FrameTable::new(3);
        for i in 0..3 {
            frames[FrameId::new(i)].install(crate::common::PageId::new(i as u32), i as u64 + 1);
        }

        for strategy in ReplacementStrategy::ALL {
            let mut policy = EvictionPolicy::new(strategy);
            assert_eq!(policy.select_victim(&frames), None, "{}", strategy);
        }
    }

    #[test]
    fn test_least_recently_used_tie_goes_to_first() {
        let frames = FrameTable::new(3);
        test_util::load(&frames, 0, 10, 5);
        test_util::load(&frames, 1, 11, 5);
        test_util::load(&frames, 2, 12, 5);

        assert_eq!(least_recently_used(&frames), Some(FrameId::new(0)));
    }
}

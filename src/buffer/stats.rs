//! Buffer pool statistics tracking.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Cumulative counters kept by the buffer pool.
///
/// `pages_read` and `pages_written` are the pool's read and write I/O
/// counts. All counters are atomic so they can be read at any time without
/// taking the pool lock; `Relaxed` is enough because no counter is used to
/// synchronize anything else.
///
/// # Example
/// ```
/// use pagepool::BufferPoolStats;
///
/// let stats = BufferPoolStats::new();
/// stats.record_hit();
/// stats.record_miss();
/// assert_eq!(stats.snapshot().hit_rate(), 0.5);
/// ```
#[derive(Debug, Default)]
pub struct BufferPoolStats {
    /// Pins satisfied by a resident frame.
    cache_hits: AtomicU64,

    /// Pins that had to select a victim.
    cache_misses: AtomicU64,

    /// Resident pages displaced by a load.
    evictions: AtomicU64,

    /// Pages read from the page store.
    pages_read: AtomicU64,

    /// Pages written to the page store.
    pages_written: AtomicU64,
}

impl BufferPoolStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_read(&self) {
        self.pages_read.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_write(&self) {
        self.pages_written.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn pages_read(&self) -> u64 {
        self.pages_read.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn pages_written(&self) -> u64 {
        self.pages_written.load(Ordering::Relaxed)
    }

    /// Get a point-in-time copy of every counter.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            pages_read: self.pages_read.load(Ordering::Relaxed),
            pages_written: self.pages_written.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of buffer pool statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub evictions: u64,
    pub pages_read: u64,
    pub pages_written: u64,
}

impl StatsSnapshot {
    /// Fraction of pins served without I/O (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ hits: {}, misses: {}, evictions: {}, reads: {}, writes: {}, hit_rate: {:.2}% }}",
            self.cache_hits,
            self.cache_misses,
            self.evictions,
            self.pages_read,
            self.pages_written,
            self.hit_rate() * 100.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = BufferPoolStats::new();
        assert_eq!(stats.snapshot(), StatsSnapshot::default());
        assert_eq!(stats.snapshot().hit_rate(), 0.0);
    }

    #[test]
    fn test_stats_hit_rate() {
        let stats = BufferPoolStats::new();
        for _ in 0..7 {
            stats.record_hit();
        }
        for _ in 0..3 {
            stats.record_miss();
        }

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.cache_hits, 7);
        assert_eq!(snapshot.cache_misses, 3);
        assert_eq!(snapshot.hit_rate(), 0.7);
    }

    #[test]
    fn test_stats_io_counters() {
        let stats = BufferPoolStats::new();
        stats.record_read();
        stats.record_read();
        stats.record_write();
        stats.record_eviction();

        assert_eq!(stats.pages_read(), 2);
        assert_eq!(stats.pages_written(), 1);
        assert_eq!(stats.snapshot().evictions, 1);
    }

    #[test]
    fn test_stats_display() {
        let snapshot = StatsSnapshot {
            cache_hits: 80,
            cache_misses: 20,
            evictions: 5,
            pages_read: 20,
            pages_written: 4,
        };
        let display = format!("{}", snapshot);

        assert!(display.contains("hits: 80"));
        assert!(display.contains("misses: 20"));
        assert!(display.contains("writes: 4"));
        assert!(display.contains("80.00%"));
    }
}

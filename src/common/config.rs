//! Configuration constants and buffer pool settings.

use crate::buffer::replacer::ReplacementStrategy;
use crate::common::{Error, Result};

/// Size of a page in bytes (4KB).
///
/// Every page in the page file and every frame buffer is exactly this long.
/// The contents are opaque to the storage core.
///
/// # Memory Layout
/// With 4KB pages and 32-bit PageIds:
/// - Max pages: 2^32 - 1 (`u32::MAX` is reserved as the empty-frame sentinel)
/// - Max file size: just under 16TB
pub const PAGE_SIZE: usize = 4096;

/// Number of page slots addressable with a u32 PageId, sentinel included.
pub const MAX_PAGES: u64 = (u32::MAX as u64) + 1;

/// Maximum theoretical page file size in bytes.
pub const MAX_FILE_SIZE_BYTES: u64 = MAX_PAGES * PAGE_SIZE as u64;

/// History depth used by the LRU-K policy.
///
/// Each frame keeps the last `LRU_K` access timestamps. A frame with fewer
/// recorded accesses is not a candidate for LRU-K's primary rule.
pub const LRU_K: usize = 2;

/// Settings for a [`BufferPoolManager`](crate::buffer::BufferPoolManager).
///
/// The strategy is fixed for the lifetime of the pool.
///
/// # Example
/// ```
/// use pagepool::common::config::BufferPoolConfig;
/// use pagepool::buffer::replacer::ReplacementStrategy;
///
/// let config = BufferPoolConfig::new(3, ReplacementStrategy::Clock);
/// assert!(config.validate().is_ok());
/// assert!(BufferPoolConfig::new(0, ReplacementStrategy::Lru).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferPoolConfig {
    /// Number of frames in the pool.
    pub pool_size: usize,
    /// Victim selection algorithm.
    pub strategy: ReplacementStrategy,
}

impl BufferPoolConfig {
    pub fn new(pool_size: usize, strategy: ReplacementStrategy) -> Self {
        Self {
            pool_size,
            strategy,
        }
    }

    /// Check that the pool has at least one frame.
    pub fn validate(&self) -> Result<()> {
        if self.pool_size == 0 {
            return Err(Error::InvalidPoolSize(self.pool_size));
        }
        Ok(())
    }
}

impl Default for BufferPoolConfig {
    fn default() -> Self {
        Self::new(16, ReplacementStrategy::Lru)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_is_power_of_two() {
        assert!(PAGE_SIZE.is_power_of_two());
        assert_eq!(PAGE_SIZE, 4096);
    }

    #[test]
    fn test_max_file_size() {
        // 16TB = 16 * 1024^4 bytes
        let expected = 16 * 1024u64 * 1024 * 1024 * 1024;
        assert_eq!(MAX_FILE_SIZE_BYTES, expected);
    }

    #[test]
    fn test_config_validate() {
        assert!(BufferPoolConfig::new(1, ReplacementStrategy::Fifo)
            .validate()
            .is_ok());

        match BufferPoolConfig::new(0, ReplacementStrategy::LruK).validate() {
            Err(Error::InvalidPoolSize(0)) => {}
            other => panic!("Expected InvalidPoolSize, got {:?}", other),
        }
    }

    #[test]
    fn test_config_default() {
        let config = BufferPoolConfig::default();
        assert_eq!(config.pool_size, 16);
        assert_eq!(config.strategy, ReplacementStrategy::Lru);
    }
}

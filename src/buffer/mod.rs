//! Buffer pool management.
//!
//! The buffer pool is the in-memory cache between callers and the page
//! store. It manages a fixed ring of frames, each holding one page.
//!
//! # Components
//! - [`BufferPoolManager`] - The main page cache
//! - [`FrameTable`] / [`Frame`] - The frame ring and its per-frame metadata
//! - [`PageHandle`], [`PageReadGuard`] / [`PageWriteGuard`] - Pinned page access
//! - [`BufferPoolStats`] - Hit, miss, eviction and I/O counters
//! - [`replacer`] - FIFO, LRU, CLOCK and LRU-K victim selection

mod buffer_pool_manager;
mod frame;
mod frame_table;
mod page_guard;
pub mod replacer;
mod stats;

pub use buffer_pool_manager::BufferPoolManager;
pub use frame::{AccessHistory, Frame};
pub use frame_table::FrameTable;
pub use page_guard::{PageHandle, PageReadGuard, PageWriteGuard};
pub use stats::{BufferPoolStats, StatsSnapshot};

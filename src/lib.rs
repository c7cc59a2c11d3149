//! pagepool - a page store topped by a buffer pool with interchangeable
//! replacement policies.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                            pagepool                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │          Buffer Pool (buffer/)  [fixed per pool]        │   │
//! │  │   ┌─────────────────────────────────────────────────┐   │   │
//! │  │   │  Replacement: FIFO | LRU | CLOCK | LRU-K (K=2)  │   │   │
//! │  │   └─────────────────────────────────────────────────┘   │   │
//! │  │   BufferPoolManager + FrameTable + Statistics           │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │           Storage Layer (storage/)                       │   │
//! │  │           PageStore + Page (opaque 4KB blocks)           │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (PageId, FrameId, Error, config)
//! - [`buffer`] - Buffer pool management and replacement policies
//! - [`storage`] - Page file I/O
//!
//! # Quick Start
//! ```no_run
//! use pagepool::buffer::replacer::ReplacementStrategy;
//! use pagepool::common::config::BufferPoolConfig;
//! use pagepool::{BufferPoolManager, PageId, PageStore};
//!
//! let store = PageStore::create("my_pages.db").unwrap();
//! let config = BufferPoolConfig::new(3, ReplacementStrategy::Clock);
//! let bpm = BufferPoolManager::new(config, store).unwrap();
//!
//! {
//!     let mut guard = bpm.fetch_page_write(PageId::new(0)).unwrap();
//!     guard.as_mut_slice()[0] = 0xAB;
//! }
//!
//! bpm.shutdown().unwrap();
//! ```

pub mod buffer;
pub mod common;
pub mod storage;

// Re-export commonly used items at crate root for convenience
pub use common::config::PAGE_SIZE;
pub use common::{Error, FrameId, PageId, Result};

pub use buffer::{BufferPoolManager, BufferPoolStats, Frame, PageHandle, StatsSnapshot};
pub use storage::{Page, PageStore};

//! Storage layer - page file I/O.
//!
//! - [`PageStore`] - bounds-checked, append-only page file
//! - [`Page`] - the opaque fixed-size byte block

mod page;
mod page_store;

pub use page::Page;
pub use page_store::PageStore;

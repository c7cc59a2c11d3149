//! Page identifier type.

use std::fmt;

use crate::common::config::PAGE_SIZE;

/// Identifies a page in the page file by its index.
///
/// Page `n` lives at byte offset `n × PAGE_SIZE`. Indices are unsigned, so
/// a "negative page number" cannot be expressed.
///
/// # Example
/// ```
/// use pagepool::PageId;
///
/// let page_id = PageId::new(42);
/// assert!(page_id.is_valid());
/// assert_eq!(page_id.0, 42);
/// assert_eq!(page_id.file_offset(), 42 * 4096);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(pub u32);

impl PageId {
    /// Sentinel page ID held by empty frames.
    ///
    /// Reported by [`BufferPoolManager::frame_contents`](crate::buffer::BufferPoolManager::frame_contents)
    /// for frames that have never hosted a page.
    pub const INVALID: PageId = PageId(u32::MAX);

    #[inline]
    pub fn new(id: u32) -> Self {
        PageId(id)
    }

    /// Check if this page ID is a real page (not the sentinel value).
    #[inline]
    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }

    /// Byte offset of this page in the page file.
    #[inline]
    pub fn file_offset(&self) -> u64 {
        (self.0 as u64) * (PAGE_SIZE as u64)
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::INVALID {
            write!(f, "Page(EMPTY)")
        } else {
            write!(f, "Page({})", self.0)
        }
    }
}

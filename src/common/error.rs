//! Error types for pagepool.

use std::path::PathBuf;

use thiserror::Error;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// All errors raised by the page store and the buffer pool.
///
/// Page store errors propagate unchanged through the buffer pool; nothing
/// is retried.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from the underlying file that has no more specific meaning.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The page file does not exist.
    #[error("Page file {} not found", .0.display())]
    FileNotFound(PathBuf),

    /// Tried to create a page file that is already there.
    #[error("Page file {} already exists", .0.display())]
    FileExists(PathBuf),

    /// The file holds more pages than a `PageId` can address.
    #[error("Page file {} has more pages than a page ID can address", .0.display())]
    FileTooLarge(PathBuf),

    /// Read of a page at or beyond the end of the file.
    #[error("Page {0} is past the end of the file")]
    ReadPastEnd(u32),

    /// The file returned fewer bytes than one page.
    #[error("Short read on page {0}")]
    ReadFailed(u32),

    /// Write to a page outside the file, or a short write.
    #[error("Failed to write page {0}")]
    WriteFailed(u32),

    /// Growing the file by one page failed.
    #[error("Failed to allocate page {page}: {source}")]
    AllocFailed {
        page: u32,
        #[source]
        source: std::io::Error,
    },

    /// Every frame is pinned, so no victim can be evicted.
    ///
    /// Callers must unpin pages and retry.
    #[error("Buffer pool is full: every frame is pinned")]
    PoolFull,

    /// The operation referenced a page that is not in the buffer pool.
    #[error("Page {0} is not resident in the buffer pool")]
    PageNotResident(u32),

    /// A handle was used after its pin was released.
    #[error("Page {0} is not pinned")]
    PageNotPinned(u32),

    /// The page ID is the empty-frame sentinel.
    #[error("Invalid page ID: {0}")]
    InvalidPageId(u32),

    /// A buffer pool needs at least one frame.
    #[error("Invalid pool size {0}: must be at least 1")]
    InvalidPoolSize(usize),

    /// Strategy name not recognized when parsing configuration.
    #[error("Unknown replacement strategy {0:?}")]
    UnknownStrategy(String),
}

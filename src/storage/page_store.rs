//! Page Store - file-backed, fixed-size page I/O.
//!
//! The [`PageStore`] handles all direct file operations:
//! - Creating, opening, closing and destroying page files
//! - Bounds-checked reading and writing of pages by index
//! - Growing the file one zero page at a time
//! - Cursor-relative reads (first, previous, current, next, last)

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::debug;

use crate::common::config::PAGE_SIZE;
use crate::common::{Error, PageId, Result};
use crate::storage::Page;

/// A handle to one open page file.
///
/// # File Layout
/// The file is a plain sequence of pages with no header or magic number:
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┬─────────┐
/// │ Page 0  │ Page 1  │ Page 2  │  ...    │ Page N  │
/// │ (4KB)   │ (4KB)   │ (4KB)   │         │ (4KB)   │
/// └─────────┴─────────┴─────────┴─────────┴─────────┘
/// Offset:  0      4096     8192    ...    N×4096
/// ```
///
/// The page count is derived from the file length at open time and only
/// ever grows while the handle is open.
///
/// # Cursor
/// Every successful read or write moves the cursor to the page it touched.
/// The `read_first`/`read_next`/... family is relative to that cursor.
///
/// # Thread Safety
/// `PageStore` is **single-threaded**. The `BufferPoolManager` serializes
/// access to it behind its pool lock.
pub struct PageStore {
    file: File,
    path: PathBuf,
    /// Number of pages in the file.
    page_count: u32,
    /// Page touched by the last successful read or write.
    cursor: u32,
}

impl PageStore {
    /// Create a new page file containing exactly one zero-filled page.
    ///
    /// # Errors
    /// Returns `Error::FileExists` if the file is already there.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| match e.kind() {
                io::ErrorKind::AlreadyExists => Error::FileExists(path.to_path_buf()),
                _ => Error::Io(e),
            })?;

        let mut store = Self {
            file,
            path: path.to_path_buf(),
            page_count: 0,
            cursor: 0,
        };
        store.append_empty_page()?;
        debug!("created page file {}", path.display());
        Ok(store)
    }

    /// Open an existing page file.
    ///
    /// # Errors
    /// - `Error::FileNotFound` if the file doesn't exist
    /// - `Error::FileTooLarge` if it holds more pages than a `PageId` addresses
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path.as_ref(), true)
    }

    /// Open a page file without write access, so every write and every
    /// attempt to grow it fails.
    #[cfg(test)]
    pub(crate) fn open_read_only<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path.as_ref(), false)
    }

    fn open_with(path: &Path, writable: bool) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(writable)
            .open(path)
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => Error::FileNotFound(path.to_path_buf()),
                _ => Error::Io(e),
            })?;

        let page_count = pages_in(file.metadata()?.len())
            .ok_or_else(|| Error::FileTooLarge(path.to_path_buf()))?;

        debug!(
            "opened page file {} with {} pages",
            path.display(),
            page_count
        );
        Ok(Self {
            file,
            path: path.to_path_buf(),
            page_count,
            cursor: 0,
        })
    }

    /// Open an existing page file, or create if it doesn't exist.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::open(path)
        } else {
            Self::create(path)
        }
    }

    /// Remove a page file from disk.
    ///
    /// # Errors
    /// Returns `Error::FileNotFound` if there is nothing to remove.
    pub fn destroy<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        fs::remove_file(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::FileNotFound(path.to_path_buf()),
            _ => Error::Io(e),
        })?;
        debug!("destroyed page file {}", path.display());
        Ok(())
    }

    /// Sync and release the file handle.
    pub fn close(self) -> Result<()> {
        self.file.sync_all()?;
        debug!("closed page file {}", self.path.display());
        Ok(())
    }

    // ========================================================================
    // Absolute page access
    // ========================================================================

    /// Read a page from disk into `page`, in place.
    ///
    /// # Errors
    /// - `Error::ReadPastEnd` if the page is at or beyond the end of the file
    /// - `Error::ReadFailed` if the file returns less than a full page
    pub fn read_page(&mut self, page_id: PageId, page: &mut Page) -> Result<()> {
        if page_id.0 >= self.page_count {
            return Err(Error::ReadPastEnd(page_id.0));
        }

        self.file.seek(SeekFrom::Start(page_id.file_offset()))?;
        self.file
            .read_exact(page.as_mut_slice())
            .map_err(|e| match e.kind() {
                io::ErrorKind::UnexpectedEof => Error::ReadFailed(page_id.0),
                _ => Error::Io(e),
            })?;

        self.cursor = page_id.0;
        Ok(())
    }

    /// Write a page to disk.
    ///
    /// The page must already exist; use [`append_empty_page`](Self::append_empty_page)
    /// or [`ensure_capacity`](Self::ensure_capacity) to grow the file first.
    ///
    /// # Errors
    /// Returns `Error::WriteFailed` if the page is out of range or the write
    /// comes up short.
    pub fn write_page(&mut self, page_id: PageId, page: &Page) -> Result<()> {
        if page_id.0 >= self.page_count {
            return Err(Error::WriteFailed(page_id.0));
        }

        self.file.seek(SeekFrom::Start(page_id.file_offset()))?;
        self.file
            .write_all(page.as_slice())
            .map_err(|e| match e.kind() {
                io::ErrorKind::WriteZero => Error::WriteFailed(page_id.0),
                _ => Error::Io(e),
            })?;
        self.file.sync_data()?;

        self.cursor = page_id.0;
        Ok(())
    }

    // ========================================================================
    // Growth
    // ========================================================================

    /// Grow the file by exactly one zero-filled page.
    ///
    /// Returns the `PageId` of the new page.
    pub fn append_empty_page(&mut self) -> Result<PageId> {
        let page_id = self.append_zero_page()?;
        self.file
            .sync_data()
            .map_err(|source| Error::AllocFailed {
                page: page_id.0,
                source,
            })?;
        Ok(page_id)
    }

    /// Append zero pages until the file holds at least `min_pages` pages.
    ///
    /// Never shrinks the file; a no-op if it is already large enough.
    pub fn ensure_capacity(&mut self, min_pages: u32) -> Result<()> {
        if self.page_count >= min_pages {
            return Ok(());
        }

        let before = self.page_count;
        while self.page_count < min_pages {
            self.append_zero_page()?;
        }
        self.file.sync_data().map_err(|source| Error::AllocFailed {
            page: self.page_count - 1,
            source,
        })?;

        debug!(
            "grew page file {} from {} to {} pages",
            self.path.display(),
            before,
            self.page_count
        );
        Ok(())
    }

    fn append_zero_page(&mut self) -> Result<PageId> {
        let page_id = PageId::new(self.page_count);
        if !page_id.is_valid() {
            return Err(Error::InvalidPageId(page_id.0));
        }

        let zeros = [0u8; PAGE_SIZE];
        self.file
            .seek(SeekFrom::Start(page_id.file_offset()))
            .and_then(|_| self.file.write_all(&zeros))
            .map_err(|source| Error::AllocFailed {
                page: page_id.0,
                source,
            })?;

        self.page_count += 1;
        Ok(page_id)
    }

    // ========================================================================
    // Cursor-relative access
    // ========================================================================

    /// Page touched by the last successful read or write.
    #[inline]
    pub fn block_pos(&self) -> u32 {
        self.cursor
    }

    pub fn read_first(&mut self, page: &mut Page) -> Result<()> {
        self.read_page(PageId::new(0), page)
    }

    /// Read the page before the cursor.
    ///
    /// # Errors
    /// Returns `Error::ReadPastEnd` if the cursor is on the first page.
    pub fn read_previous(&mut self, page: &mut Page) -> Result<()> {
        if self.cursor == 0 {
            return Err(Error::ReadPastEnd(0));
        }
        self.read_page(PageId::new(self.cursor - 1), page)
    }

    pub fn read_current(&mut self, page: &mut Page) -> Result<()> {
        self.read_page(PageId::new(self.cursor), page)
    }

    /// Read the page after the cursor.
    ///
    /// # Errors
    /// Returns `Error::ReadPastEnd` if the cursor is on the last page.
    pub fn read_next(&mut self, page: &mut Page) -> Result<()> {
        let next = self.cursor.saturating_add(1);
        if next >= self.page_count {
            return Err(Error::ReadPastEnd(next));
        }
        self.read_page(PageId::new(next), page)
    }

    pub fn read_last(&mut self, page: &mut Page) -> Result<()> {
        match self.page_count.checked_sub(1) {
            Some(last) => self.read_page(PageId::new(last), page),
            None => Err(Error::ReadPastEnd(0)),
        }
    }

    pub fn write_current(&mut self, page: &Page) -> Result<()> {
        self.write_page(PageId::new(self.cursor), page)
    }

    // ========================================================================
    // Info
    // ========================================================================

    /// Get the number of pages in the file.
    #[inline]
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Get the total size of the page file in bytes.
    #[inline]
    pub fn file_size(&self) -> u64 {
        (self.page_count as u64) * (PAGE_SIZE as u64)
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Whole pages in a file of `len` bytes. A trailing partial page is
/// ignored. `None` if the count does not fit a `PageId`.
fn pages_in(len: u64) -> Option<u32> {
    u32::try_from(len / PAGE_SIZE as u64).ok()
}

impl std::fmt::Debug for PageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageStore")
            .field("path", &self.path)
            .field("page_count", &self.page_count)
            .field("cursor", &self.cursor)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn page_with(byte: u8) -> Page {
        let mut page = Page::new();
        page.as_mut_slice()[0] = byte;
        page.as_mut_slice()[PAGE_SIZE - 1] = byte;
        page
    }

    #[test]
    fn test_create_starts_with_one_zero_page() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        let mut store = PageStore::create(&path).unwrap();
        assert_eq!(store.page_count(), 1);
        assert_eq!(store.file_size(), PAGE_SIZE as u64);
        assert_eq!(fs::metadata(&path).unwrap().len(), PAGE_SIZE as u64);

        let mut page = page_with(0xFF);
        store.read_page(PageId::new(0), &mut page).unwrap();
        assert!(page.is_zeroed());
    }

    #[test]
    fn test_create_existing_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        PageStore::create(&path).unwrap();
        match PageStore::create(&path) {
            Err(Error::FileExists(p)) => assert_eq!(p, path),
            other => panic!("Expected FileExists, got {:?}", other),
        }
    }

    #[test]
    fn test_open_nonexistent_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nonexistent.db");

        match PageStore::open(&path) {
            Err(Error::FileNotFound(p)) => assert_eq!(p, path),
            other => panic!("Expected FileNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_destroy() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        PageStore::create(&path).unwrap().close().unwrap();
        PageStore::destroy(&path).unwrap();
        assert!(!path.exists());

        assert!(matches!(
            PageStore::destroy(&path),
            Err(Error::FileNotFound(_))
        ));
    }

    #[test]
    fn test_write_and_read_page() {
        let dir = tempdir().unwrap();
        let mut store = PageStore::create(dir.path().join("test.db")).unwrap();

        let mut page = Page::new();
        page.as_mut_slice()[0] = 0xAB;
        page.as_mut_slice()[100] = 0xCD;
        page.as_mut_slice()[4095] = 0xEF;
        store.write_page(PageId::new(0), &page).unwrap();

        let mut read_back = Page::new();
        store.read_page(PageId::new(0), &mut read_back).unwrap();
        assert_eq!(read_back.as_slice(), page.as_slice());
    }

    #[test]
    fn test_persistence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        {
            let mut store = PageStore::create(&path).unwrap();
            store.append_empty_page().unwrap();
            store.write_page(PageId::new(1), &page_with(0x42)).unwrap();
            store.close().unwrap();
        }

        {
            let mut store = PageStore::open(&path).unwrap();
            assert_eq!(store.page_count(), 2);
            assert_eq!(store.block_pos(), 0);

            let mut page = Page::new();
            store.read_page(PageId::new(1), &mut page).unwrap();
            assert_eq!(page.as_slice()[0], 0x42);
        }
    }

    #[test]
    fn test_read_past_end() {
        let dir = tempdir().unwrap();
        let mut store = PageStore::create(dir.path().join("test.db")).unwrap();

        let mut page = Page::new();
        assert!(matches!(
            store.read_page(PageId::new(1), &mut page),
            Err(Error::ReadPastEnd(1))
        ));
    }

    #[test]
    fn test_write_out_of_range() {
        let dir = tempdir().unwrap();
        let mut store = PageStore::create(dir.path().join("test.db")).unwrap();

        assert!(matches!(
            store.write_page(PageId::new(5), &Page::new()),
            Err(Error::WriteFailed(5))
        ));
        // A failed write never grows the file
        assert_eq!(store.page_count(), 1);
    }

    #[test]
    fn test_short_read_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");
        PageStore::create(&path).unwrap().close().unwrap();

        let mut store = PageStore::open(&path).unwrap();
        // Truncate behind the handle's back so the page count is stale
        OpenOptions::new()
            .write(true)
            .open(&path)
            .unwrap()
            .set_len(100)
            .unwrap();

        let mut page = Page::new();
        assert!(matches!(
            store.read_page(PageId::new(0), &mut page),
            Err(Error::ReadFailed(0))
        ));
    }

    #[test]
    fn test_append_and_ensure_capacity() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");
        let mut store = PageStore::create(&path).unwrap();

        assert_eq!(store.append_empty_page().unwrap(), PageId::new(1));
        assert_eq!(store.append_empty_page().unwrap(), PageId::new(2));
        assert_eq!(store.page_count(), 3);

        store.ensure_capacity(5).unwrap();
        assert_eq!(store.page_count(), 5);

        // Never shrinks
        store.ensure_capacity(3).unwrap();
        assert_eq!(store.page_count(), 5);
        assert_eq!(fs::metadata(&path).unwrap().len(), 5 * PAGE_SIZE as u64);

        let mut page = page_with(0x11);
        store.read_page(PageId::new(4), &mut page).unwrap();
        assert!(page.is_zeroed());
    }

    #[test]
    fn test_cursor_navigation() {
        let dir = tempdir().unwrap();
        let mut store = PageStore::create(dir.path().join("test.db")).unwrap();
        store.ensure_capacity(3).unwrap();
        for i in 0..3u32 {
            store.write_page(PageId::new(i), &page_with(i as u8 + 1)).unwrap();
        }

        let mut page = Page::new();

        store.read_first(&mut page).unwrap();
        assert_eq!(store.block_pos(), 0);
        assert_eq!(page.as_slice()[0], 1);

        // Nothing before the first page
        assert!(matches!(
            store.read_previous(&mut page),
            Err(Error::ReadPastEnd(_))
        ));

        store.read_next(&mut page).unwrap();
        assert_eq!(store.block_pos(), 1);
        assert_eq!(page.as_slice()[0], 2);

        store.read_current(&mut page).unwrap();
        assert_eq!(page.as_slice()[0], 2);

        store.read_last(&mut page).unwrap();
        assert_eq!(store.block_pos(), 2);
        assert_eq!(page.as_slice()[0], 3);

        // Nothing after the last page
        assert!(matches!(
            store.read_next(&mut page),
            Err(Error::ReadPastEnd(3))
        ));

        store.read_previous(&mut page).unwrap();
        assert_eq!(store.block_pos(), 1);
        assert_eq!(page.as_slice()[0], 2);
    }

    #[test]
    fn test_write_current() {
        let dir = tempdir().unwrap();
        let mut store = PageStore::create(dir.path().join("test.db")).unwrap();
        store.ensure_capacity(2).unwrap();

        let mut page = Page::new();
        store.read_last(&mut page).unwrap();
        store.write_current(&page_with(0x77)).unwrap();

        store.read_page(PageId::new(1), &mut page).unwrap();
        assert_eq!(page.as_slice()[0], 0x77);
        assert_eq!(store.block_pos(), 1);
    }

    #[test]
    fn test_open_or_create() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        // First call creates
        {
            let mut store = PageStore::open_or_create(&path).unwrap();
            assert_eq!(store.page_count(), 1);
            store.append_empty_page().unwrap();
        }

        // Second call opens existing
        {
            let store = PageStore::open_or_create(&path).unwrap();
            assert_eq!(store.page_count(), 2);
        }
    }

    #[test]
    fn test_page_count_fits_page_id() {
        assert_eq!(pages_in(0), Some(0));
        assert_eq!(pages_in(PAGE_SIZE as u64 * 3 + 100), Some(3));
        assert_eq!(pages_in(PAGE_SIZE as u64 * u32::MAX as u64), Some(u32::MAX));
        assert_eq!(pages_in(PAGE_SIZE as u64 * (u32::MAX as u64 + 1)), None);
        assert_eq!(pages_in(u64::MAX), None);
    }

    #[test]
    fn test_read_only_store_cannot_grow() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");
        PageStore::create(&path).unwrap().close().unwrap();

        let mut store = PageStore::open_read_only(&path).unwrap();
        let mut page = Page::new();
        store.read_page(PageId::new(0), &mut page).unwrap();

        assert!(matches!(
            store.ensure_capacity(3),
            Err(Error::AllocFailed { page: 1, .. })
        ));
        assert_eq!(store.page_count(), 1);
    }
}

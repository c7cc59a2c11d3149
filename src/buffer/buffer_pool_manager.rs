//! Buffer Pool Manager - the page caching layer.
//!
//! The [`BufferPoolManager`] provides:
//! - Page caching between the page store and memory
//! - Pin-based reference counting
//! - Dirty page write-back on eviction, on demand and at shutdown
//! - One of four replacement policies, fixed at construction

use std::path::Path;

use log::{debug, trace, warn};
use parking_lot::{Mutex, RwLockReadGuard, RwLockWriteGuard};

use crate::buffer::replacer::{EvictionPolicy, ReplacementStrategy, Replacer};
use crate::buffer::{
    BufferPoolStats, FrameTable, PageHandle, PageReadGuard, PageWriteGuard,
};
use crate::common::config::BufferPoolConfig;
use crate::common::{Error, FrameId, PageId, Result};
use crate::storage::{Page, PageStore};

/// State that only changes under the pool lock.
struct PoolState {
    page_store: PageStore,
    policy: EvictionPolicy,
    /// Logical clock; strictly increases on every page access.
    clock: u64,
}

impl PoolState {
    #[inline]
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }
}

/// Manages a fixed ring of frames caching pages of one page file.
///
/// # Architecture
/// ```text
/// ┌─────────────────────────────────────────────────────────────┐
/// │                    BufferPoolManager                        │
/// │  ┌───────────────────────────────────────────────────────┐  │
/// │  │      frames: FrameTable (ring, fixed at creation)     │  │
/// │  │  [Frame0] → [Frame1] → [Frame2] → ... → back to 0     │  │
/// │  └───────────────────────────────────────────────────────┘  │
/// │  ┌──────────────────────────────────────┐  ┌────────────┐   │
/// │  │ state: Mutex<PoolState>              │  │   stats    │   │
/// │  │  page_store | policy cursors | clock │  │  (atomic)  │   │
/// │  └──────────────────────────────────────┘  └────────────┘   │
/// └─────────────────────────────────────────────────────────────┘
/// ```
///
/// # Thread Safety
/// One coarse lock (`state`) is held for the whole of every pin, unpin,
/// mark-dirty, force and flush, page store I/O included. Page bytes sit
/// behind each frame's own `RwLock`, so pinned pages are read and written
/// without the pool lock. Nothing waits on a page's bytes while holding the
/// pool lock unless the frame is unpinned, and guards release their byte
/// lock before their pin, so a thread holding a page guard may call back
/// into the pool. `force_page` copies the bytes of a pinned page with the
/// pool lock released.
///
/// A pool that is out of unpinned frames fails with `Error::PoolFull`
/// immediately; it never waits.
///
/// # Usage
/// ```ignore
/// let store = PageStore::create("test.db")?;
/// let bpm = BufferPoolManager::new(BufferPoolConfig::new(3, ReplacementStrategy::Lru), store)?;
///
/// let handle = bpm.pin_page(PageId::new(0))?;
/// bpm.page_mut(&handle)?.as_mut_slice()[0] = 0xAB;
/// bpm.mark_dirty(PageId::new(0))?;
/// bpm.unpin_page(PageId::new(0))?;
///
/// bpm.shutdown()?;
/// ```
pub struct BufferPoolManager {
    frames: FrameTable,
    state: Mutex<PoolState>,
    stats: BufferPoolStats,
    strategy: ReplacementStrategy,
}

impl BufferPoolManager {
    /// Create a buffer pool over an already open page store.
    ///
    /// # Errors
    /// `Error::InvalidPoolSize` if `config.pool_size` is 0.
    pub fn new(config: BufferPoolConfig, page_store: PageStore) -> Result<Self> {
        config.validate()?;

        debug!(
            "buffer pool: {} frames, {} replacement, file {}",
            config.pool_size,
            config.strategy,
            page_store.path().display()
        );

        Ok(Self {
            frames: FrameTable::new(config.pool_size),
            state: Mutex::new(PoolState {
                page_store,
                policy: EvictionPolicy::new(config.strategy),
                clock: 0,
            }),
            stats: BufferPoolStats::new(),
            strategy: config.strategy,
        })
    }

    /// Open an existing page file and build a pool over it.
    ///
    /// # Errors
    /// - `Error::FileNotFound` if the page file doesn't exist
    /// - `Error::InvalidPoolSize` if `config.pool_size` is 0
    pub fn open<P: AsRef<Path>>(path: P, config: BufferPoolConfig) -> Result<Self> {
        config.validate()?;
        Self::new(config, PageStore::open(path)?)
    }

    // ========================================================================
    // Public API: Pin and unpin
    // ========================================================================

    /// Pin a page, loading it into a frame if it isn't resident.
    ///
    /// On a hit the frame's pin count goes up and no I/O happens. On a miss
    /// the active policy picks an unpinned victim, which is written back if
    /// dirty; the file grows if `page_id` is past its end; then the page is
    /// read into the victim's buffer.
    ///
    /// # Errors
    /// - `Error::PoolFull` if every frame is pinned
    /// - `Error::InvalidPageId` for the empty-frame sentinel
    /// - any page store error from write-back, growth or the read. A failed
    ///   read leaves the victim frame empty; its previous page is gone.
    pub fn pin_page(&self, page_id: PageId) -> Result<PageHandle> {
        if !page_id.is_valid() {
            return Err(Error::InvalidPageId(page_id.0));
        }

        let mut state = self.state.lock();

        if let Some(frame_id) = self.frames.find(page_id) {
            let timestamp = state.tick();
            let frame = &self.frames[frame_id];
            frame.pin();
            frame.record_access(timestamp);
            self.stats.record_hit();
            trace!("pin {} hit in {}", page_id, frame_id);
            return Ok(PageHandle::new(page_id, frame_id));
        }

        self.stats.record_miss();
        let frame_id = state
            .policy
            .select_victim(&self.frames)
            .ok_or(Error::PoolFull)?;
        trace!("pin {} miss, {} policy chose {}", page_id, self.strategy, frame_id);

        self.load_into(&mut state, frame_id, page_id)?;
        Ok(PageHandle::new(page_id, frame_id))
    }

    /// Drop one pin on a resident page. The pin count never goes below 0.
    ///
    /// # Errors
    /// `Error::PageNotResident` if the page is not in the pool.
    pub fn unpin_page(&self, page_id: PageId) -> Result<()> {
        let _state = self.state.lock();
        let frame_id = self.resident_frame(page_id)?;
        self.frames[frame_id].unpin();
        Ok(())
    }

    /// Flag a resident page as modified.
    ///
    /// # Errors
    /// `Error::PageNotResident` if the page is not in the pool.
    pub fn mark_dirty(&self, page_id: PageId) -> Result<()> {
        let _state = self.state.lock();
        let frame_id = self.resident_frame(page_id)?;
        self.frames[frame_id].mark_dirty();
        Ok(())
    }

    // ========================================================================
    // Public API: Page bytes
    // ========================================================================

    /// Read access to the bytes of a pinned page.
    ///
    /// Drop the returned lock before unpinning the page.
    ///
    /// # Errors
    /// - `Error::PageNotResident` if the handle's frame no longer hosts its page
    /// - `Error::PageNotPinned` if the page is resident but nobody holds a pin
    pub fn page(&self, handle: &PageHandle) -> Result<RwLockReadGuard<'_, Page>> {
        self.check_handle(handle)?;
        Ok(self.frames[handle.frame_id()].page())
    }

    /// Write access to the bytes of a pinned page.
    ///
    /// Does not mark the page dirty; call [`mark_dirty`](Self::mark_dirty).
    /// Drop the returned lock before unpinning the page.
    ///
    /// # Errors
    /// - `Error::PageNotResident` if the handle's frame no longer hosts its page
    /// - `Error::PageNotPinned` if the page is resident but nobody holds a pin
    pub fn page_mut(&self, handle: &PageHandle) -> Result<RwLockWriteGuard<'_, Page>> {
        self.check_handle(handle)?;
        Ok(self.frames[handle.frame_id()].page_mut())
    }

    /// Pin a page and take a shared lock on its bytes.
    ///
    /// The page is unpinned when the guard drops.
    pub fn fetch_page_read(&self, page_id: PageId) -> Result<PageReadGuard<'_>> {
        let handle = self.pin_page(page_id)?;
        let lock = self.frames[handle.frame_id()].page();
        Ok(PageReadGuard::new(self, handle, lock))
    }

    /// Pin a page and take an exclusive lock on its bytes.
    ///
    /// The page is marked dirty and unpinned when the guard drops.
    pub fn fetch_page_write(&self, page_id: PageId) -> Result<PageWriteGuard<'_>> {
        let handle = self.pin_page(page_id)?;
        let lock = self.frames[handle.frame_id()].page_mut();
        Ok(PageWriteGuard::new(self, handle, lock))
    }

    // ========================================================================
    // Public API: Flush pages
    // ========================================================================

    /// Write a resident page to disk whether or not it is dirty.
    ///
    /// Works on pinned pages. The frame is pinned for the duration and its
    /// bytes are copied with the pool lock released, so this waits for any
    /// writer on the page to finish without blocking the rest of the pool.
    /// Do not call it while the same thread holds a [`PageWriteGuard`] on
    /// the page.
    ///
    /// # Errors
    /// - `Error::PageNotResident` if the page is not in the pool
    /// - page store errors from the write; the page stays dirty
    pub fn force_page(&self, page_id: PageId) -> Result<()> {
        let frame_id = {
            let _state = self.state.lock();
            let frame_id = self.resident_frame(page_id)?;
            self.frames[frame_id].pin();
            frame_id
        };
        let frame = &self.frames[frame_id];

        let mut copy = Page::new();
        {
            let page = frame.page();
            // Writers mark dirty before releasing the byte lock
            frame.clear_dirty();
            copy.as_mut_slice().copy_from_slice(page.as_slice());
        }

        let written = self.state.lock().page_store.write_page(page_id, &copy);
        match &written {
            Ok(()) => {
                self.stats.record_write();
                debug!("forced {} from {}", page_id, frame_id);
            }
            Err(_) => frame.mark_dirty(),
        }
        frame.unpin();
        written
    }

    /// Write every dirty, unpinned page to disk.
    ///
    /// Dirty pages that are still pinned are skipped; flushing never waits
    /// for a pin to be released.
    pub fn flush_all_pages(&self) -> Result<()> {
        let mut state = self.state.lock();
        let mut flushed = 0;
        for (frame_id, frame) in self.frames.iter() {
            if frame.is_dirty() && !frame.is_pinned() {
                self.write_back(&mut state, frame_id)?;
                flushed += 1;
            }
        }
        debug!("flushed {} dirty pages", flushed);
        Ok(())
    }

    /// Flush, then release every frame and close the page store.
    ///
    /// Pages that are still pinned and dirty are not flushed and their
    /// in-memory changes are lost.
    pub fn shutdown(self) -> Result<()> {
        self.flush_all_pages()?;

        for (frame_id, frame) in self.frames.iter() {
            if frame.is_dirty() {
                warn!(
                    "shutdown drops changes to pinned {} in {} (pin count {})",
                    frame.page_id(),
                    frame_id,
                    frame.pin_count()
                );
            }
        }

        debug!("buffer pool shut down: {}", self.stats.snapshot());
        self.state.into_inner().page_store.close()
    }

    // ========================================================================
    // Public API: Snapshots and stats
    // ========================================================================

    /// Page hosted by each frame, in ring order. Empty frames report
    /// `PageId::INVALID`.
    pub fn frame_contents(&self) -> Vec<PageId> {
        let _state = self.state.lock();
        self.frames.iter().map(|(_, f)| f.page_id()).collect()
    }

    /// Dirty flag of each frame, in ring order.
    pub fn dirty_flags(&self) -> Vec<bool> {
        let _state = self.state.lock();
        self.frames.iter().map(|(_, f)| f.is_dirty()).collect()
    }

    /// Pin count of each frame, in ring order.
    pub fn pin_counts(&self) -> Vec<u32> {
        let _state = self.state.lock();
        self.frames.iter().map(|(_, f)| f.pin_count()).collect()
    }

    /// Pages read from the page store since the pool was created.
    pub fn read_io_count(&self) -> u64 {
        self.stats.pages_read()
    }

    /// Pages written to the page store since the pool was created.
    pub fn write_io_count(&self) -> u64 {
        self.stats.pages_written()
    }

    pub fn stats(&self) -> &BufferPoolStats {
        &self.stats
    }

    pub fn pool_size(&self) -> usize {
        self.frames.len()
    }

    pub fn strategy(&self) -> ReplacementStrategy {
        self.strategy
    }

    /// Number of frames currently hosting a page.
    pub fn resident_page_count(&self) -> usize {
        let _state = self.state.lock();
        self.frames.iter().filter(|(_, f)| !f.is_empty()).count()
    }

    /// Number of pages in the backing file.
    pub fn file_page_count(&self) -> u32 {
        self.state.lock().page_store.page_count()
    }

    // ========================================================================
    // Internal: Called by page guards on drop
    // ========================================================================

    /// Called by a write guard while it still holds the byte lock.
    pub(crate) fn mark_frame_dirty_internal(&self, frame_id: FrameId) {
        self.frames[frame_id].mark_dirty();
    }

    /// Called by a guard after its byte lock is released. Atomic, so it
    /// never waits on the pool lock.
    pub(crate) fn unpin_frame_internal(&self, frame_id: FrameId) {
        self.frames[frame_id].unpin();
    }

    // ========================================================================
    // Internal: Miss handling
    // ========================================================================

    /// Evict whatever `frame_id` holds and load `page_id` into it.
    fn load_into(&self, state: &mut PoolState, frame_id: FrameId, page_id: PageId) -> Result<()> {
        let frame = &self.frames[frame_id];
        let old_page = frame.page_id();

        if frame.is_dirty() {
            self.write_back(state, frame_id)?;
        }
        if page_id.0 >= state.page_store.page_count() {
            state.page_store.ensure_capacity(page_id.0 + 1)?;
        }

        // From here on the old page leaves the frame, loaded or not
        if old_page.is_valid() {
            self.stats.record_eviction();
            debug!("evicting {} from {} for {}", old_page, frame_id, page_id);
        }

        let loaded = {
            let mut page = frame.page_mut();
            state.page_store.read_page(page_id, &mut page)
        };
        if let Err(e) = loaded {
            warn!(
                "loading {} into {} failed ({}); frame reset to empty",
                page_id, frame_id, e
            );
            frame.reset();
            return Err(e);
        }

        let timestamp = state.tick();
        frame.install(page_id, timestamp);
        self.stats.record_read();
        state.policy.record_install(frame_id, &self.frames);
        Ok(())
    }

    /// Write an unpinned frame's bytes to its page and clear the dirty flag.
    fn write_back(&self, state: &mut PoolState, frame_id: FrameId) -> Result<()> {
        let frame = &self.frames[frame_id];
        let page_id = frame.page_id();

        state.page_store.write_page(page_id, &frame.page())?;
        frame.clear_dirty();
        self.stats.record_write();
        debug!("wrote back {} from {}", page_id, frame_id);
        Ok(())
    }

    // ========================================================================
    // Internal: Lookup
    // ========================================================================

    fn resident_frame(&self, page_id: PageId) -> Result<FrameId> {
        self.frames
            .find(page_id)
            .ok_or(Error::PageNotResident(page_id.0))
    }

    fn check_handle(&self, handle: &PageHandle) -> Result<()> {
        let frame_id = handle.frame_id();
        if frame_id.0 >= self.frames.len()
            || self.frames[frame_id].page_id() != handle.page_id()
        {
            return Err(Error::PageNotResident(handle.page_id().0));
        }
        if !self.frames[frame_id].is_pinned() {
            return Err(Error::PageNotPinned(handle.page_id().0));
        }
        Ok(())
    }
}

impl std::fmt::Debug for BufferPoolManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferPoolManager")
            .field("pool_size", &self.frames.len())
            .field("strategy", &self.strategy)
            .field("stats", &self.stats.snapshot())
            .finish()
    }
}

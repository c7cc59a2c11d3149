//! Frame - a slot in the buffer pool.
//!
//! A [`Frame`] holds a [`Page`] plus metadata needed for buffer management:
//! - Which page is loaded (or the empty sentinel)
//! - Pin count for reference counting
//! - Dirty flag for write-back tracking
//! - Reference bit, last access time and a bounded access history for the
//!   replacement policies

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::common::config::LRU_K;
use crate::common::PageId;
use crate::storage::Page;

/// The last [`LRU_K`] access timestamps of a frame.
///
/// A circular log: `entries[total % K]` is overwritten on every push, so the
/// smallest entry is the K-th most recent access once `total >= K`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessHistory {
    entries: [u64; LRU_K],
    total: u64,
}

impl AccessHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one access at logical time `timestamp`.
    pub fn push(&mut self, timestamp: u64) {
        let slot = (self.total % LRU_K as u64) as usize;
        self.entries[slot] = timestamp;
        self.total += 1;
    }

    /// Number of accesses recorded since the frame was created or reset.
    #[inline]
    pub fn total(&self) -> u64 {
        self.total
    }

    /// True if at least K accesses have been recorded.
    #[inline]
    pub fn is_qualified(&self) -> bool {
        self.total >= LRU_K as u64
    }

    /// Timestamp of the K-th most recent access, if there have been K.
    pub fn kth_most_recent(&self) -> Option<u64> {
        if self.is_qualified() {
            self.entries.iter().copied().min()
        } else {
            None
        }
    }
}

/// A frame in the buffer pool.
///
/// Frames are allocated once when the pool is built and reused in place;
/// only eviction followed by a load changes the page a frame hosts.
///
/// # Thread Safety
/// All fields use interior mutability so a frame can be shared by reference:
/// - `page`: `RwLock` for read/write synchronization of the bytes
/// - `history`: `Mutex`, only touched under the pool lock
/// - everything else: atomics
///
/// Metadata is mutated under the buffer pool's lock, with one exception: a
/// dropped page guard marks dirty and unpins without it. Those two steps
/// are ordered by the pin count's acquire/release pair; everything else is
/// `Relaxed`.
pub struct Frame {
    /// The page data, protected by RwLock.
    page: RwLock<Page>,

    /// Which page is loaded, or `PageId::INVALID` if the frame is empty.
    page_id: AtomicU32,

    /// Number of active references to this frame.
    pin_count: AtomicU32,

    /// Whether the bytes differ from the on-disk copy.
    is_dirty: AtomicBool,

    /// CLOCK's second-chance bit.
    reference_bit: AtomicBool,

    /// Logical time of the most recent access (0 = never).
    last_access: AtomicU64,

    history: Mutex<AccessHistory>,
}

impl Frame {
    /// Create a new empty frame.
    pub fn new() -> Self {
        Self {
            page: RwLock::new(Page::new()),
            page_id: AtomicU32::new(PageId::INVALID.0),
            pin_count: AtomicU32::new(0),
            is_dirty: AtomicBool::new(false),
            reference_bit: AtomicBool::new(false),
            last_access: AtomicU64::new(0),
            history: Mutex::new(AccessHistory::new()),
        }
    }

    // ========================================================================
    // Page access (RwLock)
    // ========================================================================

    /// Acquire read lock on the page.
    #[inline]
    pub fn page(&self) -> RwLockReadGuard<'_, Page> {
        self.page.read()
    }

    /// Acquire write lock on the page.
    #[inline]
    pub fn page_mut(&self) -> RwLockWriteGuard<'_, Page> {
        self.page.write()
    }

    #[cfg(test)]
    pub(crate) fn is_locked(&self) -> bool {
        self.page.is_locked()
    }

    // ========================================================================
    // Page ID
    // ========================================================================

    /// The hosted page, or `PageId::INVALID` if the frame is empty.
    #[inline]
    pub fn page_id(&self) -> PageId {
        PageId(self.page_id.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        !self.page_id().is_valid()
    }

    // ========================================================================
    // Pin count
    // ========================================================================

    /// Increment the pin count. Returns the new pin count.
    #[inline]
    pub fn pin(&self) -> u32 {
        self.pin_count.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Decrement the pin count, stopping at 0. Returns the new pin count.
    ///
    /// Release ordering publishes a preceding `mark_dirty` to whoever next
    /// observes the count.
    #[inline]
    pub fn unpin(&self) -> u32 {
        match self
            .pin_count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| c.checked_sub(1))
        {
            Ok(previous) => previous - 1,
            Err(_) => 0,
        }
    }

    #[inline]
    pub fn pin_count(&self) -> u32 {
        self.pin_count.load(Ordering::Acquire)
    }

    #[inline]
    pub fn is_pinned(&self) -> bool {
        self.pin_count() > 0
    }

    // ========================================================================
    // Dirty flag
    // ========================================================================

    #[inline]
    pub fn mark_dirty(&self) {
        self.is_dirty.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn clear_dirty(&self) {
        self.is_dirty.store(false, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.is_dirty.load(Ordering::Relaxed)
    }

    // ========================================================================
    // Replacement metadata
    // ========================================================================

    #[inline]
    pub fn reference_bit(&self) -> bool {
        self.reference_bit.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set_reference_bit(&self, set: bool) {
        self.reference_bit.store(set, Ordering::Relaxed);
    }

    #[inline]
    pub fn last_access(&self) -> u64 {
        self.last_access.load(Ordering::Relaxed)
    }

    /// Copy of the access history.
    pub fn history(&self) -> AccessHistory {
        *self.history.lock()
    }

    /// Record an access at logical time `timestamp`.
    ///
    /// Sets the reference bit, stamps `last_access` and pushes the
    /// timestamp into the history ring.
    pub fn record_access(&self, timestamp: u64) {
        self.reference_bit.store(true, Ordering::Relaxed);
        self.last_access.store(timestamp, Ordering::Relaxed);
        self.history.lock().push(timestamp);
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Take ownership of a freshly loaded page.
    ///
    /// The frame comes out pinned once, clean and referenced. The access
    /// history belongs to the frame and is not cleared.
    pub fn install(&self, page_id: PageId, timestamp: u64) {
        self.page_id.store(page_id.0, Ordering::Relaxed);
        self.pin_count.store(1, Ordering::Relaxed);
        self.is_dirty.store(false, Ordering::Relaxed);
        self.record_access(timestamp);
    }

    /// Reset the frame to the empty state.
    ///
    /// Zeroes the bytes and clears every piece of metadata.
    pub fn reset(&self) {
        self.page_mut().reset();
        self.page_id.store(PageId::INVALID.0, Ordering::Relaxed);
        self.pin_count.store(0, Ordering::Relaxed);
        self.is_dirty.store(false, Ordering::Relaxed);
        self.reference_bit.store(false, Ordering::Relaxed);
        self.last_access.store(0, Ordering::Relaxed);
        *self.history.lock() = AccessHistory::new();
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("page_id", &self.page_id())
            .field("pin_count", &self.pin_count())
            .field("is_dirty", &self.is_dirty())
            .field("reference_bit", &self.reference_bit())
            .field("last_access", &self.last_access())
            .finish()
    }
}

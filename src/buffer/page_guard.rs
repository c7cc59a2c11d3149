//! Handles and RAII guards for pinned pages.
//!
//! - [`PageHandle`] - what a raw `pin_page` returns; the caller unpins
//! - [`PageReadGuard`] - shared read access, unpins on drop
//! - [`PageWriteGuard`] - exclusive write access, marks dirty and unpins on drop
//!
//! A guard gives up its byte lock before its pin, so an unpinned frame is
//! never still locked by a guard when the pool picks it as a victim.

use std::ops::{Deref, DerefMut};

use parking_lot::{RwLockReadGuard, RwLockWriteGuard};

use crate::common::{FrameId, PageId};
use crate::storage::Page;

use super::buffer_pool_manager::BufferPoolManager;

/// A pinned page: which page, and which frame it lives in.
///
/// Returned by [`BufferPoolManager::pin_page`]. The handle does not unpin
/// on its own; pair every pin with [`BufferPoolManager::unpin_page`]. Once
/// the pin is released the frame may be reused and the handle goes stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageHandle {
    page_id: PageId,
    frame_id: FrameId,
}

impl PageHandle {
    pub(crate) fn new(page_id: PageId, frame_id: FrameId) -> Self {
        Self { page_id, frame_id }
    }

    #[inline]
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    #[inline]
    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }
}

/// Releases one pin on a frame when dropped.
///
/// Declared after the byte lock in both guards; fields drop in order.
struct PinRelease<'a> {
    bpm: &'a BufferPoolManager,
    frame_id: FrameId,
}

impl Drop for PinRelease<'_> {
    fn drop(&mut self) {
        self.bpm.unpin_frame_internal(self.frame_id);
    }
}

/// Guard for read-only page access.
///
/// Multiple `PageReadGuard`s can exist for the same page simultaneously.
/// The page is automatically unpinned when the guard is dropped.
///
/// # Example
/// ```ignore
/// let guard = bpm.fetch_page_read(page_id)?;
/// let data = guard.as_slice();  // Deref to &Page
/// // guard drops here, page unpinned
/// ```
pub struct PageReadGuard<'a> {
    handle: PageHandle,
    lock: RwLockReadGuard<'a, Page>,
    _pin: PinRelease<'a>,
}

impl<'a> PageReadGuard<'a> {
    pub(crate) fn new(
        bpm: &'a BufferPoolManager,
        handle: PageHandle,
        lock: RwLockReadGuard<'a, Page>,
    ) -> Self {
        let _pin = PinRelease {
            bpm,
            frame_id: handle.frame_id,
        };
        Self { handle, lock, _pin }
    }

    #[inline]
    pub fn page_id(&self) -> PageId {
        self.handle.page_id
    }

    #[inline]
    pub fn frame_id(&self) -> FrameId {
        self.handle.frame_id
    }
}

impl Deref for PageReadGuard<'_> {
    type Target = Page;

    #[inline]
    fn deref(&self) -> &Page {
        &self.lock
    }
}

/// Guard for exclusive write access to a page.
///
/// Only one `PageWriteGuard` can exist for a page at a time. On drop the
/// page is marked dirty while still locked, then unlocked, then unpinned.
///
/// # Example
/// ```ignore
/// let mut guard = bpm.fetch_page_write(page_id)?;
/// guard.as_mut_slice()[0] = 0xFF;  // DerefMut to &mut Page
/// // guard drops here, page marked dirty and unpinned
/// ```
pub struct PageWriteGuard<'a> {
    handle: PageHandle,
    lock: RwLockWriteGuard<'a, Page>,
    pin: PinRelease<'a>,
}

impl<'a> PageWriteGuard<'a> {
    pub(crate) fn new(
        bpm: &'a BufferPoolManager,
        handle: PageHandle,
        lock: RwLockWriteGuard<'a, Page>,
    ) -> Self {
        let pin = PinRelease {
            bpm,
            frame_id: handle.frame_id,
        };
        Self { handle, lock, pin }
    }

    #[inline]
    pub fn page_id(&self) -> PageId {
        self.handle.page_id
    }

    #[inline]
    pub fn frame_id(&self) -> FrameId {
        self.handle.frame_id
    }
}

impl Deref for PageWriteGuard<'_> {
    type Target = Page;

    #[inline]
    fn deref(&self) -> &Page {
        &self.lock
    }
}

impl DerefMut for PageWriteGuard<'_> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Page {
        &mut self.lock
    }
}

impl Drop for PageWriteGuard<'_> {
    fn drop(&mut self) {
        // Runs before the fields drop, so the lock is still held
        self.pin.bpm.mark_frame_dirty_internal(self.handle.frame_id);
    }
}

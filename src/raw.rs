//! The chunk table and the logical range it backs.
//!
//! Absolute index `i` lives in chunk `i >> P`, at offset `i & MASK` within
//! that chunk. The live elements occupy `start..end`; every other slot of
//! every chunk in the table is uninitialized. Neither bound is reset to zero
//! when elements come and go; they only move when whole chunks are moved to,
//! or removed from, the front of the table.

use alloc::vec::Vec;
use core::alloc::Layout;
use core::marker::PhantomData;
use core::ptr::NonNull;

use crate::allocator::ChunkAllocator;
use crate::error::Error;

/// One of the two ends of the sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum End {
    Front,
    Back,
}

impl End {
    #[inline]
    pub(crate) fn opposite(self) -> End {
        match self {
            End::Front => End::Back,
            End::Back => End::Front,
        }
    }
}

pub(crate) struct RawChunks<T, const P: u32> {
    pub(crate) chunks: Vec<NonNull<T>>,
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) epoch: usize,
    elem: PhantomData<T>,
}

impl<T, const P: u32> RawChunks<T, P> {
    pub(crate) const CHUNK: usize = {
        assert!(P < usize::BITS - 1, "chunk size must be addressable");
        1 << P
    };
    pub(crate) const MASK: usize = Self::CHUNK - 1;

    pub(crate) const fn new() -> Self {
        RawChunks {
            chunks: Vec::new(),
            start: 0,
            end: 0,
            epoch: 0,
            elem: PhantomData,
        }
    }

    #[inline]
    pub(crate) fn chunk_layout() -> Result<Layout, Error> {
        Layout::array::<T>(Self::CHUNK).map_err(|_| Error::CapacityOverflow)
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.start == self.end
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.chunks.len() << P
    }

    /// Number of whole chunks at `end` that hold no live element.
    #[inline]
    pub(crate) fn free_chunks(&self, end: End) -> usize {
        match end {
            End::Front => self.start >> P,
            End::Back => (self.capacity() - self.end) >> P,
        }
    }

    /// Number of slots that can be filled at `end` without touching the table.
    #[inline]
    pub(crate) fn room(&self, end: End) -> usize {
        match end {
            End::Front => self.start,
            End::Back => self.capacity() - self.end,
        }
    }

    /// Returns a pointer to the slot backing absolute index `index`.
    ///
    /// # Safety
    /// `index` must be less than `self.capacity()`.
    #[inline(always)]
    pub(crate) unsafe fn slot(&self, index: usize) -> *mut T {
        debug_assert!(index < self.capacity());
        slot_in(&self.chunks, index, P)
    }

    /// Returns the logical position `offset` elements past the front, if it is live.
    #[inline]
    pub(crate) fn absolute(&self, offset: usize) -> Option<usize> {
        if offset < self.len() {
            Some(self.start + offset)
        } else {
            None
        }
    }

    #[inline]
    pub(crate) fn contains(&self, index: usize) -> bool {
        self.start <= index && index < self.end
    }

    #[inline]
    pub(crate) fn bump_epoch(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
    }

    /// Drops every live element, leaving all chunks in place.
    ///
    /// If an element's destructor panics, the remaining elements are still
    /// dropped before the panic propagates.
    pub(crate) fn clear(&mut self) {
        struct DropRest<'a, T, const P: u32> {
            raw: &'a RawChunks<T, P>,
            next: usize,
            end: usize,
        }

        impl<T, const P: u32> Drop for DropRest<'_, T, P> {
            fn drop(&mut self) {
                while self.next < self.end {
                    let index = self.next;
                    self.next += 1;
                    unsafe { self.raw.slot(index).drop_in_place() };
                }
            }
        }

        let (start, end) = (self.start, self.end);
        self.end = start;

        let mut rest = DropRest {
            raw: &*self,
            next: start,
            end,
        };
        while rest.next < rest.end {
            let index = rest.next;
            rest.next += 1;
            unsafe { rest.raw.slot(index).drop_in_place() };
        }
    }

    /// Returns every chunk to `alloc` and resets the logical range.
    ///
    /// # Safety
    /// There must be no live elements left, and `alloc` must be the allocator
    /// all chunks were obtained from.
    pub(crate) unsafe fn release_all<A: ChunkAllocator>(&mut self, alloc: &mut A) {
        debug_assert!(self.is_empty());
        if let Ok(layout) = Self::chunk_layout() {
            for chunk in self.chunks.drain(..).rev() {
                alloc.deallocate(chunk.cast(), layout);
            }
        }

        if self.start != 0 || self.end != 0 {
            self.bump_epoch();
        }
        self.start = 0;
        self.end = 0;
    }
}

/// Resolves an absolute index against a chunk table.
///
/// # Safety
/// `index >> power` must be in bounds for `chunks`.
#[inline(always)]
pub(crate) unsafe fn slot_in<T>(chunks: &[NonNull<T>], index: usize, power: u32) -> *mut T {
    let mask = (1usize << power) - 1;
    chunks
        .get_unchecked(index >> power)
        .as_ptr()
        .add(index & mask)
}

//! Chunk allocators.
//!
//! A [`ChunkVec`](crate::ChunkVec) never asks for memory directly. Every chunk
//! it owns is requested from, and eventually handed back to, a value
//! implementing [`ChunkAllocator`]. Elements are then written into and
//! dropped out of that raw storage by the container itself.
//!
//! Three allocators are provided:
//!
//! * [`Global`] forwards to the global heap,
//! * [`Counting`] wraps another allocator and records [`AllocStats`],
//! * [`Arena`](crate::arena::Arena) carves chunks out of a borrowed region.

use core::alloc::Layout;
use core::ptr::NonNull;

/// The failure signal of a [`ChunkAllocator`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, thiserror::Error)]
#[error("memory allocation failed")]
pub struct AllocError;

/// An interface for allocating and releasing the chunks of a [`ChunkVec`](crate::ChunkVec).
///
/// # Safety
/// Implementors must ensure that a pointer returned from
/// [`allocate`](ChunkAllocator::allocate) is valid for reads and writes of
/// `layout.size()` bytes, is aligned to `layout.align()`, and stays valid
/// until it is passed to [`deallocate`](ChunkAllocator::deallocate) or the
/// allocator is dropped. Distinct live allocations must not overlap.
pub unsafe trait ChunkAllocator {
    /// Attempts to allocate a block of memory described by `layout`.
    fn allocate(&mut self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Releases a block previously returned by [`allocate`](ChunkAllocator::allocate).
    ///
    /// # Safety
    /// `ptr` must have been returned by a call to `allocate` on this
    /// allocator with the same `layout`, and must not have been released yet.
    unsafe fn deallocate(&mut self, ptr: NonNull<u8>, layout: Layout);

    /// Returns the size in bytes of the largest block this allocator can
    /// possibly provide.
    #[inline]
    fn max_size(&self) -> usize {
        isize::MAX as usize
    }
}

unsafe impl<A: ChunkAllocator + ?Sized> ChunkAllocator for &mut A {
    #[inline]
    fn allocate(&mut self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        (**self).allocate(layout)
    }

    #[inline]
    unsafe fn deallocate(&mut self, ptr: NonNull<u8>, layout: Layout) {
        (**self).deallocate(ptr, layout)
    }

    #[inline]
    fn max_size(&self) -> usize {
        (**self).max_size()
    }
}

#[inline]
fn dangling_for(layout: Layout) -> NonNull<u8> {
    // any non-null address that is a multiple of the alignment will do
    unsafe { NonNull::new_unchecked(layout.align() as *mut u8) }
}

/// The global heap, as used by [`alloc::boxed::Box`] and [`alloc::vec::Vec`].
///
/// Zero-sized requests are answered with a dangling, well-aligned pointer
/// without touching the heap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Global;

unsafe impl ChunkAllocator for Global {
    #[inline]
    fn allocate(&mut self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        if layout.size() == 0 {
            return Ok(dangling_for(layout));
        }

        let ptr = unsafe { alloc::alloc::alloc(layout) };
        NonNull::new(ptr).ok_or(AllocError)
    }

    #[inline]
    unsafe fn deallocate(&mut self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() != 0 {
            alloc::alloc::dealloc(ptr.as_ptr(), layout);
        }
    }
}

/// Allocation statistics recorded by a [`Counting`] allocator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct AllocStats {
    /// Number of successful calls to `allocate`.
    pub allocations: usize,
    /// Number of calls to `deallocate`.
    pub deallocations: usize,
    /// Number of calls to `allocate` that returned an error.
    pub failures: usize,
    /// Bytes currently handed out and not yet returned.
    pub live_bytes: usize,
    /// The largest value `live_bytes` has ever reached.
    pub peak_bytes: usize,
}

impl AllocStats {
    /// Returns the number of blocks currently handed out.
    #[inline]
    pub fn live_blocks(&self) -> usize {
        self.allocations - self.deallocations
    }
}

/// An allocator adapter recording [`AllocStats`] for every request it forwards.
///
/// # Examples
/// ```
/// use chunkvec::allocator::{Counting, Global};
/// use chunkvec::ChunkVec;
///
/// let mut vec = ChunkVec::<u32, 2, Counting<Global>>::new();
/// vec.extend(0..8);
/// assert_eq!(vec.allocator().stats().allocations, 2);
///
/// vec.clear();
/// vec.shrink_to_fit();
/// assert_eq!(vec.allocator().stats().live_blocks(), 0);
/// ```
#[derive(Debug, Default)]
pub struct Counting<A = Global> {
    inner: A,
    stats: AllocStats,
}

impl<A> Counting<A> {
    /// Wraps `inner`, starting with all counters at zero.
    #[inline]
    pub const fn new(inner: A) -> Self {
        Counting {
            inner,
            stats: AllocStats {
                allocations: 0,
                deallocations: 0,
                failures: 0,
                live_bytes: 0,
                peak_bytes: 0,
            },
        }
    }

    /// Returns a snapshot of the recorded statistics.
    #[inline]
    pub fn stats(&self) -> AllocStats {
        self.stats
    }

    /// Returns a reference to the wrapped allocator.
    #[inline]
    pub fn inner(&self) -> &A {
        &self.inner
    }

    /// Unwraps the adapter, discarding the statistics.
    #[inline]
    pub fn into_inner(self) -> A {
        self.inner
    }
}

/// Cloning yields an adapter around a clone of the wrapped allocator, with
/// fresh counters; the blocks counted by `self` are not owned by the clone.
impl<A: Clone> Clone for Counting<A> {
    fn clone(&self) -> Self {
        Counting::new(self.inner.clone())
    }
}

unsafe impl<A: ChunkAllocator> ChunkAllocator for Counting<A> {
    fn allocate(&mut self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        match self.inner.allocate(layout) {
            Ok(ptr) => {
                self.stats.allocations += 1;
                self.stats.live_bytes += layout.size();
                self.stats.peak_bytes = self.stats.peak_bytes.max(self.stats.live_bytes);
                Ok(ptr)
            }
            Err(e) => {
                self.stats.failures += 1;
                Err(e)
            }
        }
    }

    unsafe fn deallocate(&mut self, ptr: NonNull<u8>, layout: Layout) {
        self.stats.deallocations += 1;
        self.stats.live_bytes -= layout.size();
        self.inner.deallocate(ptr, layout)
    }

    #[inline]
    fn max_size(&self) -> usize {
        self.inner.max_size()
    }
}

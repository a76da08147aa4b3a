//! Arena-based chunk allocation.
//!
//! An arena controls a contiguous region of memory, partitioning it by simply
//! incrementing a pointer. Chunks handed back to the arena are not reclaimed
//! individually, with one exception: releasing the most recently allocated
//! chunk moves the pointer back, so a container that grows and shrinks at
//! the same end reuses the same memory. Everything else is reclaimed in
//! aggregate once the arena is dropped and the underlying region is free to
//! be reused.
//!
//! A [`ChunkVec`](crate::ChunkVec) that allocates from an arena borrows the
//! region for as long as it lives. To hand out the remaining memory to
//! another container while keeping the original arena around, one can
//! [construct an arena from an existing one](Arena::make_sub_arena).

use core::alloc::Layout;
use core::fmt::{self, Debug, Formatter};
use core::marker::PhantomData;
use core::mem::MaybeUninit;
use core::ops::Range;
use core::ptr::NonNull;

use crate::allocator::{AllocError, ChunkAllocator};

/// A memory arena, also known as a region-based allocator, or bump allocator.
///
/// See the [module-level documentation](crate::arena) for more.
///
/// # Examples
/// ```
/// use core::mem::MaybeUninit;
/// use chunkvec::{arena::Arena, ChunkVec};
///
/// let mut backing_region = [MaybeUninit::uninit(); 256];
/// let arena = Arena::from_buffer(&mut backing_region[..]);
///
/// let mut vec = ChunkVec::<u32, 3, _>::with_allocator(arena);
/// for i in 0..16 {
///     assert!(vec.try_push_back(i).is_ok());
/// }
/// assert_eq!(vec.chunk_count(), 2);
/// assert!(vec.allocator().used() >= 2 * 8 * 4);
/// ```
pub struct Arena<'src> {
    start: *mut MaybeUninit<u8>,
    cursor: *mut MaybeUninit<u8>,
    end: *mut MaybeUninit<u8>,
    src: PhantomData<&'src mut ()>, // Ensures you can't allocate out of the source arena while this one is still alive
}

impl<'src> Arena<'src> {
    /// Constructs a new `Arena` allocating out of `buf`.
    #[inline]
    pub fn from_buffer(buf: &'src mut [MaybeUninit<u8>]) -> Arena<'src> {
        let Range { start, end } = buf.as_mut_ptr_range();

        Arena {
            start,
            cursor: start,
            end,
            src: PhantomData,
        }
    }

    /// Constructs a new `Arena` allocating out of the free space remaining in `self`.
    /// `self` cannot be used for allocation until the new arena is dropped.
    ///
    /// # Examples
    /// ```
    /// use core::mem::MaybeUninit;
    /// use chunkvec::{arena::Arena, ChunkVec};
    ///
    /// let mut backing_region = [MaybeUninit::uninit(); 128];
    /// let mut arena = Arena::from_buffer(&mut backing_region[..]);
    ///
    /// {
    ///     let mut tmp = ChunkVec::<u64, 2, _>::with_allocator(arena.make_sub_arena());
    ///     while tmp.try_push_back(0).is_ok() {} // this takes up (almost) all 128 bytes...
    ///     assert!(tmp.len() <= 16);             // ...so at most 16 values fit
    /// }
    ///
    /// assert_eq!(arena.remaining(), 128); // tmp was dropped, so the memory can be reused
    /// ```
    #[inline]
    pub fn make_sub_arena(&mut self) -> Arena<'_> {
        Arena {
            start: self.cursor,
            cursor: self.cursor,
            end: self.end,
            src: PhantomData,
        }
    }

    /// Returns the number of bytes that have not been handed out yet.
    #[inline]
    pub fn remaining(&self) -> usize {
        (self.end as usize) - (self.cursor as usize)
    }

    /// Returns the number of bytes handed out so far, including alignment padding.
    #[inline]
    pub fn used(&self) -> usize {
        (self.cursor as usize) - (self.start as usize)
    }

    #[inline]
    fn try_alloc_raw(&mut self, alloc_layout: &Layout) -> Option<NonNull<u8>> {
        let align_offset = self.cursor.align_offset(alloc_layout.align());

        // `ptr::align_offset()` returns `usize::MAX` when aligning the pointer
        // isn't possible, which shouldn't ever happen with a `*u8`, BUT:
        // the implementation is free to _always_ return `usize::MAX`, so
        // we'll leave getting rid of this check to the optimizer
        if align_offset == usize::MAX {
            return None;
        }

        // we can't eagerly compute `result` and `new_cursor`, because it's UB
        // for the result of `ptr::add` to be out of bounds, so the correct way
        // to check bounds here is through usize arithmetic:
        let total_bytes = align_offset.checked_add(alloc_layout.size())?;
        if self.remaining() < total_bytes {
            return None;
        }

        let result = unsafe { self.cursor.add(align_offset) };
        self.cursor = unsafe { result.add(alloc_layout.size()) };
        NonNull::new(result.cast::<u8>())
    }
}

impl<'src> From<&'src mut [MaybeUninit<u8>]> for Arena<'src> {
    #[inline]
    fn from(buf: &'src mut [MaybeUninit<u8>]) -> Self {
        Self::from_buffer(buf)
    }
}

impl Debug for Arena<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("used", &self.used())
            .field("remaining", &self.remaining())
            .finish()
    }
}

unsafe impl ChunkAllocator for Arena<'_> {
    #[inline]
    fn allocate(&mut self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        self.try_alloc_raw(&layout).ok_or(AllocError)
    }

    #[inline]
    unsafe fn deallocate(&mut self, ptr: NonNull<u8>, layout: Layout) {
        let block_end = ptr.as_ptr().add(layout.size()).cast::<MaybeUninit<u8>>();
        if block_end == self.cursor {
            self.cursor = ptr.as_ptr().cast();
        }
    }

    #[inline]
    fn max_size(&self) -> usize {
        self.remaining()
    }
}

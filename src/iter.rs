//! Iterators over the elements of a [`ChunkVec`].

use core::fmt::{self, Debug, Formatter};
use core::iter::FusedIterator;
use core::marker::PhantomData;
use core::ptr::NonNull;

use crate::allocator::ChunkAllocator;
use crate::chunk_vec::ChunkVec;
use crate::raw::slot_in;

/// An iterator over the elements of a chunk vector.
///
/// This `struct` is created by the [`iter`](ChunkVec::iter) and
/// [`range`](ChunkVec::range) methods on [`ChunkVec`]. See their
/// documentation for more.
pub struct Iter<'a, T, const P: u32> {
    chunks: &'a [NonNull<T>],
    front: usize,
    back: usize,
    _ref: PhantomData<&'a T>,
}

unsafe impl<T: Sync, const P: u32> Send for Iter<'_, T, P> {}
unsafe impl<T: Sync, const P: u32> Sync for Iter<'_, T, P> {}

impl<'a, T, const P: u32> Iter<'a, T, P> {
    #[inline]
    pub(crate) fn new(chunks: &'a [NonNull<T>], front: usize, back: usize) -> Self {
        debug_assert!(front <= back);
        Iter {
            chunks,
            front,
            back,
            _ref: PhantomData,
        }
    }
}

impl<T, const P: u32> Clone for Iter<'_, T, P> {
    fn clone(&self) -> Self {
        Iter::new(self.chunks, self.front, self.back)
    }
}

struct Remaining<'a, T, const P: u32>(Iter<'a, T, P>);

impl<T: Debug, const P: u32> Debug for Remaining<'_, T, P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.clone()).finish()
    }
}

impl<T: Debug, const P: u32> Debug for Iter<'_, T, P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Iter").field(&Remaining(self.clone())).finish()
    }
}

impl<'a, T, const P: u32> Iterator for Iter<'a, T, P> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<&'a T> {
        if self.front == self.back {
            return None;
        }

        let result = unsafe { &*slot_in(self.chunks, self.front, P) };
        self.front += 1;
        Some(result)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.back - self.front;
        (len, Some(len))
    }

    #[inline]
    fn nth(&mut self, n: usize) -> Option<&'a T> {
        self.front += n.min(self.back - self.front);
        self.next()
    }
}

impl<'a, T, const P: u32> DoubleEndedIterator for Iter<'a, T, P> {
    #[inline]
    fn next_back(&mut self) -> Option<&'a T> {
        if self.front == self.back {
            return None;
        }

        self.back -= 1;
        unsafe { Some(&*slot_in(self.chunks, self.back, P)) }
    }

    #[inline]
    fn nth_back(&mut self, n: usize) -> Option<&'a T> {
        self.back -= n.min(self.back - self.front);
        self.next_back()
    }
}

impl<T, const P: u32> ExactSizeIterator for Iter<'_, T, P> {}
impl<T, const P: u32> FusedIterator for Iter<'_, T, P> {}

/// A mutable iterator over the elements of a chunk vector.
///
/// This `struct` is created by the [`iter_mut`](ChunkVec::iter_mut) and
/// [`range_mut`](ChunkVec::range_mut) methods on [`ChunkVec`]. See their
/// documentation for more.
pub struct IterMut<'a, T, const P: u32> {
    chunks: &'a [NonNull<T>],
    front: usize,
    back: usize,
    _ref: PhantomData<&'a mut T>,
}

unsafe impl<T: Send, const P: u32> Send for IterMut<'_, T, P> {}
unsafe impl<T: Sync, const P: u32> Sync for IterMut<'_, T, P> {}

impl<'a, T, const P: u32> IterMut<'a, T, P> {
    /// The caller must hold the only reference to the elements in `front..back`.
    #[inline]
    pub(crate) fn new(chunks: &'a [NonNull<T>], front: usize, back: usize) -> Self {
        debug_assert!(front <= back);
        IterMut {
            chunks,
            front,
            back,
            _ref: PhantomData,
        }
    }
}

impl<T: Debug, const P: u32> Debug for IterMut<'_, T, P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let remaining = Iter::<T, P>::new(self.chunks, self.front, self.back);
        f.debug_tuple("IterMut").field(&Remaining(remaining)).finish()
    }
}

impl<'a, T, const P: u32> Iterator for IterMut<'a, T, P> {
    type Item = &'a mut T;

    #[inline]
    fn next(&mut self) -> Option<&'a mut T> {
        if self.front == self.back {
            return None;
        }

        let result = unsafe { &mut *slot_in(self.chunks, self.front, P) };
        self.front += 1;
        Some(result)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.back - self.front;
        (len, Some(len))
    }

    #[inline]
    fn nth(&mut self, n: usize) -> Option<&'a mut T> {
        self.front += n.min(self.back - self.front);
        self.next()
    }
}

impl<'a, T, const P: u32> DoubleEndedIterator for IterMut<'a, T, P> {
    #[inline]
    fn next_back(&mut self) -> Option<&'a mut T> {
        if self.front == self.back {
            return None;
        }

        self.back -= 1;
        unsafe { Some(&mut *slot_in(self.chunks, self.back, P)) }
    }
}

impl<T, const P: u32> ExactSizeIterator for IterMut<'_, T, P> {}
impl<T, const P: u32> FusedIterator for IterMut<'_, T, P> {}

/// An owning iterator over the elements of a chunk vector.
///
/// This `struct` is created by the [`into_iter`](ChunkVec::into_iter) method on
/// [`ChunkVec`] (provided by the `IntoIterator` trait). See its documentation for
/// more.
pub struct IntoIter<T, const P: u32, A: ChunkAllocator> {
    pub(crate) inner: ChunkVec<T, P, A>,
}

impl<T: Debug, const P: u32, A: ChunkAllocator> Debug for IntoIter<T, P, A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.inner).finish()
    }
}

impl<T, const P: u32, A: ChunkAllocator> Iterator for IntoIter<T, P, A> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        self.inner.pop_front()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.inner.len();
        (len, Some(len))
    }
}

impl<T, const P: u32, A: ChunkAllocator> DoubleEndedIterator for IntoIter<T, P, A> {
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        self.inner.pop_back()
    }
}

impl<T, const P: u32, A: ChunkAllocator> ExactSizeIterator for IntoIter<T, P, A> {}
impl<T, const P: u32, A: ChunkAllocator> FusedIterator for IntoIter<T, P, A> {}

/// A draining iterator over the elements of a chunk vector.
///
/// This `struct` is created by the [`drain`](ChunkVec::drain) method on
/// [`ChunkVec`]. See its documentation for more.
pub struct Drain<'p, T, const P: u32, A: ChunkAllocator> {
    parent: &'p mut ChunkVec<T, P, A>,
    original_end: usize,
    target_start: usize,
    front_index: usize,
    back_index: usize,
    target_end: usize,
}

impl<'p, T, const P: u32, A: ChunkAllocator> Drain<'p, T, P, A> {
    /// Takes the absolute range `target_start..target_end` out of `parent`.
    ///
    /// Until the `Drain` is dropped, `parent` only claims the elements in
    /// front of the range, so leaking it leaks the rest instead of exposing
    /// moved-out slots.
    pub(crate) fn new(parent: &'p mut ChunkVec<T, P, A>, target_start: usize, target_end: usize) -> Self {
        let original_end = parent.raw.end;
        debug_assert!(parent.raw.start <= target_start);
        debug_assert!(target_start <= target_end && target_end <= original_end);
        parent.raw.end = target_start;

        Drain {
            parent,
            original_end,
            target_start,
            front_index: target_start,
            back_index: target_end,
            target_end,
        }
    }
}

impl<T: Debug, const P: u32, A: ChunkAllocator> Debug for Drain<'_, T, P, A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let remaining = Iter::<T, P>::new(&self.parent.raw.chunks, self.front_index, self.back_index);
        f.debug_tuple("Drain").field(&Remaining(remaining)).finish()
    }
}

impl<T, const P: u32, A: ChunkAllocator> Iterator for Drain<'_, T, P, A> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        if self.front_index == self.back_index {
            return None;
        }

        let idx = self.front_index;
        self.front_index += 1;
        unsafe { Some(self.parent.raw.slot(idx).read()) }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.back_index - self.front_index;
        (len, Some(len))
    }
}

impl<T, const P: u32, A: ChunkAllocator> DoubleEndedIterator for Drain<'_, T, P, A> {
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        if self.back_index == self.front_index {
            return None;
        }

        self.back_index -= 1;
        unsafe { Some(self.parent.raw.slot(self.back_index).read()) }
    }
}

impl<T, const P: u32, A: ChunkAllocator> ExactSizeIterator for Drain<'_, T, P, A> {}
impl<T, const P: u32, A: ChunkAllocator> FusedIterator for Drain<'_, T, P, A> {}

impl<T, const P: u32, A: ChunkAllocator> Drop for Drain<'_, T, P, A> {
    fn drop(&mut self) {
        let raw = &mut self.parent.raw;

        // 1. drop any items that remain untaken
        while self.front_index < self.back_index {
            let idx = self.front_index;
            self.front_index += 1;
            unsafe { raw.slot(idx).drop_in_place() };
        }

        // 2. close the gap by moving whichever side holds fewer elements
        let gap = self.target_end - self.target_start;
        let head = self.target_start - raw.start;
        let tail = self.original_end - self.target_end;
        if gap == 0 {
            raw.end = self.original_end;
            return;
        }

        // surviving elements move
        raw.bump_epoch();
        if head < tail {
            for idx in (raw.start..self.target_start).rev() {
                unsafe { raw.slot(idx + gap).write(raw.slot(idx).read()) };
            }
            raw.start += gap;
            raw.end = self.original_end;
        } else {
            for idx in self.target_end..self.original_end {
                unsafe { raw.slot(idx - gap).write(raw.slot(idx).read()) };
            }
            raw.end = self.original_end - gap;
        }
    }
}

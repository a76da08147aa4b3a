//! A double-ended queue built from fixed-size chunks.
//!
//! This queue has amortized O(1) inserts and removals at both ends of the
//! sequence, and O(1) indexing like a vector. Unlike a ring buffer, growing
//! it never moves existing elements: storage is added one chunk at a time,
//! and a chunk that falls out of use at one end is handed over to the other
//! end before a new one is allocated.

use core::cmp::Ordering;
use core::fmt::{self, Debug, Formatter};
use core::hash::{Hash, Hasher};
use core::mem;
use core::ops::{Bound, Index, IndexMut, Range, RangeBounds};

use crate::allocator::{ChunkAllocator, Global};
use crate::cursor::{Cursor, Position};
use crate::error::Error;
use crate::iter::{Drain, IntoIter, Iter, IterMut};
use crate::raw::{End, RawChunks};

/// A double-ended queue storing its elements in chunks of `2^P` slots.
///
/// Element `i` lives at a fixed slot of one of the chunks; the chunks are
/// kept in a table ordered from front to back. Elements are never moved by
/// growth, only the table is. Chunks are requested from an allocator of type
/// `A`, which defaults to the [global heap](Global).
///
/// The "default" usage of this type as a queue is to use
/// [`push_back`](ChunkVec::push_back) to add to the queue, and
/// [`pop_front`](ChunkVec::pop_front) to remove from it.
///
/// # Examples
/// ```
/// use chunkvec::ChunkVec;
///
/// let mut queue = ChunkVec::<&str, 4>::new();
/// queue.push_back("b");
/// queue.push_back("c");
/// queue.push_front("a");
/// assert_eq!(queue, ["a", "b", "c"]);
/// assert_eq!(queue.chunk_count(), 2);
///
/// assert_eq!(queue.pop_front(), Some("a"));
/// assert_eq!(queue[0], "b");
/// ```
pub struct ChunkVec<T, const P: u32, A: ChunkAllocator = Global> {
    pub(crate) raw: RawChunks<T, P>,
    alloc: A,
}

unsafe impl<T: Send, const P: u32, A: ChunkAllocator + Send> Send for ChunkVec<T, P, A> {}
unsafe impl<T: Sync, const P: u32, A: ChunkAllocator + Sync> Sync for ChunkVec<T, P, A> {}

#[cold]
#[inline(never)]
#[track_caller]
fn growth_failed(error: Error) -> ! {
    panic!("chunk vector failed to grow: {}", error)
}

#[cold]
#[inline(never)]
#[track_caller]
fn index_out_of_range(index: usize, len: usize) -> ! {
    panic!("index out of bounds: the len is {} but the index is {}", len, index)
}

/// Converts any range over `usize` into `start..end`, checked against `len`.
#[track_caller]
fn normalize_range<R: RangeBounds<usize>>(range: R, len: usize) -> Range<usize> {
    let start = match range.start_bound() {
        Bound::Included(&n) => n,
        Bound::Excluded(&n) => match n.checked_add(1) {
            Some(n) => n,
            None => panic!("attempted to index slice from after maximum usize"),
        },
        Bound::Unbounded => 0,
    };

    let end = match range.end_bound() {
        Bound::Included(&n) => match n.checked_add(1) {
            Some(n) => n,
            None => panic!("attempted to index slice up to maximum usize"),
        },
        Bound::Excluded(&n) => n,
        Bound::Unbounded => len,
    };

    if start > end {
        panic!("range start (is {}) should be <= range end (is {})", start, end);
    }
    if end > len {
        panic!("range end (is {}) should be <= length (is {})", end, len);
    }

    start..end
}

impl<T, const P: u32, A: ChunkAllocator + Default> ChunkVec<T, P, A> {
    /// Constructs a new, empty `ChunkVec` using the default allocator.
    ///
    /// Nothing is allocated until the first element is inserted.
    #[inline]
    pub fn new() -> Self {
        Self::with_allocator(A::default())
    }
}

impl<T, const P: u32, A: ChunkAllocator> ChunkVec<T, P, A> {
    /// The number of element slots in each chunk.
    pub const CHUNK_SIZE: usize = RawChunks::<T, P>::CHUNK;

    /// Constructs a new, empty `ChunkVec` that obtains its chunks from `alloc`.
    #[inline]
    pub const fn with_allocator(alloc: A) -> Self {
        ChunkVec {
            raw: RawChunks::new(),
            alloc,
        }
    }

    /// Returns a reference to the allocator backing the `ChunkVec`.
    #[inline]
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Returns the number of elements in the `ChunkVec`.
    #[inline]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the `ChunkVec` contains no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns the total number of element slots in all allocated chunks,
    /// including those in front of the first element.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    /// Returns the number of chunks currently owned by the `ChunkVec`.
    #[inline]
    pub fn chunk_count(&self) -> usize {
        self.raw.chunks.len()
    }

    /// Makes sure at least `additional` more elements can be appended to the
    /// back without allocating, or returns an error if that is impossible.
    ///
    /// Whole chunks that are unused at the front are moved to the back before
    /// any new ones are requested from the allocator. On failure, the
    /// `ChunkVec` is left exactly as it was.
    ///
    /// # Examples
    /// ```
    /// use chunkvec::ChunkVec;
    ///
    /// let mut vec = ChunkVec::<u8, 3>::new();
    /// assert!(vec.try_reserve_back(10).is_ok());
    /// assert_eq!(vec.capacity(), 16);
    /// assert!(vec.try_reserve_back(usize::MAX).is_err());
    /// assert_eq!(vec.capacity(), 16);
    /// ```
    #[inline]
    pub fn try_reserve_back(&mut self, additional: usize) -> Result<(), Error> {
        self.raw.grow(End::Back, additional, &mut self.alloc)
    }

    /// Makes sure at least `additional` more elements can be prepended to the
    /// front without allocating, or returns an error if that is impossible.
    ///
    /// This is the mirror image of [`try_reserve_back`](ChunkVec::try_reserve_back).
    #[inline]
    pub fn try_reserve_front(&mut self, additional: usize) -> Result<(), Error> {
        self.raw.grow(End::Front, additional, &mut self.alloc)
    }

    /// Makes sure at least `additional` more elements can be appended to the
    /// back without allocating.
    ///
    /// # Panics
    /// Panics if the required storage cannot be obtained. See
    /// [`try_reserve_back`](ChunkVec::try_reserve_back) for a checked variant.
    #[track_caller]
    pub fn reserve_back(&mut self, additional: usize) {
        if let Err(e) = self.try_reserve_back(additional) {
            growth_failed(e);
        }
    }

    /// Makes sure at least `additional` more elements can be prepended to the
    /// front without allocating.
    ///
    /// # Panics
    /// Panics if the required storage cannot be obtained. See
    /// [`try_reserve_front`](ChunkVec::try_reserve_front) for a checked variant.
    #[track_caller]
    pub fn reserve_front(&mut self, additional: usize) {
        if let Err(e) = self.try_reserve_front(additional) {
            growth_failed(e);
        }
    }

    /// Reserves room for `n.unsigned_abs()` more elements, at the back if `n`
    /// is non-negative and at the front otherwise.
    ///
    /// # Examples
    /// ```
    /// use chunkvec::ChunkVec;
    ///
    /// let mut vec = ChunkVec::<u8, 2>::new();
    /// vec.try_reserve(-6).unwrap();
    /// assert_eq!(vec.capacity(), 8);
    /// for i in 0..6 {
    ///     vec.push_front(i);
    /// }
    /// assert_eq!(vec.capacity(), 8);
    /// ```
    pub fn try_reserve(&mut self, n: isize) -> Result<(), Error> {
        if n < 0 {
            self.try_reserve_front(n.unsigned_abs())
        } else {
            self.try_reserve_back(n.unsigned_abs())
        }
    }

    /// Reserves room for `n.unsigned_abs()` more elements, at the back if `n`
    /// is non-negative and at the front otherwise.
    ///
    /// # Panics
    /// Panics if the required storage cannot be obtained. See
    /// [`try_reserve`](ChunkVec::try_reserve) for a checked variant.
    #[track_caller]
    pub fn reserve(&mut self, n: isize) {
        if let Err(e) = self.try_reserve(n) {
            growth_failed(e);
        }
    }

    fn try_emplace_with<F: FnOnce() -> T>(&mut self, end: End, f: F) -> Result<&mut T, Error> {
        self.raw.grow(end, 1, &mut self.alloc)?;

        let index = match end {
            End::Back => self.raw.end,
            End::Front => self.raw.start - 1,
        };

        // the bounds only move once the value exists, so a panic in `f` is harmless
        let slot = unsafe { self.raw.slot(index) };
        unsafe { slot.write(f()) };

        match end {
            End::Back => self.raw.end += 1,
            End::Front => self.raw.start -= 1,
        }

        Ok(unsafe { &mut *slot })
    }

    /// Appends the value returned by `f` to the back of the `ChunkVec`,
    /// constructing it directly in its slot.
    ///
    /// Storage is obtained before `f` is called. If that fails, `f` is never
    /// called; if `f` panics, no element is added.
    ///
    /// # Examples
    /// ```
    /// use chunkvec::ChunkVec;
    ///
    /// let mut vec = ChunkVec::<[u64; 4], 1>::new();
    /// let slot = vec.try_emplace_back_with(|| [7; 4]).unwrap();
    /// slot[0] = 1;
    /// assert_eq!(vec[0], [1, 7, 7, 7]);
    /// ```
    #[inline]
    pub fn try_emplace_back_with<F: FnOnce() -> T>(&mut self, f: F) -> Result<&mut T, Error> {
        self.try_emplace_with(End::Back, f)
    }

    /// Prepends the value returned by `f` to the front of the `ChunkVec`,
    /// constructing it directly in its slot.
    ///
    /// Storage is obtained before `f` is called. If that fails, `f` is never
    /// called; if `f` panics, no element is added.
    #[inline]
    pub fn try_emplace_front_with<F: FnOnce() -> T>(&mut self, f: F) -> Result<&mut T, Error> {
        self.try_emplace_with(End::Front, f)
    }

    /// Appends the value returned by `f` to the back of the `ChunkVec`.
    ///
    /// # Panics
    /// Panics if storage for the new element cannot be obtained. See
    /// [`try_emplace_back_with`](ChunkVec::try_emplace_back_with) for a
    /// checked variant.
    #[track_caller]
    pub fn emplace_back_with<F: FnOnce() -> T>(&mut self, f: F) -> &mut T {
        match self.try_emplace_with(End::Back, f) {
            Ok(slot) => slot,
            Err(e) => growth_failed(e),
        }
    }

    /// Prepends the value returned by `f` to the front of the `ChunkVec`.
    ///
    /// # Panics
    /// Panics if storage for the new element cannot be obtained. See
    /// [`try_emplace_front_with`](ChunkVec::try_emplace_front_with) for a
    /// checked variant.
    #[track_caller]
    pub fn emplace_front_with<F: FnOnce() -> T>(&mut self, f: F) -> &mut T {
        match self.try_emplace_with(End::Front, f) {
            Ok(slot) => slot,
            Err(e) => growth_failed(e),
        }
    }

    /// Appends an element to the back of the `ChunkVec`, returning an error
    /// if no storage could be obtained for it.
    ///
    /// On failure, the `ChunkVec` is unchanged and `value` is dropped.
    ///
    /// # Examples
    /// ```
    /// use core::mem::MaybeUninit;
    /// use chunkvec::{arena::Arena, ChunkVec, Error};
    ///
    /// let mut region = [MaybeUninit::uninit(); 8];
    /// let mut vec = ChunkVec::<u16, 2, _>::with_allocator(Arena::from_buffer(&mut region[..]));
    /// while vec.try_push_back(1).is_ok() {}
    /// assert!(vec.len() <= 4);
    /// assert!(matches!(vec.try_push_back(2), Err(Error::AllocFailed { .. })));
    /// ```
    #[inline]
    pub fn try_push_back(&mut self, value: T) -> Result<(), Error> {
        self.try_emplace_with(End::Back, move || value).map(|_| ())
    }

    /// Prepends an element to the front of the `ChunkVec`, returning an error
    /// if no storage could be obtained for it.
    ///
    /// On failure, the `ChunkVec` is unchanged and `value` is dropped.
    #[inline]
    pub fn try_push_front(&mut self, value: T) -> Result<(), Error> {
        self.try_emplace_with(End::Front, move || value).map(|_| ())
    }

    /// Appends an element to the back of the `ChunkVec`.
    ///
    /// # Panics
    /// Panics if storage for the new element cannot be obtained. See
    /// [`try_push_back`](ChunkVec::try_push_back) for a checked variant that
    /// never panics.
    #[track_caller]
    pub fn push_back(&mut self, value: T) {
        if let Err(e) = self.try_push_back(value) {
            growth_failed(e);
        }
    }

    /// Prepends an element to the front of the `ChunkVec`.
    ///
    /// # Panics
    /// Panics if storage for the new element cannot be obtained. See
    /// [`try_push_front`](ChunkVec::try_push_front) for a checked variant
    /// that never panics.
    #[track_caller]
    pub fn push_front(&mut self, value: T) {
        if let Err(e) = self.try_push_front(value) {
            growth_failed(e);
        }
    }

    /// Appends `T::default()` to the back of the `ChunkVec`.
    #[track_caller]
    pub fn push_back_default(&mut self) -> &mut T
    where
        T: Default,
    {
        self.emplace_back_with(T::default)
    }

    /// Prepends `T::default()` to the front of the `ChunkVec`.
    #[track_caller]
    pub fn push_front_default(&mut self) -> &mut T
    where
        T: Default,
    {
        self.emplace_front_with(T::default)
    }

    /// Removes the last element from the `ChunkVec` and returns it, or [`None`]
    /// if it is empty.
    ///
    /// No storage is released; see [`shrink_to_fit`](ChunkVec::shrink_to_fit).
    #[inline]
    pub fn pop_back(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        self.raw.end -= 1;
        unsafe { Some(self.raw.slot(self.raw.end).read()) }
    }

    /// Removes the first element from the `ChunkVec` and returns it, or [`None`]
    /// if it is empty.
    ///
    /// No storage is released; see [`shrink_to_fit`](ChunkVec::shrink_to_fit).
    #[inline]
    pub fn pop_front(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        let index = self.raw.start;
        self.raw.start += 1;
        unsafe { Some(self.raw.slot(index).read()) }
    }

    /// Shortens the `ChunkVec`, keeping the first `len` elements and dropping
    /// the rest.
    ///
    /// If `len` is greater than or equal to the current length, this has no effect.
    pub fn truncate_back(&mut self, len: usize) {
        if len >= self.len() {
            return;
        }

        let old_end = self.raw.end;
        let new_end = self.raw.start + len;
        self.raw.end = new_end;
        for index in new_end..old_end {
            unsafe { self.raw.slot(index).drop_in_place() };
        }
    }

    /// Shortens the `ChunkVec`, keeping the last `len` elements and dropping
    /// the rest.
    ///
    /// If `len` is greater than or equal to the current length, this has no effect.
    pub fn truncate_front(&mut self, len: usize) {
        if len >= self.len() {
            return;
        }

        let old_start = self.raw.start;
        let new_start = self.raw.end - len;
        self.raw.start = new_start;
        for index in old_start..new_start {
            unsafe { self.raw.slot(index).drop_in_place() };
        }
    }

    /// Drops every element, keeping all allocated chunks.
    #[inline]
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Resizes the `ChunkVec` to `n.unsigned_abs()` elements, growing or
    /// shrinking it at the back if `n` is non-negative and at the front
    /// otherwise, and fills new slots with values returned by `f`.
    ///
    /// Storage for all new elements is obtained before `f` is first called,
    /// so a failure leaves the `ChunkVec` untouched.
    ///
    /// # Examples
    /// ```
    /// use chunkvec::ChunkVec;
    ///
    /// let mut vec = ChunkVec::<i32, 2>::from([1, 2, 3]);
    /// let mut next = 10;
    /// vec.try_resize_with(-5, || { next += 1; next }).unwrap();
    /// assert_eq!(vec, [12, 11, 1, 2, 3]);
    /// vec.try_resize_with(-1, || unreachable!()).unwrap();
    /// assert_eq!(vec, [3]);
    /// ```
    pub fn try_resize_with<F: FnMut() -> T>(&mut self, n: isize, mut f: F) -> Result<(), Error> {
        let target = n.unsigned_abs();
        let end = if n < 0 { End::Front } else { End::Back };
        let len = self.len();

        if target <= len {
            match end {
                End::Back => self.truncate_back(target),
                End::Front => self.truncate_front(target),
            }
            return Ok(());
        }

        self.raw.grow(end, target - len, &mut self.alloc)?;
        for _ in len..target {
            self.try_emplace_with(end, &mut f)?;
        }

        Ok(())
    }

    /// Resizes the `ChunkVec` to `n.unsigned_abs()` elements at the end
    /// selected by the sign of `n`, filling new slots with values returned
    /// by `f`.
    ///
    /// # Panics
    /// Panics if storage for the new elements cannot be obtained. See
    /// [`try_resize_with`](ChunkVec::try_resize_with) for a checked variant.
    #[track_caller]
    pub fn resize_with<F: FnMut() -> T>(&mut self, n: isize, f: F) {
        if let Err(e) = self.try_resize_with(n, f) {
            growth_failed(e);
        }
    }

    /// Resizes the `ChunkVec` to `n.unsigned_abs()` elements at the end
    /// selected by the sign of `n`, filling new slots with clones of `value`.
    ///
    /// # Panics
    /// Panics if storage for the new elements cannot be obtained.
    ///
    /// # Examples
    /// ```
    /// use chunkvec::ChunkVec;
    ///
    /// let mut vec = ChunkVec::<i32, 2>::from([1, 2, 3, 4, 5]);
    /// vec.resize(2, 0);
    /// assert_eq!(vec, [1, 2]);
    ///
    /// let mut vec = ChunkVec::<i32, 2>::from([1, 2, 3, 4, 5]);
    /// vec.resize(-2, 0);
    /// assert_eq!(vec, [4, 5]);
    ///
    /// let mut vec = ChunkVec::<i32, 2>::from([1, 2, 3]);
    /// vec.resize(7, 0);
    /// assert_eq!(vec, [1, 2, 3, 0, 0, 0, 0]);
    /// ```
    #[track_caller]
    pub fn resize(&mut self, n: isize, value: T)
    where
        T: Clone,
    {
        self.resize_with(n, || value.clone());
    }

    /// Resizes the `ChunkVec` to `n.unsigned_abs()` elements at the end
    /// selected by the sign of `n`, filling new slots with `T::default()`.
    ///
    /// # Panics
    /// Panics if storage for the new elements cannot be obtained.
    #[track_caller]
    pub fn resize_default(&mut self, n: isize)
    where
        T: Default,
    {
        self.resize_with(n, T::default);
    }

    /// Returns a reference to the element at `index`, or an
    /// [`OutOfRange`](Error::OutOfRange) error if there is none.
    ///
    /// # Examples
    /// ```
    /// use chunkvec::{ChunkVec, Error};
    ///
    /// let vec = ChunkVec::<char, 1>::from(['a', 'b', 'c']);
    /// assert_eq!(vec.at(2), Ok(&'c'));
    /// assert_eq!(vec.at(3), Err(Error::OutOfRange { index: 3, len: 3 }));
    /// ```
    #[inline]
    pub fn at(&self, index: usize) -> Result<&T, Error> {
        let len = self.len();
        self.get(index).ok_or(Error::OutOfRange { index, len })
    }

    /// Returns a mutable reference to the element at `index`, or an
    /// [`OutOfRange`](Error::OutOfRange) error if there is none.
    #[inline]
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, Error> {
        let len = self.len();
        self.get_mut(index).ok_or(Error::OutOfRange { index, len })
    }

    /// Returns a reference to the element at `index`, or [`None`] if out of bounds.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        let index = self.raw.absolute(index)?;
        unsafe { Some(&*self.raw.slot(index)) }
    }

    /// Returns a mutable reference to the element at `index`, or [`None`] if out of bounds.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        let index = self.raw.absolute(index)?;
        unsafe { Some(&mut *self.raw.slot(index)) }
    }

    /// Returns a reference to the element at `index` without bounds checking.
    ///
    /// # Safety
    /// `index` must be less than [`len`](ChunkVec::len).
    #[inline]
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        debug_assert!(index < self.len());
        &*self.raw.slot(self.raw.start + index)
    }

    /// Returns a mutable reference to the element at `index` without bounds checking.
    ///
    /// # Safety
    /// `index` must be less than [`len`](ChunkVec::len).
    #[inline]
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index < self.len());
        &mut *self.raw.slot(self.raw.start + index)
    }

    /// Returns a reference to the first element, or [`None`] if the `ChunkVec` is empty.
    #[inline]
    pub fn front(&self) -> Option<&T> {
        self.get(0)
    }

    /// Returns a mutable reference to the first element, or [`None`] if the `ChunkVec` is empty.
    #[inline]
    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.get_mut(0)
    }

    /// Returns a reference to the last element, or [`None`] if the `ChunkVec` is empty.
    #[inline]
    pub fn back(&self) -> Option<&T> {
        self.get(self.len().wrapping_sub(1))
    }

    /// Returns a mutable reference to the last element, or [`None`] if the `ChunkVec` is empty.
    #[inline]
    pub fn back_mut(&mut self) -> Option<&mut T> {
        self.get_mut(self.len().wrapping_sub(1))
    }

    /// Returns `true` if the `ChunkVec` contains an element equal to `x`.
    pub fn contains(&self, x: &T) -> bool
    where
        T: PartialEq,
    {
        self.iter().any(|e| e == x)
    }

    /// Returns every whole chunk that holds no element to the allocator, and
    /// trims the chunk table to fit.
    ///
    /// An empty `ChunkVec` releases all of its storage. Calling this twice in
    /// a row has the same effect as calling it once.
    ///
    /// # Examples
    /// ```
    /// use chunkvec::ChunkVec;
    ///
    /// let mut vec = ChunkVec::<u32, 2>::new();
    /// vec.extend(0..16);
    /// vec.truncate_front(3);
    /// vec.truncate_back(2);
    /// assert_eq!(vec.capacity(), 16);
    ///
    /// vec.shrink_to_fit();
    /// assert_eq!(vec.capacity(), 4);
    /// assert_eq!(vec, [13, 14]);
    /// ```
    pub fn shrink_to_fit(&mut self) {
        self.raw.shrink(true, &mut self.alloc);
        self.raw.chunks.shrink_to_fit();
    }

    /// Exchanges the contents and allocators of `self` and `other`.
    ///
    /// Afterwards, both release the unused chunks at their back; chunks in
    /// front of the first element are kept so that indices stay put.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(&mut self.raw, &mut other.raw);
        mem::swap(&mut self.alloc, &mut other.alloc);
        self.raw.shrink(false, &mut self.alloc);
        other.raw.shrink(false, &mut other.alloc);
    }

    /// Returns a front-to-back iterator.
    #[inline]
    pub fn iter(&self) -> Iter<'_, T, P> {
        Iter::new(&self.raw.chunks, self.raw.start, self.raw.end)
    }

    /// Returns a front-to-back iterator that returns mutable references.
    #[inline]
    pub fn iter_mut(&mut self) -> IterMut<'_, T, P> {
        IterMut::new(&self.raw.chunks, self.raw.start, self.raw.end)
    }

    /// Creates an iterator that covers the specified range in the `ChunkVec`.
    ///
    /// # Panics
    /// Panics if the starting point is greater than the end point or if the
    /// end point is greater than the length of the `ChunkVec`.
    ///
    /// # Examples
    /// ```
    /// use chunkvec::ChunkVec;
    ///
    /// let vec: ChunkVec<i32, 1> = (1..=5).collect();
    /// let mut it = vec.range(2..4);
    /// assert_eq!(it.next(), Some(&3));
    /// assert_eq!(it.next(), Some(&4));
    /// assert!(it.next().is_none());
    /// ```
    #[track_caller]
    pub fn range<R: RangeBounds<usize>>(&self, range: R) -> Iter<'_, T, P> {
        let Range { start, end } = normalize_range(range, self.len());
        let base = self.raw.start;
        Iter::new(&self.raw.chunks, base + start, base + end)
    }

    /// Creates a mutable iterator that covers the specified range in the `ChunkVec`.
    ///
    /// # Panics
    /// Panics if the starting point is greater than the end point or if the
    /// end point is greater than the length of the `ChunkVec`.
    ///
    /// # Examples
    /// ```
    /// use chunkvec::ChunkVec;
    ///
    /// let mut vec: ChunkVec<i32, 1> = (1..=5).collect();
    /// vec.range_mut(2..4).for_each(|x| *x *= 2);
    /// assert_eq!(vec, [1, 2, 6, 8, 5]);
    /// ```
    #[track_caller]
    pub fn range_mut<R: RangeBounds<usize>>(&mut self, range: R) -> IterMut<'_, T, P> {
        let Range { start, end } = normalize_range(range, self.len());
        let base = self.raw.start;
        IterMut::new(&self.raw.chunks, base + start, base + end)
    }

    /// Creates a draining iterator that removes the specified range in the
    /// `ChunkVec` and yields the removed items.
    ///
    /// When the iterator **is** dropped, all elements in the range are
    /// removed, even if the iterator was not fully consumed; the gap is closed
    /// by moving whichever side of it holds fewer elements. If the iterator
    /// **is not** dropped (with [`core::mem::forget`] for example), only the
    /// elements in front of the range remain.
    ///
    /// # Panics
    /// Panics if the starting point is greater than the end point or if the
    /// end point is greater than the length of the `ChunkVec`.
    ///
    /// # Examples
    /// ```
    /// use chunkvec::ChunkVec;
    ///
    /// let mut vec: ChunkVec<i32, 1> = (1..=5).collect();
    /// let drained: Vec<i32> = vec.drain(1..4).collect();
    /// assert_eq!(drained, [2, 3, 4]);
    /// assert_eq!(vec, [1, 5]);
    ///
    /// // a full range clears the vector
    /// vec.drain(..);
    /// assert!(vec.is_empty());
    /// ```
    #[track_caller]
    pub fn drain<R: RangeBounds<usize>>(&mut self, range: R) -> Drain<'_, T, P, A> {
        let Range { start, end } = normalize_range(range, self.len());
        let base = self.raw.start;
        Drain::new(self, base + start, base + end)
    }

    /// Returns a cursor pointing at the first element.
    #[inline]
    pub fn begin(&self) -> Cursor<'_, T, P> {
        self.cursor_at(0)
    }

    /// Returns a cursor pointing one past the last element.
    #[inline]
    pub fn end(&self) -> Cursor<'_, T, P> {
        self.cursor_at(self.len())
    }

    /// Returns a cursor pointing at the element at `index`.
    ///
    /// The cursor may point anywhere; it simply yields no element while it is
    /// outside of the `ChunkVec`'s bounds.
    ///
    /// # Examples
    /// ```
    /// use chunkvec::ChunkVec;
    ///
    /// let vec: ChunkVec<u32, 2> = (0..10).collect();
    /// let mut cursor = vec.cursor_at(3);
    /// assert_eq!(cursor.get(), Some(&3));
    /// cursor += 5;
    /// assert_eq!(cursor.at(-1), Some(&7));
    /// assert_eq!(vec.end() - cursor, 2);
    /// ```
    #[inline]
    pub fn cursor_at(&self, index: usize) -> Cursor<'_, T, P> {
        let raw = &self.raw;
        Cursor::new(
            &raw.chunks,
            raw.start.wrapping_add(index),
            raw.start..raw.end,
            raw.epoch,
        )
    }

    /// Returns a detached handle to the element at `index`.
    ///
    /// Unlike a [`Cursor`], a [`Position`] does not borrow the `ChunkVec`.
    /// It keeps referring to the same element across insertions and removals
    /// that leave the placement of the chunks alone, such as pushing to the
    /// back while there is room. Once the chunks are moved around, it is
    /// rejected by [`resolve`](ChunkVec::resolve) and friends.
    ///
    /// # Examples
    /// ```
    /// use chunkvec::ChunkVec;
    ///
    /// let mut vec: ChunkVec<u32, 2> = (0..3).collect();
    /// let pos = vec.position_of(1);
    /// vec.push_back(3);
    /// vec.push_back(4);
    /// assert_eq!(vec.resolve(pos), Some(&1));
    ///
    /// vec.push_front(99);
    /// assert_eq!(vec.resolve(pos), None);
    /// ```
    #[inline]
    pub fn position_of(&self, index: usize) -> Position {
        Position::new(self.raw.start.wrapping_add(index), self.raw.epoch)
    }

    /// Returns the current index of the element `pos` refers to, or [`None`]
    /// if `pos` is stale or beyond the bounds of the `ChunkVec`.
    ///
    /// One past the last element is accepted, so `offset_of(position_of(len))`
    /// yields `Some(len)`.
    #[inline]
    pub fn offset_of(&self, pos: Position) -> Option<usize> {
        let raw = &self.raw;
        if pos.epoch != raw.epoch || pos.index < raw.start || pos.index > raw.end {
            return None;
        }
        Some(pos.index - raw.start)
    }

    /// Returns a reference to the element `pos` refers to, or [`None`] if
    /// `pos` is stale or does not refer to an element.
    #[inline]
    pub fn resolve(&self, pos: Position) -> Option<&T> {
        if pos.epoch != self.raw.epoch || !self.raw.contains(pos.index) {
            return None;
        }
        unsafe { Some(&*self.raw.slot(pos.index)) }
    }

    /// Returns a mutable reference to the element `pos` refers to, or [`None`]
    /// if `pos` is stale or does not refer to an element.
    #[inline]
    pub fn resolve_mut(&mut self, pos: Position) -> Option<&mut T> {
        if pos.epoch != self.raw.epoch || !self.raw.contains(pos.index) {
            return None;
        }
        unsafe { Some(&mut *self.raw.slot(pos.index)) }
    }

    /// Reattaches `pos` to the `ChunkVec`, or returns [`None`] if it is stale.
    #[inline]
    pub fn cursor_from(&self, pos: Position) -> Option<Cursor<'_, T, P>> {
        let raw = &self.raw;
        if pos.epoch != raw.epoch {
            return None;
        }
        Some(Cursor::new(&raw.chunks, pos.index, raw.start..raw.end, raw.epoch))
    }

    /// Creates a deep copy of the `ChunkVec` using a clone of its allocator,
    /// or returns an error if storage for it cannot be obtained.
    ///
    /// The copy holds just enough chunks for its elements.
    pub fn try_clone(&self) -> Result<Self, Error>
    where
        T: Clone,
        A: Clone,
    {
        let mut result = Self::with_allocator(self.alloc.clone());
        result.try_reserve_back(self.len())?;
        for item in self.iter() {
            result.try_push_back(item.clone())?;
        }
        Ok(result)
    }
}

impl<T, const P: u32, A: ChunkAllocator> Drop for ChunkVec<T, P, A> {
    fn drop(&mut self) {
        // releases the chunks even if an element's destructor panics
        struct Release<'a, T, const P: u32, A: ChunkAllocator>(&'a mut ChunkVec<T, P, A>);

        impl<T, const P: u32, A: ChunkAllocator> Drop for Release<'_, T, P, A> {
            fn drop(&mut self) {
                let vec = &mut *self.0;
                unsafe { vec.raw.release_all(&mut vec.alloc) };
            }
        }

        let guard = Release(self);
        guard.0.raw.clear();
    }
}

impl<T, const P: u32, A: ChunkAllocator + Default> Default for ChunkVec<T, P, A> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, const P: u32, A: ChunkAllocator + Clone> Clone for ChunkVec<T, P, A> {
    #[track_caller]
    fn clone(&self) -> Self {
        match self.try_clone() {
            Ok(result) => result,
            Err(e) => growth_failed(e),
        }
    }

    #[track_caller]
    fn clone_from(&mut self, source: &Self) {
        self.clear();
        self.extend(source.iter().cloned());
    }
}

impl<T: Debug, const P: u32, A: ChunkAllocator> Debug for ChunkVec<T, P, A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: Hash, const P: u32, A: ChunkAllocator> Hash for ChunkVec<T, P, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        self.iter().for_each(|item| item.hash(state));
    }
}

impl<T, U, const P: u32, const Q: u32, A, B> PartialEq<ChunkVec<U, Q, B>> for ChunkVec<T, P, A>
where
    T: PartialEq<U>,
    A: ChunkAllocator,
    B: ChunkAllocator,
{
    fn eq(&self, other: &ChunkVec<U, Q, B>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq, const P: u32, A: ChunkAllocator> Eq for ChunkVec<T, P, A> {}

impl<T: PartialEq, const P: u32, A: ChunkAllocator, R: AsRef<[T]>> PartialEq<R> for ChunkVec<T, P, A> {
    fn eq(&self, other: &R) -> bool {
        let other = other.as_ref();
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T, const P: u32, const Q: u32, A, B> PartialOrd<ChunkVec<T, Q, B>> for ChunkVec<T, P, A>
where
    T: PartialOrd,
    A: ChunkAllocator,
    B: ChunkAllocator,
{
    fn partial_cmp(&self, other: &ChunkVec<T, Q, B>) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord, const P: u32, A: ChunkAllocator> Ord for ChunkVec<T, P, A> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T, const P: u32, A: ChunkAllocator> Index<usize> for ChunkVec<T, P, A> {
    type Output = T;

    #[inline]
    #[track_caller]
    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Some(item) => item,
            None => index_out_of_range(index, self.len()),
        }
    }
}

impl<T, const P: u32, A: ChunkAllocator> IndexMut<usize> for ChunkVec<T, P, A> {
    #[inline]
    #[track_caller]
    fn index_mut(&mut self, index: usize) -> &mut T {
        let len = self.len();
        match self.get_mut(index) {
            Some(item) => item,
            None => index_out_of_range(index, len),
        }
    }
}

impl<T, const P: u32, A: ChunkAllocator> Extend<T> for ChunkVec<T, P, A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve_back(iter.size_hint().0);
        iter.for_each(|item| self.push_back(item));
    }
}

impl<'a, T: 'a + Clone, const P: u32, A: ChunkAllocator> Extend<&'a T> for ChunkVec<T, P, A> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().cloned());
    }
}

impl<T, const P: u32, A: ChunkAllocator + Default> FromIterator<T> for ChunkVec<T, P, A> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut result = Self::new();
        result.extend(iter);
        result
    }
}

impl<T, const P: u32, const N: usize, A: ChunkAllocator + Default> From<[T; N]> for ChunkVec<T, P, A> {
    fn from(array: [T; N]) -> Self {
        array.into_iter().collect()
    }
}

impl<T, const P: u32, A: ChunkAllocator> IntoIterator for ChunkVec<T, P, A> {
    type Item = T;
    type IntoIter = IntoIter<T, P, A>;

    #[inline]
    fn into_iter(self) -> IntoIter<T, P, A> {
        IntoIter { inner: self }
    }
}

impl<'a, T, const P: u32, A: ChunkAllocator> IntoIterator for &'a ChunkVec<T, P, A> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, P>;

    #[inline]
    fn into_iter(self) -> Iter<'a, T, P> {
        self.iter()
    }
}

impl<'a, T, const P: u32, A: ChunkAllocator> IntoIterator for &'a mut ChunkVec<T, P, A> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T, P>;

    #[inline]
    fn into_iter(self) -> IterMut<'a, T, P> {
        self.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::Counting;
    use crate::test_utils::{DropCounter, FailingAllocator};

    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};
    use core::cell::Cell;
    use std::collections::VecDeque;
    use std::panic::{catch_unwind, AssertUnwindSafe};
    use std::vec::Vec;

    #[test]
    fn push_and_pop_at_both_ends() {
        let mut vec = ChunkVec::<u32, 2>::new();
        assert_eq!(vec.pop_back(), None);
        assert_eq!(vec.pop_front(), None);
        assert_eq!(vec.front(), None);
        assert_eq!(vec.back(), None);

        for i in 0..10 {
            vec.push_back(i);
            vec.push_front(100 + i);
        }
        assert_eq!(vec.len(), 20);
        assert_eq!(vec.front(), Some(&109));
        assert_eq!(vec.back(), Some(&9));

        *vec.front_mut().unwrap() = 1;
        *vec.back_mut().unwrap() = 2;
        assert_eq!(vec.pop_front(), Some(1));
        assert_eq!(vec.pop_back(), Some(2));
        assert_eq!(vec.len(), 18);
        assert!(vec.contains(&108));
        assert!(!vec.contains(&109));
    }

    #[test]
    fn emptying_keeps_capacity() {
        let mut vec = ChunkVec::<u32, 3, Counting>::new();
        vec.extend(0..100);
        let capacity = vec.capacity();
        let allocations = vec.allocator().stats().allocations;

        for i in (0..100).rev() {
            assert_eq!(vec.pop_back(), Some(i));
        }
        assert!(vec.is_empty());
        assert_eq!(vec.capacity(), capacity);
        assert_eq!(vec.allocator().stats().deallocations, 0);

        vec.extend(0..100);
        assert_eq!(vec.allocator().stats().allocations, allocations);
    }

    #[test]
    fn shrink_to_fit_is_idempotent() {
        let mut vec = ChunkVec::<u32, 2, Counting>::new();
        vec.extend(0..40);
        vec.drain(..17);
        vec.truncate_back(10);
        assert_eq!(vec.capacity(), 40);

        vec.shrink_to_fit();
        let capacity = vec.capacity();
        let stats = vec.allocator().stats();
        assert_eq!(capacity, 12);
        assert!(vec.iter().copied().eq(17..27));

        vec.shrink_to_fit();
        assert_eq!(vec.capacity(), capacity);
        assert_eq!(vec.allocator().stats(), stats);

        vec.clear();
        vec.shrink_to_fit();
        assert_eq!(vec.capacity(), 0);
        assert_eq!(vec.allocator().stats().live_blocks(), 0);
    }

    #[test]
    fn oscillating_ends_reuse_chunks() {
        let mut vec = ChunkVec::<u32, 2, Counting>::new();
        vec.push_back(0);
        for i in 0..1000 {
            vec.push_front(i);
            vec.pop_back();
        }
        assert_eq!(vec.len(), 1);
        assert!(vec.capacity() <= 2 * ChunkVec::<u32, 2>::CHUNK_SIZE);
        assert_eq!(vec.allocator().stats().allocations, 2);

        for i in 0..1000 {
            vec.push_back(i);
            vec.pop_front();
        }
        assert_eq!(vec, [999]);
        assert!(vec.capacity() <= 2 * ChunkVec::<u32, 2>::CHUNK_SIZE);
        assert_eq!(vec.allocator().stats().allocations, 2);
    }

    #[test]
    fn alternating_chunk_sized_batches_stay_bounded() {
        const CHUNK: usize = ChunkVec::<u32, 3>::CHUNK_SIZE;

        let mut vec = ChunkVec::<u32, 3, Counting>::new();
        for cycle in 0..50 {
            for i in 0..CHUNK as u32 {
                vec.push_front(i);
            }
            for _ in 0..CHUNK {
                vec.pop_back();
            }
            for i in 0..CHUNK as u32 {
                vec.push_back(i);
            }
            for _ in 0..CHUNK {
                vec.pop_front();
            }
            assert!(vec.is_empty(), "cycle {}", cycle);
            assert!(vec.capacity() <= 3 * CHUNK, "cycle {}", cycle);
        }
        assert!(vec.allocator().stats().allocations <= 3);
    }

    #[test]
    fn resize_at_both_ends() {
        let mut vec = ChunkVec::<i32, 2>::from([1, 2, 3, 4, 5]);
        vec.resize(2, 0);
        assert_eq!(vec, [1, 2]);

        let mut vec = ChunkVec::<i32, 2>::from([1, 2, 3, 4, 5]);
        vec.resize(-2, 0);
        assert_eq!(vec, [4, 5]);

        let mut vec = ChunkVec::<i32, 2>::from([1, 2, 3]);
        vec.resize(7, 0);
        assert_eq!(vec, [1, 2, 3, 0, 0, 0, 0]);

        vec.resize(-9, -1);
        assert_eq!(vec, [-1, -1, 1, 2, 3, 0, 0, 0, 0]);

        vec.resize_default(0);
        assert!(vec.is_empty());

        vec.resize_default(-3);
        assert_eq!(vec, [0, 0, 0]);
        *vec.push_front_default() = 5;
        *vec.push_back_default() = 6;
        assert_eq!(vec, [5, 0, 0, 0, 6]);
    }

    #[test]
    fn failed_resize_changes_nothing() {
        let mut vec = ChunkVec::<u32, 2, _>::with_allocator(FailingAllocator::new(2));
        vec.extend(0..6);
        let capacity = vec.capacity();

        let mut calls = 0;
        let result = vec.try_resize_with(20, || {
            calls += 1;
            0
        });
        assert!(matches!(result, Err(Error::AllocFailed { .. })));
        assert_eq!(calls, 0);
        assert_eq!(vec.capacity(), capacity);
        assert!(vec.iter().copied().eq(0..6));

        assert!(vec.try_push_front(7).is_err());
        assert!(vec.try_emplace_front_with(|| unreachable!()).is_err());
        assert!(vec.iter().copied().eq(0..6));
    }

    #[test]
    #[should_panic(expected = "chunk vector failed to grow")]
    fn push_panics_when_out_of_memory() {
        let mut vec = ChunkVec::<u32, 1, _>::with_allocator(FailingAllocator::new(1));
        vec.push_back(0);
        vec.push_back(1);
        vec.push_back(2);
    }

    #[test]
    fn panicking_constructor_leaves_no_element() {
        let mut vec = ChunkVec::<u32, 2>::from([1, 2]);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            vec.emplace_front_with(|| panic!("boom"));
        }));
        assert!(result.is_err());
        assert_eq!(vec, [1, 2]);
    }

    #[test]
    fn at_rejects_len_for_all_sizes() {
        let mut vec = ChunkVec::<u32, 2>::new();
        for len in 0..20 {
            assert_eq!(vec.at(len), Err(Error::OutOfRange { index: len, len }));
            assert!(vec.at_mut(len).is_err());
            assert!(vec.get(len).is_none());
            if len > 0 {
                assert_eq!(vec.at(len - 1), Ok(&(len as u32 - 1)));
            }
            vec.push_back(len as u32);
        }
    }

    #[test]
    #[should_panic(expected = "index out of bounds")]
    fn index_panics_out_of_range() {
        let vec = ChunkVec::<u32, 2>::from([1, 2, 3]);
        let _value = vec[3];
    }

    #[test]
    fn indexing_reads_and_writes() {
        let mut vec = ChunkVec::<u32, 1>::new();
        for i in 0..7 {
            vec.push_front(i);
        }
        for i in 0..7 {
            vec[i] *= 10;
        }
        assert_eq!(vec[0], 60);
        assert_eq!(unsafe { *vec.get_unchecked(6) }, 0);
        unsafe { *vec.get_unchecked_mut(6) = 1 };
        assert_eq!(vec, [60, 50, 40, 30, 20, 10, 1]);
    }

    #[test]
    fn clones_are_independent() {
        let mut original: ChunkVec<Vec<u32>, 2> = (0..9).map(|i| std::vec![i]).collect();
        original.pop_front();

        let mut copy = original.clone();
        assert_eq!(copy.len(), original.len());
        assert_eq!(copy, original);
        assert_eq!(copy.capacity(), 8);

        copy[0].push(42);
        copy.push_back(std::vec![9]);
        assert_eq!(original[0], [1]);
        assert_eq!(original.len(), 8);

        let mut target = ChunkVec::<Vec<u32>, 2>::from([std::vec![7]]);
        target.clone_from(&original);
        assert_eq!(target, original);
    }

    #[test]
    fn clone_uses_a_fresh_counting_allocator() {
        let vec: ChunkVec<u32, 2, Counting> = (0..10).collect();
        let copy = vec.try_clone().unwrap();
        assert_eq!(copy.allocator().stats().allocations, 3);
        assert_eq!(vec.allocator().stats().allocations, 3);
    }

    #[test]
    fn drop_releases_everything() {
        let drop_count = DropCounter::new();
        let mut alloc = Counting::new(Global);
        {
            let mut vec = ChunkVec::<_, 2, _>::with_allocator(&mut alloc);
            for i in 0..13 {
                vec.push_front(drop_count.new_droppable(i));
            }
            vec.pop_back();
            assert_eq!(drop_count.dropped(), 1);
        }
        assert_eq!(drop_count.dropped(), 13);
        assert_eq!(alloc.stats().live_blocks(), 0);
        assert_eq!(alloc.stats().live_bytes, 0);
    }

    struct Bomb<'a> {
        armed: bool,
        dropped: &'a Cell<usize>,
    }

    impl Drop for Bomb<'_> {
        fn drop(&mut self) {
            self.dropped.set(self.dropped.get() + 1);
            if self.armed {
                panic!("bomb");
            }
        }
    }

    #[test]
    fn panicking_element_drop_still_releases_everything() {
        let dropped = Cell::new(0);
        let mut alloc = Counting::new(Global);

        let result = catch_unwind(AssertUnwindSafe(|| {
            let mut vec = ChunkVec::<_, 2, _>::with_allocator(&mut alloc);
            for i in 0..10 {
                vec.push_back(Bomb {
                    armed: i == 3,
                    dropped: &dropped,
                });
            }
        }));

        assert!(result.is_err());
        assert_eq!(dropped.get(), 10);
        assert_eq!(alloc.stats().live_blocks(), 0);
    }

    #[test]
    fn panicking_element_drop_still_clears() {
        let dropped = Cell::new(0);
        let mut vec = ChunkVec::<_, 2>::new();
        for i in 0..10 {
            vec.push_front(Bomb {
                armed: i == 5,
                dropped: &dropped,
            });
        }

        let result = catch_unwind(AssertUnwindSafe(|| vec.clear()));
        assert!(result.is_err());
        assert_eq!(dropped.get(), 10);
        assert!(vec.is_empty());
        assert_eq!(vec.capacity(), 12);

        vec.push_back(Bomb {
            armed: false,
            dropped: &dropped,
        });
        assert_eq!(vec.len(), 1);
    }

    #[test]
    fn truncation_drops_exactly_the_removed_elements() {
        let drop_count = DropCounter::new();
        let mut vec = ChunkVec::<_, 2>::new();
        for i in 0..10 {
            vec.push_back(drop_count.new_droppable(i));
        }

        vec.truncate_back(7);
        assert_eq!(drop_count.dropped(), 3);
        vec.truncate_front(4);
        assert_eq!(drop_count.dropped(), 6);
        assert!(vec.iter().map(|d| d.value).eq(3..7));

        vec.truncate_back(10);
        vec.truncate_front(10);
        assert_eq!(drop_count.dropped(), 6);

        vec.clear();
        assert_eq!(drop_count.dropped(), 10);
        assert_eq!(vec.capacity(), 12);
    }

    #[test]
    fn swap_exchanges_contents_and_trims_the_back() {
        let mut a = ChunkVec::<u32, 2, Counting>::new();
        a.reserve_back(16);
        a.extend(0..3);

        let mut b = ChunkVec::<u32, 2, Counting>::new();
        b.extend(10..20);
        b.drain(..5);

        a.swap(&mut b);
        assert!(a.iter().copied().eq(15..20));
        assert_eq!(a.capacity(), 12);
        assert_eq!(b, [0, 1, 2]);
        assert_eq!(b.capacity(), 4);
        assert_eq!(b.allocator().stats().deallocations, 3);
    }

    #[test]
    fn positions_follow_their_elements_across_swap() {
        let mut a: ChunkVec<u32, 2> = (0..10).collect();
        a.drain(..5);
        let mut b: ChunkVec<u32, 2> = (100..104).collect();
        b.reserve_back(8);

        let pa = a.position_of(1);
        let pb = b.position_of(2);
        let b_end = b.position_of(b.len());
        a.swap(&mut b);

        // `a` now trims the chunks `b` had reserved at the back
        assert_eq!(a.capacity(), 4);
        assert_eq!(b.resolve(pa), Some(&6));
        assert_eq!(b.offset_of(pa), Some(1));
        assert_eq!(a.resolve(pb), Some(&102));
        assert_eq!(a.offset_of(b_end), Some(4));
        assert_eq!(a.cursor_from(pb).and_then(|c| c.at(1).copied()), Some(103));
    }

    #[test]
    fn reserve_by_sign() {
        let mut vec = ChunkVec::<u8, 2, Counting>::new();
        vec.reserve(5);
        assert_eq!(vec.capacity(), 8);
        assert_eq!(vec.allocator().stats().allocations, 2);

        // the unused chunk at the back is moved to the front
        vec.push_back(0);
        vec.reserve(-3);
        assert_eq!(vec.capacity(), 8);
        assert_eq!(vec.allocator().stats().allocations, 2);

        for i in 1..4 {
            vec.push_front(i);
        }
        assert_eq!(vec, [3, 2, 1, 0]);
        assert_eq!(vec.allocator().stats().allocations, 2);

        vec.reserve(6);
        assert_eq!(vec.capacity(), 12);
        assert_eq!(vec.allocator().stats().allocations, 3);
        for i in 4..10 {
            vec.push_back(i);
        }
        assert_eq!(vec.allocator().stats().allocations, 3);

        assert_eq!(vec.try_reserve(isize::MIN), Err(Error::CapacityOverflow));
        assert_eq!(vec.capacity(), 12);
        assert_eq!(vec.len(), 10);
    }

    #[test]
    fn positions_survive_back_growth_with_headroom() {
        let mut vec = ChunkVec::<u32, 2>::new();
        vec.reserve_back(12);
        vec.extend(0..5);

        let positions: Vec<Position> = (0..5).map(|i| vec.position_of(i)).collect();
        let cursor = vec.begin().position();
        vec.push_back(5);
        vec.push_back(6);

        for (i, pos) in positions.iter().enumerate() {
            assert_eq!(vec.resolve(*pos), Some(&(i as u32)));
        }
        assert_eq!(vec.cursor_from(cursor).unwrap().get(), Some(&0));

        *vec.resolve_mut(positions[2]).unwrap() = 20;
        assert_eq!(vec[2], 20);
    }

    #[test]
    fn positions_go_stale_when_chunks_move() {
        let mut vec: ChunkVec<u32, 2> = (0..4).collect();
        let pos = vec.position_of(3);
        let end = vec.position_of(vec.len());
        assert_eq!(vec.offset_of(end), Some(4));
        assert_eq!(vec.resolve(end), None);

        vec.pop_front();
        assert_eq!(vec.offset_of(pos), Some(2));
        assert_eq!(vec.resolve(pos), Some(&3));

        vec.push_front(7);
        vec.push_front(8);
        assert_eq!(vec.resolve(pos), None);
        assert_eq!(vec.offset_of(pos), None);
        assert!(vec.cursor_from(pos).is_none());
        assert!(vec.resolve_mut(pos).is_none());
    }

    #[test]
    fn comparisons_and_hashing() {
        use core::hash::BuildHasherDefault;
        use core::hash::BuildHasher;
        use rustc_hash::FxHasher;

        let a: ChunkVec<u32, 2> = (0..10).collect();
        let mut b = ChunkVec::<u32, 4>::new();
        for i in (0..10).rev() {
            b.push_front(i);
        }
        assert_eq!(a, b);
        assert_eq!(a, (0..10).collect::<Vec<_>>());
        assert_eq!(a.partial_cmp(&b), Some(Ordering::Equal));

        let build = BuildHasherDefault::<FxHasher>::default();
        let hash_of = |v: &ChunkVec<u32, 2>| {
            let mut hasher = build.build_hasher();
            v.hash(&mut hasher);
            hasher.finish()
        };

        let mut c: ChunkVec<u32, 2> = (1..10).collect();
        c.push_front(0);
        assert_eq!(hash_of(&a), hash_of(&c));

        c.push_back(10);
        assert_ne!(a, c);
        assert!(a < c);
        assert_eq!(c.cmp(&a), Ordering::Greater);
        assert_ne!(hash_of(&a), hash_of(&c));
    }

    #[test]
    fn debug_lists_elements() {
        let vec = ChunkVec::<u8, 1>::from([1, 2, 3]);
        assert_eq!(std::format!("{:?}", vec), "[1, 2, 3]");
    }

    #[test]
    fn zero_sized_elements() {
        let mut vec = ChunkVec::<(), 3>::new();
        for _ in 0..20 {
            vec.push_back(());
            vec.push_front(());
        }
        assert_eq!(vec.len(), 40);
        assert_eq!(vec.iter().count(), 40);
        vec.drain(5..30);
        assert_eq!(vec.len(), 15);
    }

    #[test]
    fn random_operations_match_vec_deque() {
        for seed in 0..8 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let mut vec = ChunkVec::<u32, 2, Counting>::new();
            let mut model = VecDeque::new();

            for step in 0..3000u32 {
                match rng.gen_range(0..12) {
                    0 | 1 => {
                        vec.push_back(step);
                        model.push_back(step);
                    }
                    2 | 3 => {
                        vec.push_front(step);
                        model.push_front(step);
                    }
                    4 | 5 => assert_eq!(vec.pop_back(), model.pop_back()),
                    6 | 7 => assert_eq!(vec.pop_front(), model.pop_front()),
                    8 => {
                        let n = rng.gen_range(-20..20isize);
                        vec.reserve(n);
                    }
                    9 => {
                        let n = rng.gen_range(-20..20isize);
                        vec.resize(n, step);
                        let target = n.unsigned_abs();
                        if n < 0 {
                            while model.len() > target {
                                model.pop_front();
                            }
                            while model.len() < target {
                                model.push_front(step);
                            }
                        } else {
                            model.resize(target, step);
                        }
                    }
                    10 => {
                        let len = model.len();
                        let start = rng.gen_range(0..=len);
                        let end = rng.gen_range(start..=len);
                        assert!(vec.drain(start..end).eq(model.drain(start..end)));
                    }
                    _ => vec.shrink_to_fit(),
                }

                assert_eq!(vec.len(), model.len());
                assert!(vec.capacity() >= vec.len());
                if let Some(i) = (!model.is_empty()).then(|| rng.gen_range(0..model.len())) {
                    assert_eq!(vec.get(i), model.get(i));
                }
            }

            assert!(vec.iter().eq(model.iter()));
            assert!(vec.iter().rev().eq(model.iter().rev()));
            drop(model);

            let stats = vec.allocator().stats();
            assert_eq!(stats.live_blocks(), vec.chunk_count());
        }
    }
}

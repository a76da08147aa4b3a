//! Random-access cursors into a [`ChunkVec`](crate::ChunkVec).
//!
//! A [`Cursor`] is a logical index paired with a borrowed view of the chunk
//! table, so it can move by any signed distance in O(1) and be compared or
//! subtracted like an integer. Since it borrows the container, nothing can
//! invalidate it while it exists.
//!
//! A [`Position`] is the detached form of a cursor. It does not borrow
//! anything, so the container may be modified while it is held; the
//! container checks that its chunks have not been rearranged in the meantime
//! before resolving it again.

use core::cmp::Ordering;
use core::fmt::{self, Debug, Formatter};
use core::hash::{Hash, Hasher};
use core::ops::{Add, AddAssign, Range, Sub, SubAssign};
use core::ptr::NonNull;

use crate::raw::slot_in;

/// A random-access cursor borrowing a [`ChunkVec`](crate::ChunkVec).
///
/// Cursors are created by [`begin`](crate::ChunkVec::begin),
/// [`end`](crate::ChunkVec::end), [`cursor_at`](crate::ChunkVec::cursor_at)
/// and [`cursor_from`](crate::ChunkVec::cursor_from). A cursor may be moved
/// anywhere, including before the first element or past the last one; it
/// then simply yields no element.
///
/// Cursors into the same container compare by the index they point at.
///
/// # Examples
/// ```
/// use chunkvec::ChunkVec;
///
/// let vec: ChunkVec<char, 1> = "chunks".chars().collect();
/// let (begin, end) = (vec.begin(), vec.end());
/// assert_eq!(end - begin, 6);
///
/// let mut cursor = begin + 2;
/// assert_eq!(cursor.get(), Some(&'u'));
/// cursor -= 1;
/// cursor.move_prev();
/// assert_eq!(cursor, begin);
/// assert!(cursor < end);
/// assert_eq!((end - 1).get(), Some(&'s'));
/// assert_eq!(end.get(), None);
/// ```
pub struct Cursor<'a, T, const P: u32> {
    chunks: &'a [NonNull<T>],
    index: usize,
    start: usize,
    end: usize,
    epoch: usize,
}

unsafe impl<T: Sync, const P: u32> Send for Cursor<'_, T, P> {}
unsafe impl<T: Sync, const P: u32> Sync for Cursor<'_, T, P> {}

impl<'a, T, const P: u32> Cursor<'a, T, P> {
    #[inline]
    pub(crate) fn new(chunks: &'a [NonNull<T>], index: usize, bounds: Range<usize>, epoch: usize) -> Self {
        Cursor {
            chunks,
            index,
            start: bounds.start,
            end: bounds.end,
            epoch,
        }
    }

    /// Returns a reference to the element the cursor points at, or [`None`]
    /// if it points outside of the container.
    #[inline]
    pub fn get(&self) -> Option<&'a T> {
        self.at(0)
    }

    /// Returns a reference to the element `n` places away from the cursor,
    /// or [`None`] if there is no such element.
    #[inline]
    pub fn at(&self, n: isize) -> Option<&'a T> {
        let index = self.index.wrapping_add_signed(n);
        if self.start <= index && index < self.end {
            unsafe { Some(&*slot_in(self.chunks, index, P)) }
        } else {
            None
        }
    }

    /// Moves the cursor to the next element.
    #[inline]
    pub fn move_next(&mut self) {
        self.index = self.index.wrapping_add(1);
    }

    /// Moves the cursor to the previous element.
    #[inline]
    pub fn move_prev(&mut self) {
        self.index = self.index.wrapping_sub(1);
    }

    /// Returns the index of the element the cursor points at, counted from
    /// the front of the container.
    ///
    /// This is negative if the cursor was moved before the first element.
    #[inline]
    pub fn offset(&self) -> isize {
        self.index.wrapping_sub(self.start) as isize
    }

    /// Detaches the cursor from the container.
    #[inline]
    pub fn position(&self) -> Position {
        Position::new(self.index, self.epoch)
    }
}

impl<T, const P: u32> Clone for Cursor<'_, T, P> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, const P: u32> Copy for Cursor<'_, T, P> {}

impl<T, const P: u32> Debug for Cursor<'_, T, P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("offset", &self.offset())
            .field("len", &(self.end - self.start))
            .finish()
    }
}

impl<T, const P: u32> PartialEq for Cursor<'_, T, P> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T, const P: u32> Eq for Cursor<'_, T, P> {}

impl<T, const P: u32> PartialOrd for Cursor<'_, T, P> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T, const P: u32> Ord for Cursor<'_, T, P> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.offset().cmp(&other.offset())
    }
}

impl<T, const P: u32> Hash for Cursor<'_, T, P> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<T, const P: u32> AddAssign<isize> for Cursor<'_, T, P> {
    #[inline]
    fn add_assign(&mut self, rhs: isize) {
        self.index = self.index.wrapping_add_signed(rhs);
    }
}

impl<T, const P: u32> SubAssign<isize> for Cursor<'_, T, P> {
    #[inline]
    fn sub_assign(&mut self, rhs: isize) {
        self.index = self.index.wrapping_sub(rhs as usize);
    }
}

impl<'a, T, const P: u32> Add<isize> for Cursor<'a, T, P> {
    type Output = Cursor<'a, T, P>;

    #[inline]
    fn add(mut self, rhs: isize) -> Self::Output {
        self += rhs;
        self
    }
}

impl<'a, T, const P: u32> Add<Cursor<'a, T, P>> for isize {
    type Output = Cursor<'a, T, P>;

    #[inline]
    fn add(self, rhs: Cursor<'a, T, P>) -> Self::Output {
        rhs + self
    }
}

impl<'a, T, const P: u32> Sub<isize> for Cursor<'a, T, P> {
    type Output = Cursor<'a, T, P>;

    #[inline]
    fn sub(mut self, rhs: isize) -> Self::Output {
        self -= rhs;
        self
    }
}

impl<T, const P: u32> Sub for Cursor<'_, T, P> {
    type Output = isize;

    /// Returns the signed distance between two cursors.
    #[inline]
    fn sub(self, rhs: Self) -> isize {
        self.index.wrapping_sub(rhs.index) as isize
    }
}

/// A detached handle to a place in a [`ChunkVec`](crate::ChunkVec).
///
/// Positions support the same arithmetic and comparisons as a [`Cursor`].
/// They are resolved against the container they were taken from with
/// [`resolve`](crate::ChunkVec::resolve),
/// [`resolve_mut`](crate::ChunkVec::resolve_mut),
/// [`offset_of`](crate::ChunkVec::offset_of) and
/// [`cursor_from`](crate::ChunkVec::cursor_from), all of which reject a
/// position once chunks have been added to or removed from the front of the
/// container, or moved between its ends.
///
/// A position carries no information about which container it came from.
/// Resolving it against another one gives an unspecified (but memory-safe)
/// result.
#[derive(Clone, Copy, Debug)]
pub struct Position {
    pub(crate) index: usize,
    pub(crate) epoch: usize,
}

impl Position {
    #[inline]
    pub(crate) fn new(index: usize, epoch: usize) -> Self {
        Position { index, epoch }
    }
}

impl PartialEq for Position {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl Eq for Position {}

impl PartialOrd for Position {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        (self.index.wrapping_sub(other.index) as isize).cmp(&0)
    }
}

impl Hash for Position {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl AddAssign<isize> for Position {
    #[inline]
    fn add_assign(&mut self, rhs: isize) {
        self.index = self.index.wrapping_add_signed(rhs);
    }
}

impl SubAssign<isize> for Position {
    #[inline]
    fn sub_assign(&mut self, rhs: isize) {
        self.index = self.index.wrapping_sub(rhs as usize);
    }
}

impl Add<isize> for Position {
    type Output = Position;

    #[inline]
    fn add(mut self, rhs: isize) -> Position {
        self += rhs;
        self
    }
}

impl Add<Position> for isize {
    type Output = Position;

    #[inline]
    fn add(self, rhs: Position) -> Position {
        rhs + self
    }
}

impl Sub<isize> for Position {
    type Output = Position;

    #[inline]
    fn sub(mut self, rhs: isize) -> Position {
        self -= rhs;
        self
    }
}

impl Sub for Position {
    type Output = isize;

    #[inline]
    fn sub(self, rhs: Position) -> isize {
        self.index.wrapping_sub(rhs.index) as isize
    }
}

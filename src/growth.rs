//! Growth and reclamation of the chunk table.
//!
//! Growth at either end goes through [`RawChunks::grow`]. Before asking the
//! allocator for anything, it looks for chunks at the *opposite* end that hold
//! no live elements, and moves those over instead. Usage that oscillates
//! between the two ends therefore settles on a fixed set of chunks.

use core::alloc::Layout;
use core::ptr::NonNull;

use crate::allocator::{AllocError, ChunkAllocator};
use crate::error::Error;
use crate::raw::{End, RawChunks};

impl<T, const P: u32> RawChunks<T, P> {
    /// Makes sure that `additional` more elements can be placed at `end`
    /// without touching the allocator.
    ///
    /// On failure, `self` is left exactly as it was.
    pub(crate) fn grow<A: ChunkAllocator>(
        &mut self,
        end: End,
        additional: usize,
        alloc: &mut A,
    ) -> Result<(), Error> {
        let room = self.room(end);
        if room >= additional {
            return Ok(());
        }

        let needed = (additional - room)
            .checked_add(Self::MASK)
            .ok_or(Error::CapacityOverflow)?
            >> P;
        let donated = needed.min(self.free_chunks(end.opposite()));
        let fresh = needed - donated;

        // the bounds can only get larger when growing at the front
        let total_chunks = self
            .chunks
            .len()
            .checked_add(fresh)
            .ok_or(Error::CapacityOverflow)?;
        let shift = (donated + fresh)
            .checked_mul(Self::CHUNK)
            .ok_or(Error::CapacityOverflow)?;
        if total_chunks > (usize::MAX >> P)
            || (end == End::Front && self.end.checked_add(shift).is_none())
        {
            return Err(Error::CapacityOverflow);
        }

        if fresh > 0 {
            self.allocate_chunks(fresh, alloc)?;
        }

        match end {
            End::Back if donated > 0 => {
                tracing::trace!(chunks = donated, "moving free chunks from front to back");
                self.chunks.rotate_left(donated);
                self.start -= donated << P;
                self.end -= donated << P;
                self.bump_epoch();
            }
            End::Front => {
                if donated > 0 {
                    tracing::trace!(chunks = donated, "moving free chunks from back to front");
                }

                // all chunks at the tail of the table are free at this point
                let moved = donated + fresh;
                self.chunks.rotate_right(moved);
                self.start += shift;
                self.end += shift;
                self.bump_epoch();
            }
            End::Back => {}
        }

        debug_assert!(self.room(end) >= additional);
        Ok(())
    }

    /// Appends `count` newly allocated chunks to the table, all or nothing.
    fn allocate_chunks<A: ChunkAllocator>(
        &mut self,
        count: usize,
        alloc: &mut A,
    ) -> Result<(), Error> {
        let layout = Self::chunk_layout()?;
        let wanted = self.chunks.len() + count;
        self.chunks.try_reserve(count).map_err(|_| {
            match Layout::array::<NonNull<T>>(wanted) {
                Ok(table) => Error::alloc_failed(table, AllocError),
                Err(_) => Error::CapacityOverflow,
            }
        })?;

        if layout.size() > alloc.max_size() {
            tracing::debug!(bytes = layout.size(), "chunk exceeds allocator limit");
            return Err(Error::alloc_failed(layout, AllocError));
        }

        let old_len = self.chunks.len();
        for _ in 0..count {
            match alloc.allocate(layout) {
                Ok(ptr) => self.chunks.push(ptr.cast()),
                Err(e) => {
                    tracing::debug!(
                        bytes = layout.size(),
                        requested = count,
                        obtained = self.chunks.len() - old_len,
                        "chunk allocation failed, rolling back"
                    );
                    for chunk in self.chunks.drain(old_len..).rev() {
                        unsafe { alloc.deallocate(chunk.cast(), layout) };
                    }
                    return Err(Error::alloc_failed(layout, e));
                }
            }
        }

        tracing::debug!(chunks = count, bytes = layout.size() * count, "allocated chunks");
        Ok(())
    }

    /// Returns whole chunks without live elements to `alloc`.
    ///
    /// Chunks in front of the first element are only released when
    /// `shrink_front` is set, since releasing them shifts the absolute index
    /// of every element.
    pub(crate) fn shrink<A: ChunkAllocator>(&mut self, shrink_front: bool, alloc: &mut A) {
        if self.is_empty() {
            if !self.chunks.is_empty() {
                tracing::debug!(chunks = self.chunks.len(), "releasing all chunks");
            }
            unsafe { self.release_all(alloc) };
            return;
        }

        let layout = match Self::chunk_layout() {
            Ok(layout) => layout,
            Err(_) => return,
        };

        let front = if shrink_front { self.free_chunks(End::Front) } else { 0 };
        if front > 0 {
            tracing::debug!(chunks = front, "releasing free chunks at the front");
            for chunk in self.chunks.drain(..front) {
                unsafe { alloc.deallocate(chunk.cast(), layout) };
            }
            self.start -= front << P;
            self.end -= front << P;
            self.bump_epoch();
        }

        let back = self.free_chunks(End::Back);
        if back > 0 {
            tracing::debug!(chunks = back, "releasing free chunks at the back");
            let keep = self.chunks.len() - back;
            for chunk in self.chunks.drain(keep..).rev() {
                unsafe { alloc.deallocate(chunk.cast(), layout) };
            }
        }
    }
}

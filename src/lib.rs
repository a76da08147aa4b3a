#![no_std]
#![warn(missing_docs)]

//! A double-ended queue built from fixed-size chunks, with pluggable chunk
//! allocators.
//!
//! [`ChunkVec<T, P, A>`](ChunkVec) stores its elements in chunks of `2^P`
//! slots each, requested from an allocator of type `A`. It supports
//! amortized O(1) insertion and removal at both ends, O(1) indexing, and
//! random-access [cursors](cursor::Cursor). Chunks left empty at one end are
//! handed over to the other end instead of being released, so a queue whose
//! contents drift in one direction keeps reusing the same memory.
//!
//! # Examples
//! ```
//! use chunkvec::ChunkVec;
//!
//! let mut queue = ChunkVec::<u32, 3>::new();
//! for i in 0..1000 {
//!     queue.push_back(i);
//!     if queue.len() > 10 {
//!         queue.pop_front();
//!     }
//! }
//! assert!(queue.iter().copied().eq(990..1000));
//! assert!(queue.capacity() <= 3 * 8);
//! ```

extern crate alloc;
#[cfg(test)]
extern crate std;

pub mod allocator;
pub mod arena;
mod chunk_vec;
pub mod cursor;
mod error;
mod growth;
pub mod iter;
mod raw;

#[cfg(test)]
mod test_utils;

pub use crate::allocator::{AllocError, AllocStats, ChunkAllocator, Counting, Global};
pub use crate::arena::Arena;
pub use crate::chunk_vec::ChunkVec;
pub use crate::cursor::{Cursor, Position};
pub use crate::error::Error;

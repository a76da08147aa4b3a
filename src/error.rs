//! The error type shared by all fallible operations.

use crate::allocator::AllocError;

/// The reasons an operation on a [`ChunkVec`](crate::ChunkVec) can fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A checked access named an index at or past the end of the sequence.
    #[error("index {index} is out of range for a sequence of length {len}")]
    OutOfRange {
        /// The offending index.
        index: usize,
        /// The length of the sequence at the time of the access.
        len: usize,
    },
    /// The allocator could not provide memory for a chunk or for the
    /// chunk table.
    #[error("failed to allocate {size} bytes with alignment {align}")]
    AllocFailed {
        /// Size of the rejected request in bytes.
        size: usize,
        /// Alignment of the rejected request in bytes.
        align: usize,
        /// The failure signal reported by the allocator.
        #[source]
        source: AllocError,
    },
    /// The requested capacity exceeds what can be addressed.
    #[error("capacity overflow")]
    CapacityOverflow,
}

impl Error {
    pub(crate) fn alloc_failed(layout: core::alloc::Layout, source: AllocError) -> Self {
        Error::AllocFailed {
            size: layout.size(),
            align: layout.align(),
            source,
        }
    }
}

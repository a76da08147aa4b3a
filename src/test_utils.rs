use core::alloc::Layout;
use core::cell::Cell;
use core::ptr::NonNull;

use crate::allocator::{AllocError, ChunkAllocator, Global};

/// Counts how many [`Droppable`]s created from it have been dropped.
#[derive(Debug, Default)]
pub(crate) struct DropCounter {
    count: Cell<usize>,
}

impl DropCounter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn new_droppable<T>(&self, value: T) -> Droppable<'_, T> {
        Droppable {
            value,
            counter: self,
        }
    }

    pub(crate) fn dropped(&self) -> usize {
        self.count.get()
    }
}

#[derive(Debug)]
pub(crate) struct Droppable<'a, T = ()> {
    pub(crate) value: T,
    counter: &'a DropCounter,
}

impl<T: Clone> Clone for Droppable<'_, T> {
    fn clone(&self) -> Self {
        self.counter.new_droppable(self.value.clone())
    }
}

impl<T> Drop for Droppable<'_, T> {
    fn drop(&mut self) {
        let count = self.counter.count.get();
        self.counter.count.set(count + 1);
    }
}

/// Forwards to the global heap until a fixed number of allocations has been
/// served, then fails every further request.
#[derive(Clone, Debug)]
pub(crate) struct FailingAllocator {
    remaining: usize,
}

impl FailingAllocator {
    pub(crate) fn new(successes: usize) -> Self {
        FailingAllocator {
            remaining: successes,
        }
    }
}

unsafe impl ChunkAllocator for FailingAllocator {
    fn allocate(&mut self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        if self.remaining == 0 {
            return Err(AllocError);
        }

        self.remaining -= 1;
        Global.allocate(layout)
    }

    unsafe fn deallocate(&mut self, ptr: NonNull<u8>, layout: Layout) {
        Global.deallocate(ptr, layout)
    }
}

//! Counting allocator for tests.

use core::cell::Cell;
use core::ptr::NonNull;

use super::{AllocError, Allocator};

/// Forwards to `parent` and counts successful allocations and frees.
#[derive(Debug)]
pub struct TestAllocator<'p, P: ?Sized + Allocator = dyn Allocator> {
    parent: &'p P,
    allocations: Cell<usize>,
    frees: Cell<usize>,
}

impl<'p, P: ?Sized + Allocator> TestAllocator<'p, P> {
    /// Wrap `parent`.
    pub fn new(parent: &'p P) -> Self {
        Self {
            parent,
            allocations: Cell::new(0),
            frees: Cell::new(0),
        }
    }

    /// Number of successful allocations.
    pub fn allocations(&self) -> usize {
        self.allocations.get()
    }

    /// Number of frees.
    pub fn frees(&self) -> usize {
        self.frees.get()
    }
}

// SAFETY: allocation and free are forwarded to the parent unchanged.
unsafe impl<P: ?Sized + Allocator> Allocator for TestAllocator<'_, P> {
    fn allocate_aligned(
        &self,
        size: usize,
        alignment: usize,
        offset: usize,
    ) -> Result<NonNull<u8>, AllocError> {
        let ptr = self.parent.allocate_aligned(size, alignment, offset)?;
        self.allocations.set(self.allocations.get() + 1);
        Ok(ptr)
    }

    unsafe fn free_aligned(&self, ptr: NonNull<u8>, size: usize, alignment: usize) {
        self.frees.set(self.frees.get() + 1);
        // SAFETY: forwarded caller contract.
        unsafe { self.parent.free_aligned(ptr, size, alignment) }
    }

    fn name(&self) -> &str {
        "test"
    }
}

//! Linear (bump) allocator
//!
//! Reserves one block from a parent allocator and hands out sub-blocks by
//! bumping an atomic head. Individual frees are no-ops; the whole block goes
//! back to the parent when the allocator is dropped.
//!
//! # Safety Invariants
//!
//! 1. **No double free**: `free` is a no-op (bump allocators don't free)
//! 2. **Alignment guaranteed**: `(ptr + offset) % alignment == 0` for every block
//! 3. **No overlap**: Blocks handed out between two resets never overlap
//! 4. **In bounds**: Every block lies inside `[start, start + capacity)`
//! 5. **Thread safety**: The head only moves through compare-exchange
//!
//! # Verification
//!
//! This module includes Kani proofs for the above invariants. The loom
//! model tests in `loom_tests` cover concurrent allocation.

use core::fmt;
use core::ptr::NonNull;

use super::{AllocError, Allocator, DEFAULT_ALIGNMENT};
use crate::atomic::{AtomicUsize, Ordering};

/// Bump allocator over a block reserved from `parent`.
pub struct LinearAllocator<'p, P: ?Sized + Allocator = dyn Allocator> {
    parent: &'p P,
    /// Start of the reserved block
    start: NonNull<u8>,
    capacity: usize,
    /// Current allocation head (offset from `start`)
    head: AtomicUsize,
}

impl<'p, P: ?Sized + Allocator> LinearAllocator<'p, P> {
    /// Reserve `capacity` bytes from `parent`.
    pub fn new(parent: &'p P, capacity: usize) -> Result<Self, AllocError> {
        let start = parent.allocate_aligned(capacity, DEFAULT_ALIGNMENT, 0)?;
        Ok(Self {
            parent,
            start,
            capacity,
            head: AtomicUsize::new(0),
        })
    }

    /// Size of the reserved block.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get current allocation position (for debugging/verification)
    pub fn current_position(&self) -> usize {
        self.head.load(Ordering::Relaxed)
    }

    /// Get remaining capacity
    pub fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.head.load(Ordering::Relaxed))
    }

    /// The allocator the block was reserved from.
    pub fn parent(&self) -> &'p P {
        self.parent
    }

    /// Rewind the head so the whole block can be reused.
    ///
    /// Taking `&mut self` guarantees no block handed out earlier is still
    /// borrowed from this allocator.
    pub fn reset(&mut self) {
        self.head.store(0, Ordering::Relaxed);
    }

    /// Claim `size` bytes whose `offset`-th byte is `alignment`-aligned.
    ///
    /// Returns the offset of the block from `start`.
    fn claim(&self, size: usize, alignment: usize, offset: usize) -> Option<usize> {
        let start = self.start.as_ptr() as usize;
        let mask = alignment - 1;

        loop {
            let head = self.head.load(Ordering::Relaxed);

            let base = start.checked_add(head)?;
            let target = base.checked_add(offset)?.checked_add(mask)? & !mask;
            let aligned = target - offset;
            let new_head = (aligned - start).checked_add(size)?;

            if new_head > self.capacity {
                return None;
            }

            // Atomic compare-exchange to claim this allocation
            if self
                .head
                .compare_exchange_weak(head, new_head, Ordering::AcqRel, Ordering::Relaxed)
                .is_ok()
            {
                return Some(aligned - start);
            }
            // If CAS failed, another thread allocated - retry
        }
    }
}

// SAFETY: claim hands out disjoint ranges inside the reserved block (the head
// only moves forward until `reset`, which needs `&mut self`), each with
// `ptr + offset` aligned and ending at or before the capacity. The block
// itself stays valid until drop.
unsafe impl<P: ?Sized + Allocator> Allocator for LinearAllocator<'_, P> {
    fn allocate_aligned(
        &self,
        size: usize,
        alignment: usize,
        offset: usize,
    ) -> Result<NonNull<u8>, AllocError> {
        if size == 0 {
            return Err(AllocError::ZeroSized);
        }
        if !alignment.is_power_of_two() {
            return Err(AllocError::InvalidAlignment(alignment));
        }

        let block = self
            .claim(size, alignment, offset)
            .ok_or(AllocError::out_of_memory(size, alignment))?;

        // SAFETY: claim guarantees block + size <= capacity, so the pointer
        // stays inside the reserved block and is non-null.
        Ok(unsafe { NonNull::new_unchecked(self.start.as_ptr().add(block)) })
    }

    /// Deallocate memory.
    ///
    /// This is a no-op. Memory is reclaimed by `reset` or when the
    /// allocator is dropped.
    unsafe fn free_aligned(&self, _ptr: NonNull<u8>, _size: usize, _alignment: usize) {}

    fn name(&self) -> &str {
        "linear"
    }
}

impl<P: ?Sized + Allocator> Drop for LinearAllocator<'_, P> {
    fn drop(&mut self) {
        // SAFETY: the block was obtained in `new` with exactly these arguments
        // and is released only here.
        unsafe {
            self.parent
                .free_aligned(self.start, self.capacity, DEFAULT_ALIGNMENT)
        };
    }
}

impl<P: ?Sized + Allocator> fmt::Debug for LinearAllocator<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinearAllocator")
            .field("parent", &self.parent.name())
            .field("capacity", &self.capacity)
            .field("position", &self.current_position())
            .finish()
    }
}

// SAFETY: The head counter is only modified via atomic compare-exchange, so
// concurrent allocations never race. The block pointer is written once in
// `new` and the parent is only touched through `&P`, which requires `P: Sync`.
unsafe impl<P: ?Sized + Allocator + Sync> Sync for LinearAllocator<'_, P> {}

// SAFETY: Moving the allocator moves ownership of the reserved block; the
// parent is shared by reference, which requires `P: Sync`.
unsafe impl<P: ?Sized + Allocator + Sync> Send for LinearAllocator<'_, P> {}

// ============================================================================
// Kani Proofs for Allocator Invariants
// ============================================================================

#[cfg(kani)]
mod proofs {
    use super::*;
    use crate::allocator::SystemAllocator;

    /// Proof: No double free (trivially true since free is no-op)
    #[kani::proof]
    fn no_double_free() {
        let parent = SystemAllocator;
        let allocator = LinearAllocator::new(&parent, 1024).unwrap();

        let ptr = allocator.allocate_aligned(64, 8, 0);
        kani::assume(ptr.is_ok());
        let ptr = ptr.unwrap();
        let before = allocator.current_position();

        unsafe { allocator.free_aligned(ptr, 64, 8) };
        unsafe { allocator.free_aligned(ptr, 64, 8) };

        kani::assert(
            allocator.current_position() == before,
            "free must not move the head",
        );
    }

    /// Proof: Alignment (including offset) is always satisfied
    #[kani::proof]
    fn allocation_alignment() {
        let parent = SystemAllocator;
        let allocator = LinearAllocator::new(&parent, 4096).unwrap();

        let align: usize = kani::any();
        kani::assume(align == 1 || align == 2 || align == 4 || align == 8 || align == 16);

        let size: usize = kani::any();
        kani::assume(size > 0 && size <= 256);

        let offset: usize = kani::any();
        kani::assume(offset <= 64);

        if let Ok(ptr) = allocator.allocate_aligned(size, align, offset) {
            let addr = ptr.as_ptr() as usize;
            kani::assert(
                (addr + offset) % align == 0,
                "Allocation must be properly aligned",
            );
        }
    }

    /// Proof: Consecutive allocations don't overlap and stay in bounds
    #[kani::proof]
    fn no_overlap() {
        let parent = SystemAllocator;
        let allocator = LinearAllocator::new(&parent, 4096).unwrap();
        let start = allocator.start.as_ptr() as usize;

        let size1: usize = kani::any();
        let size2: usize = kani::any();
        kani::assume(size1 > 0 && size1 <= 128);
        kani::assume(size2 > 0 && size2 <= 128);

        let ptr1 = allocator.allocate_aligned(size1, 8, 0);
        let ptr2 = allocator.allocate_aligned(size2, 8, 0);

        if let (Ok(ptr1), Ok(ptr2)) = (ptr1, ptr2) {
            let addr1 = ptr1.as_ptr() as usize;
            let addr2 = ptr2.as_ptr() as usize;

            let region1_end = addr1 + size1;
            let region2_end = addr2 + size2;

            kani::assert(
                region1_end <= addr2 || region2_end <= addr1,
                "Consecutive allocations must not overlap",
            );
            kani::assert(
                addr1 >= start && region2_end <= start + 4096,
                "Allocations must stay inside the block",
            );
        }
    }

    /// Proof: Allocation fails gracefully when out of memory
    #[kani::proof]
    fn oom_returns_error() {
        let parent = SystemAllocator;
        let allocator = LinearAllocator::new(&parent, 256).unwrap();

        let result = allocator.allocate_aligned(512, 8, 0);

        kani::assert(
            result == Err(AllocError::out_of_memory(512, 8)),
            "OOM must return an error, not UB",
        );
        kani::assert(
            allocator.current_position() == 0,
            "Head must not change on failed allocation",
        );
    }

    /// Proof: Head only moves forward (monotonic)
    #[kani::proof]
    fn head_monotonic() {
        let parent = SystemAllocator;
        let allocator = LinearAllocator::new(&parent, 4096).unwrap();

        let initial_head = allocator.current_position();

        let size: usize = kani::any();
        kani::assume(size > 0 && size <= 256);

        let result = allocator.allocate_aligned(size, 8, 0);
        let new_head = allocator.current_position();

        if result.is_ok() {
            kani::assert(
                new_head > initial_head,
                "Head must increase after allocation",
            );
        } else {
            kani::assert(
                new_head == initial_head,
                "Head must not change on failed allocation",
            );
        }
    }
}

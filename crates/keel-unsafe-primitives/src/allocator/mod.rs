//! Allocator contract and implementations
//!
//! Every allocation in keel goes through the object-safe [`Allocator`]
//! trait, usually as `&dyn Allocator`. Failure is explicit: a request that
//! cannot be satisfied returns an [`AllocError`] instead of a null pointer.
//!
//! # Safety Invariants
//!
//! 1. **Alignment guaranteed**: A block returned by `allocate_aligned(size, alignment, offset)`
//!    satisfies `(ptr + offset) % alignment == 0`
//! 2. **No overlap**: Live blocks handed out by one allocator never overlap
//! 3. **Matching free**: `free`/`free_aligned` must receive the pointer, size and
//!    alignment the block was allocated with, on the allocator that produced it
//!
//! # Implementations
//!
//! - [`SystemAllocator`] - the global heap
//! - [`LinearAllocator`] - bump allocation inside one block reserved from a parent
//! - [`DebugAllocator`] - statistics and leak reporting on top of a parent
//! - [`TestAllocator`] - allocation and free counters on top of a parent

mod debug;
mod error;
mod linear;
mod system;
mod testing;

use core::alloc::Layout;
use core::ptr::NonNull;

pub use debug::{clear_leaked, leaked_blocks, leaked_bytes, AllocatorStats, DebugAllocator};
pub use error::AllocError;
pub use linear::LinearAllocator;
pub use system::SystemAllocator;
pub use testing::TestAllocator;

/// Alignment used by [`Allocator::allocate`] and [`Allocator::free`].
///
/// Matches the largest scalar alignment on the supported targets.
pub const DEFAULT_ALIGNMENT: usize = 16;

/// Source of raw memory blocks.
///
/// [`Allocated`](crate::Allocated) writes values through the returned
/// pointers, so safe code relies on every implementation keeping its word.
///
/// # Safety
///
/// Implementors must guarantee that a successful `allocate_aligned(size,
/// alignment, offset)` returns a pointer that:
///
/// 1. **Valid**: is valid for reads and writes of `size` bytes until it is
///    freed or the allocator is dropped
/// 2. **Aligned**: satisfies `(ptr + offset) % alignment == 0`
/// 3. **Disjoint**: does not overlap any other live block from this allocator
///
/// and that `free_aligned` accepts every block it handed out, with the
/// arguments it was allocated with.
///
/// An implementation cannot be written without `unsafe`:
///
/// ```compile_fail
/// use core::ptr::NonNull;
/// use keel_unsafe_primitives::{AllocError, Allocator};
///
/// struct Dangling;
///
/// impl Allocator for Dangling {
///     fn allocate_aligned(&self, _: usize, _: usize, _: usize) -> Result<NonNull<u8>, AllocError> {
///         Ok(NonNull::dangling())
///     }
///
///     unsafe fn free_aligned(&self, _: NonNull<u8>, _: usize, _: usize) {}
///
///     fn name(&self) -> &str {
///         "dangling"
///     }
/// }
/// ```
pub unsafe trait Allocator {
    /// Allocate `size` bytes with [`DEFAULT_ALIGNMENT`].
    fn allocate(&self, size: usize) -> Result<NonNull<u8>, AllocError> {
        self.allocate_aligned(size, DEFAULT_ALIGNMENT, 0)
    }

    /// Allocate `size` bytes such that `ptr + offset` is a multiple of `alignment`.
    fn allocate_aligned(
        &self,
        size: usize,
        alignment: usize,
        offset: usize,
    ) -> Result<NonNull<u8>, AllocError>;

    /// Return a block obtained from [`Allocator::allocate`].
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by `allocate(size)` on this allocator
    /// and must not have been freed already.
    unsafe fn free(&self, ptr: NonNull<u8>, size: usize) {
        // SAFETY: forwarded caller contract; `allocate` uses DEFAULT_ALIGNMENT.
        unsafe { self.free_aligned(ptr, size, DEFAULT_ALIGNMENT) }
    }

    /// Return a block obtained from [`Allocator::allocate_aligned`].
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by `allocate_aligned(size, alignment, _)`
    /// on this allocator and must not have been freed already.
    unsafe fn free_aligned(&self, ptr: NonNull<u8>, size: usize, alignment: usize);

    /// Whether memory from `self` may be freed through `other`.
    ///
    /// Defaults to identity.
    fn is_equal(&self, other: &dyn Allocator) -> bool {
        core::ptr::eq(
            (self as *const Self).cast::<u8>(),
            (other as *const dyn Allocator).cast::<u8>(),
        )
    }

    /// Diagnostic name.
    fn name(&self) -> &str;
}

/// Validate a request and build its layout.
pub(crate) fn layout_for(size: usize, alignment: usize) -> Result<Layout, AllocError> {
    if size == 0 {
        return Err(AllocError::ZeroSized);
    }
    if !alignment.is_power_of_two() {
        return Err(AllocError::InvalidAlignment(alignment));
    }
    Layout::from_size_align(size, alignment).map_err(|_| AllocError::out_of_memory(size, alignment))
}

#[cfg(all(test, not(feature = "loom")))]
mod tests {
    use super::*;

    #[test]
    fn test_layout_for_rejects_zero_size() {
        assert_eq!(layout_for(0, 8), Err(AllocError::ZeroSized));
    }

    #[test]
    fn test_layout_for_rejects_bad_alignment() {
        assert_eq!(layout_for(8, 0), Err(AllocError::InvalidAlignment(0)));
        assert_eq!(layout_for(8, 12), Err(AllocError::InvalidAlignment(12)));
    }

    #[test]
    fn test_layout_for_overflow_is_out_of_memory() {
        let err = layout_for(usize::MAX, 16).unwrap_err();
        assert!(err.is_out_of_memory());
    }

    #[test]
    fn test_is_equal_is_identity() {
        let a = SystemAllocator;
        let b = TestAllocator::new(&a);
        let c = TestAllocator::new(&a);

        assert!(b.is_equal(&b));
        assert!(!b.is_equal(&c));
    }

    #[test]
    fn test_error_display() {
        let err = AllocError::out_of_memory(64, 8);
        assert_eq!(
            err.to_string(),
            "out of memory allocating 64 bytes (alignment 8)"
        );
    }
}

//! The global heap as an [`Allocator`].

use core::ptr::NonNull;

use super::{layout_for, AllocError, Allocator};

/// Allocator backed by the global heap (`alloc::alloc`).
///
/// Stateless, so a single `static` instance can serve every thread.
/// Only offsets that are multiples of the alignment are supported.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemAllocator;

impl SystemAllocator {
    /// Create a system allocator.
    pub const fn new() -> Self {
        Self
    }
}

// SAFETY: blocks come straight from the global heap for a validated layout,
// so they are aligned, disjoint while live, and freed with the same layout.
// Offsets that are not multiples of the alignment are rejected, which keeps
// `ptr + offset` aligned.
unsafe impl Allocator for SystemAllocator {
    fn allocate_aligned(
        &self,
        size: usize,
        alignment: usize,
        offset: usize,
    ) -> Result<NonNull<u8>, AllocError> {
        let layout = layout_for(size, alignment)?;
        if offset % alignment != 0 {
            return Err(AllocError::UnsupportedOffset { offset, alignment });
        }

        // SAFETY: layout_for rejects zero-sized layouts.
        let ptr = unsafe { alloc::alloc::alloc(layout) };
        NonNull::new(ptr).ok_or(AllocError::out_of_memory(size, alignment))
    }

    unsafe fn free_aligned(&self, ptr: NonNull<u8>, size: usize, alignment: usize) {
        match layout_for(size, alignment) {
            // SAFETY: caller guarantees the block came from allocate_aligned
            // with this size and alignment, which produced this same layout.
            Ok(layout) => unsafe { alloc::alloc::dealloc(ptr.as_ptr(), layout) },
            Err(err) => debug_assert!(false, "free with invalid layout: {err}"),
        }
    }

    fn name(&self) -> &str {
        "system"
    }
}

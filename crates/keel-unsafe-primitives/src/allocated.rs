//! A single value owned through an [`Allocator`].
//!
//! # Safety Invariants
//!
//! 1. **Initialized**: `ptr` always points at a live, initialized `T`
//! 2. **Matching free**: The block is freed on the allocator that produced
//!    it, with the size and alignment of `T`
//! 3. **Zero-sized types**: A zero-sized `T` never touches the allocator

use core::fmt;
use core::mem::{self, ManuallyDrop};
use core::ops::{Deref, DerefMut};
use core::ptr::{self, NonNull};

use crate::allocator::{AllocError, Allocator};

/// Owning pointer to a `T` stored in memory from `allocator`.
pub struct Allocated<'a, T> {
    ptr: NonNull<T>,
    allocator: &'a dyn Allocator,
}

impl<'a, T> Allocated<'a, T> {
    /// Move `value` into a block obtained from `allocator`.
    ///
    /// On failure `value` is dropped and the error returned.
    pub fn new_in(allocator: &'a dyn Allocator, value: T) -> Result<Self, AllocError> {
        let ptr = if mem::size_of::<T>() == 0 {
            NonNull::dangling()
        } else {
            allocator
                .allocate_aligned(mem::size_of::<T>(), mem::align_of::<T>(), 0)?
                .cast::<T>()
        };

        // SAFETY: ptr is either dangling for a ZST (valid for zero-sized
        // writes) or a fresh block sized and aligned for T.
        unsafe { ptr.as_ptr().write(value) };

        Ok(Self { ptr, allocator })
    }

    /// The allocator that owns the block.
    pub fn allocator(&self) -> &'a dyn Allocator {
        self.allocator
    }

    /// Move the value out and free the block.
    pub fn into_inner(self) -> T {
        let this = ManuallyDrop::new(self);
        // SAFETY: ptr holds an initialized T; ManuallyDrop prevents a
        // second read or drop of it.
        let value = unsafe { ptr::read(this.ptr.as_ptr()) };
        // SAFETY: the block is released exactly once, here.
        unsafe { this.release() };
        value
    }

    /// Return the block to the allocator without touching its contents.
    ///
    /// # Safety
    ///
    /// Must be called at most once, after the value has been dropped or moved out.
    unsafe fn release(&self) {
        if mem::size_of::<T>() != 0 {
            // SAFETY: allocated in new_in with this size and alignment.
            unsafe {
                self.allocator.free_aligned(
                    self.ptr.cast::<u8>(),
                    mem::size_of::<T>(),
                    mem::align_of::<T>(),
                )
            };
        }
    }
}

impl<T> Deref for Allocated<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: ptr holds an initialized T for the lifetime of self.
        unsafe { self.ptr.as_ref() }
    }
}

impl<T> DerefMut for Allocated<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: ptr holds an initialized T and &mut self is unique.
        unsafe { self.ptr.as_mut() }
    }
}

impl<T> Drop for Allocated<'_, T> {
    fn drop(&mut self) {
        // SAFETY: the value is dropped once here, then its block released once.
        unsafe {
            ptr::drop_in_place(self.ptr.as_ptr());
            self.release();
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Allocated<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Allocated")
            .field("value", &**self)
            .field("allocator", &self.allocator.name())
            .finish()
    }
}

//! Default Allocator Registry for keel
//!
//! Holds the process-wide default [`Allocator`] used when no allocator is
//! passed explicitly. Until replaced, the default is the global heap
//! ([`SystemAllocator`]).
//!
//! # Usage
//!
//! ```
//! let value = keel_allocator::allocate(41u32)?;
//! assert_eq!(*value + 1, 42);
//! # Ok::<(), keel_allocator::AllocError>(())
//! ```
//!
//! # Thread Safety
//!
//! The registry is guarded by a `RwLock`; readers never block each other.
//! Only allocators that are `Sync` can be installed, since every thread may
//! allocate through the default at the same time.

#![deny(unsafe_code)]

use std::sync::{PoisonError, RwLock};

pub use keel_unsafe_primitives::{AllocError, Allocated, Allocator, SystemAllocator};

/// An allocator that can be installed as the process-wide default.
pub type SharedAllocator = dyn Allocator + Sync;

static SYSTEM: SystemAllocator = SystemAllocator::new();

/// `None` means the system allocator.
static DEFAULT: RwLock<Option<&'static SharedAllocator>> = RwLock::new(None);

/// The current default allocator.
pub fn default_allocator() -> &'static SharedAllocator {
    let current = *DEFAULT.read().unwrap_or_else(PoisonError::into_inner);
    current.unwrap_or(&SYSTEM)
}

/// Install `allocator` as the default and return the previous one.
pub fn set_default_allocator(allocator: &'static SharedAllocator) -> &'static SharedAllocator {
    let mut slot = DEFAULT.write().unwrap_or_else(PoisonError::into_inner);
    let previous = slot.replace(allocator).unwrap_or(&SYSTEM);
    drop(slot);

    tracing::debug!(
        previous = previous.name(),
        current = allocator.name(),
        "default allocator changed"
    );
    previous
}

/// Restore the system allocator as the default.
pub fn reset_default_allocator() -> &'static SharedAllocator {
    set_default_allocator(&SYSTEM)
}

/// Move `value` into memory from the default allocator.
pub fn allocate<T>(value: T) -> Result<Allocated<'static, T>, AllocError> {
    Allocated::new_in(default_allocator(), value)
}

/// Run `f` with `allocator` installed as the default.
///
/// The previous default is restored when `f` returns or unwinds.
pub fn with_default_allocator<R>(
    allocator: &'static SharedAllocator,
    f: impl FnOnce() -> R,
) -> R {
    struct Restore(&'static SharedAllocator);

    impl Drop for Restore {
        fn drop(&mut self) {
            set_default_allocator(self.0);
        }
    }

    let _restore = Restore(set_default_allocator(allocator));
    f()
}

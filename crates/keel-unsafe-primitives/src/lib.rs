//! keel Unsafe Primitives - Consolidated Unsafe Code TCB
//!
//! This crate contains ALL unsafe code in keel, consolidated into a single
//! auditable location. All other crates use `#![deny(unsafe_code)]`.
//!
//! # Design Principles
//!
//! 1. **Minimal unsafe surface**: Only raw memory and shared ownership live here
//! 2. **Safe wrappers**: `Allocated<T>` and `RefPtr<T>` are safe to use
//! 3. **Auditable**: Small, focused modules for security review
//! 4. **Verified**: Kani proofs and loom models where applicable
//!
//! # Module Organization
//!
//! - `allocator` - Allocator contract plus system, linear, debug and test allocators
//! - `allocated` - A single value owned through an `Allocator`
//! - `refcount` - Atomic reference count, `Counted<T>` and the intrusive `RefPtr<T>`
//! - `loom_tests` - Concurrency tests using loom (with `loom` feature)
//!
//! # Verification
//!
//! 1. **Kani proofs** (`cargo kani`): Linear allocator alignment and overlap invariants
//! 2. **Loom tests** (`cargo test --features loom`): Reference count and bump head races
//! 3. **Unit tests**: Traditional testing for basic functionality

#![cfg_attr(not(any(feature = "std", test)), no_std)]

extern crate alloc;

mod atomic;

pub mod allocated;
pub mod allocator;
pub mod refcount;

#[cfg(any(test, feature = "loom"))]
mod loom_tests;

// Re-export commonly used items
pub use allocated::Allocated;
pub use allocator::{
    AllocError, Allocator, AllocatorStats, DebugAllocator, LinearAllocator, SystemAllocator,
    TestAllocator, DEFAULT_ALIGNMENT,
};
pub use refcount::{AtomicRefCount, Counted, RefCounted, RefPtr};

//! Atomics shared by the primitives.
//!
//! Under the `loom` feature these are loom's model-checked atomics, so the
//! reference count and the linear allocator head are explored by
//! `loom::model` exactly as they are compiled for production.

#[cfg(feature = "loom")]
pub(crate) use loom::sync::atomic::{fence, AtomicUsize, Ordering};

#[cfg(not(feature = "loom"))]
pub(crate) use core::sync::atomic::{fence, AtomicUsize, Ordering};

//! Error types for allocation requests.

use thiserror::Error;

/// Errors returned by [`Allocator`](super::Allocator) implementations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum AllocError {
    /// The allocator could not satisfy the request
    #[error("out of memory allocating {size} bytes (alignment {alignment})")]
    OutOfMemory {
        /// Requested size in bytes
        size: usize,
        /// Requested alignment
        alignment: usize,
    },

    /// Alignment was zero or not a power of two
    #[error("invalid alignment {0}: must be a non-zero power of two")]
    InvalidAlignment(usize),

    /// The allocator cannot honour an alignment offset
    #[error("unsupported alignment offset {offset} for alignment {alignment}")]
    UnsupportedOffset {
        /// Requested offset
        offset: usize,
        /// Requested alignment
        alignment: usize,
    },

    /// Zero-sized blocks are never handed out
    #[error("zero-sized allocation")]
    ZeroSized,
}

impl AllocError {
    /// Create an out of memory error.
    pub fn out_of_memory(size: usize, alignment: usize) -> Self {
        Self::OutOfMemory { size, alignment }
    }

    /// Check if this is an out of memory error.
    pub fn is_out_of_memory(&self) -> bool {
        matches!(self, Self::OutOfMemory { .. })
    }
}

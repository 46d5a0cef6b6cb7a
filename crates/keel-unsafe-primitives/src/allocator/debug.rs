//! Debug allocator: statistics and leak reporting.
//!
//! Forwards every request to a parent and records each live block. Frees of
//! unknown blocks, or with the wrong size, are reported and ignored instead
//! of reaching the parent. Blocks still live when the allocator is dropped
//! are reported as leaks and added to process-wide counters.

use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;
use core::ptr::NonNull;
use core::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;

use super::{AllocError, Allocator};

static LEAKED_BYTES: AtomicUsize = AtomicUsize::new(0);
static LEAKED_BLOCKS: AtomicUsize = AtomicUsize::new(0);

/// Bytes leaked by every dropped [`DebugAllocator`] since the last [`clear_leaked`].
pub fn leaked_bytes() -> usize {
    LEAKED_BYTES.load(Ordering::Relaxed)
}

/// Blocks leaked by every dropped [`DebugAllocator`] since the last [`clear_leaked`].
pub fn leaked_blocks() -> usize {
    LEAKED_BLOCKS.load(Ordering::Relaxed)
}

/// Reset the process-wide leak counters.
pub fn clear_leaked() {
    LEAKED_BYTES.store(0, Ordering::Relaxed);
    LEAKED_BLOCKS.store(0, Ordering::Relaxed);
}

/// Snapshot of a [`DebugAllocator`]'s counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AllocatorStats {
    /// Total bytes ever allocated
    pub bytes_allocated: usize,
    /// Total bytes ever freed
    pub bytes_freed: usize,
    /// Bytes currently live
    pub bytes_outstanding: usize,
    /// High-water mark of `bytes_outstanding`
    pub max_allocated: usize,
    /// Blocks currently live
    pub blocks_outstanding: usize,
}

#[derive(Clone, Copy, Debug)]
struct Block {
    addr: usize,
    size: usize,
    alignment: usize,
}

/// Allocator that tracks every block it forwards to `parent`.
///
/// Not thread-safe: counters live in `Cell`s.
pub struct DebugAllocator<'p, P: ?Sized + Allocator = dyn Allocator> {
    parent: &'p P,
    blocks: RefCell<Vec<Block>>,
    bytes_allocated: Cell<usize>,
    bytes_freed: Cell<usize>,
    max_allocated: Cell<usize>,
}

impl<'p, P: ?Sized + Allocator> DebugAllocator<'p, P> {
    /// Wrap `parent`.
    pub fn new(parent: &'p P) -> Self {
        Self {
            parent,
            blocks: RefCell::new(Vec::new()),
            bytes_allocated: Cell::new(0),
            bytes_freed: Cell::new(0),
            max_allocated: Cell::new(0),
        }
    }

    /// Total bytes ever allocated.
    pub fn bytes_allocated(&self) -> usize {
        self.bytes_allocated.get()
    }

    /// Total bytes ever freed.
    pub fn bytes_freed(&self) -> usize {
        self.bytes_freed.get()
    }

    /// Bytes currently live.
    pub fn bytes_outstanding(&self) -> usize {
        self.bytes_allocated.get() - self.bytes_freed.get()
    }

    /// Highest value `bytes_outstanding` has reached.
    pub fn max_allocated(&self) -> usize {
        self.max_allocated.get()
    }

    /// Blocks currently live.
    pub fn blocks_outstanding(&self) -> usize {
        self.blocks.borrow().len()
    }

    /// Snapshot all counters.
    pub fn stats(&self) -> AllocatorStats {
        AllocatorStats {
            bytes_allocated: self.bytes_allocated(),
            bytes_freed: self.bytes_freed(),
            bytes_outstanding: self.bytes_outstanding(),
            max_allocated: self.max_allocated(),
            blocks_outstanding: self.blocks_outstanding(),
        }
    }
}

// SAFETY: every block is the parent's block unchanged, so the parent's
// guarantees carry over. Frees only reach the parent for recorded blocks with
// their recorded size and alignment.
unsafe impl<P: ?Sized + Allocator> Allocator for DebugAllocator<'_, P> {
    fn allocate_aligned(
        &self,
        size: usize,
        alignment: usize,
        offset: usize,
    ) -> Result<NonNull<u8>, AllocError> {
        let ptr = self.parent.allocate_aligned(size, alignment, offset)?;

        self.blocks.borrow_mut().push(Block {
            addr: ptr.as_ptr() as usize,
            size,
            alignment,
        });
        self.bytes_allocated.set(self.bytes_allocated.get() + size);
        let outstanding = self.bytes_outstanding();
        if outstanding > self.max_allocated.get() {
            self.max_allocated.set(outstanding);
        }

        Ok(ptr)
    }

    /// Free a tracked block.
    ///
    /// The block is returned to the parent with the alignment it was
    /// allocated with, so `free` and `free_aligned` are interchangeable here.
    unsafe fn free_aligned(&self, ptr: NonNull<u8>, size: usize, _alignment: usize) {
        let addr = ptr.as_ptr() as usize;
        let block = {
            let mut blocks = self.blocks.borrow_mut();
            let Some(index) = blocks.iter().position(|b| b.addr == addr) else {
                tracing::error!(
                    allocator = self.parent.name(),
                    addr,
                    size,
                    "free of unknown block ignored"
                );
                return;
            };
            if blocks[index].size != size {
                tracing::error!(
                    allocator = self.parent.name(),
                    addr,
                    size,
                    expected = blocks[index].size,
                    "free with mismatched size ignored"
                );
                return;
            }
            blocks.swap_remove(index)
        };

        self.bytes_freed.set(self.bytes_freed.get() + block.size);

        // SAFETY: the block was produced by parent.allocate_aligned with this
        // size and alignment and has just been removed from the live set.
        unsafe { self.parent.free_aligned(ptr, block.size, block.alignment) };
    }

    fn name(&self) -> &str {
        "debug"
    }
}

impl<P: ?Sized + Allocator> Drop for DebugAllocator<'_, P> {
    fn drop(&mut self) {
        let blocks = self.blocks.get_mut();
        if blocks.is_empty() {
            return;
        }

        let bytes: usize = blocks.iter().map(|b| b.size).sum();
        tracing::warn!(
            allocator = self.parent.name(),
            leaked_bytes = bytes,
            leaked_blocks = blocks.len(),
            "allocator dropped with outstanding blocks"
        );
        LEAKED_BYTES.fetch_add(bytes, Ordering::Relaxed);
        LEAKED_BLOCKS.fetch_add(blocks.len(), Ordering::Relaxed);
    }
}

impl<P: ?Sized + Allocator> fmt::Debug for DebugAllocator<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugAllocator")
            .field("parent", &self.parent.name())
            .field("stats", &self.stats())
            .finish()
    }
}

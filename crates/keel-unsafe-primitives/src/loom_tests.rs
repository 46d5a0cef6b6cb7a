//! Loom tests for concurrent data structures
//!
//! Loom is a concurrency testing tool that explores all possible interleavings
//! of concurrent operations. It helps find race conditions and other
//! concurrency bugs.
//!
//! With the `loom` feature enabled, `AtomicRefCount` and the
//! `LinearAllocator` head are built on loom's atomics (see `atomic.rs`), so
//! these tests model the production code rather than a copy of it.
//!
//! # Running Loom Tests
//!
//! ```bash
//! cargo test --package keel-unsafe-primitives --features loom -- --test-threads=1 loom
//! ```
//!
//! Note: Loom tests must run single-threaded and can take a while to explore
//! all interleavings.

#[cfg(all(test, feature = "loom"))]
mod tests {
    use crate::allocator::{Allocator, LinearAllocator, SystemAllocator};
    use crate::refcount::{AtomicRefCount, RefCounted, RefPtr};
    use loom::sync::atomic::{AtomicUsize, Ordering};
    use loom::sync::Arc;
    use loom::thread;

    static PARENT: SystemAllocator = SystemAllocator::new();

    fn addr(ptr: core::ptr::NonNull<u8>) -> usize {
        ptr.as_ptr() as usize
    }

    /// Shared object that records its own destruction.
    struct Shared {
        ref_count: AtomicRefCount,
        payload: AtomicUsize,
        destroyed: Arc<AtomicUsize>,
    }

    // SAFETY: the count is a private field of Shared.
    unsafe impl RefCounted for Shared {
        fn ref_count(&self) -> &AtomicRefCount {
            &self.ref_count
        }
    }

    impl Drop for Shared {
        fn drop(&mut self) {
            self.destroyed.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn shared(destroyed: &Arc<AtomicUsize>) -> RefPtr<Shared> {
        RefPtr::new(Shared {
            ref_count: AtomicRefCount::new(),
            payload: AtomicUsize::new(0),
            destroyed: destroyed.clone(),
        })
    }

    /// Test: Concurrent clone/drop destroys the object exactly once
    #[test]
    fn loom_refptr_destroyed_exactly_once() {
        loom::model(|| {
            let destroyed = Arc::new(AtomicUsize::new(0));
            let ptr = shared(&destroyed);

            let p1 = ptr.clone();
            let p2 = ptr.clone();
            drop(ptr);

            let t1 = thread::spawn(move || {
                let extra = p1.clone();
                drop(p1);
                drop(extra);
            });
            let t2 = thread::spawn(move || drop(p2));

            t1.join().unwrap();
            t2.join().unwrap();

            assert_eq!(destroyed.load(Ordering::SeqCst), 1);
        });
    }

    /// Test: Writes through one reference are visible to whoever destroys
    ///
    /// The Release decrement and Acquire fence order a thread's last use of
    /// the object before the destruction on another thread.
    #[test]
    fn loom_release_orders_last_use_before_destruction() {
        loom::model(|| {
            let destroyed = Arc::new(AtomicUsize::new(0));
            let ptr = shared(&destroyed);
            let other = ptr.clone();

            let t = thread::spawn(move || {
                other.payload.store(7, Ordering::Relaxed);
                drop(other);
            });

            if ptr.has_one_ref() {
                assert_eq!(ptr.payload.load(Ordering::Relaxed), 7);
            }
            drop(ptr);
            t.join().unwrap();

            assert_eq!(destroyed.load(Ordering::SeqCst), 1);
        });
    }

    /// Test: The surviving owner sees itself as the only reference
    #[test]
    fn loom_has_one_ref_consistent() {
        loom::model(|| {
            let destroyed = Arc::new(AtomicUsize::new(0));
            let ptr = shared(&destroyed);
            let other = ptr.clone();

            let t = thread::spawn(move || drop(other));

            t.join().unwrap();
            assert!(ptr.has_one_ref());
            assert_eq!(destroyed.load(Ordering::SeqCst), 0, "destroyed while owned");
        });
    }

    /// Test: Two threads bumping the same head get disjoint blocks
    #[test]
    fn loom_concurrent_alloc_no_overlap() {
        loom::model(|| {
            let allocator = Arc::new(LinearAllocator::new(&PARENT, 1024).unwrap());

            let a1 = allocator.clone();
            let a2 = allocator.clone();

            let t1 = thread::spawn(move || a1.allocate_aligned(64, 8, 0).ok().map(addr));
            let t2 = thread::spawn(move || a2.allocate_aligned(64, 8, 0).ok().map(addr));

            let r1 = t1.join().unwrap();
            let r2 = t2.join().unwrap();

            // Both should succeed (we have 1024 bytes)
            assert!(r1.is_some() && r2.is_some());

            if let (Some(addr1), Some(addr2)) = (r1, r2) {
                let end1 = addr1 + 64;
                let end2 = addr2 + 64;
                assert!(end1 <= addr2 || end2 <= addr1, "blocks overlap");
            }
        });
    }

    /// Test: Racing aligned claims each honour their own alignment
    #[test]
    fn loom_alignment_always_correct() {
        loom::model(|| {
            let allocator = Arc::new(LinearAllocator::new(&PARENT, 1024).unwrap());

            let a1 = allocator.clone();
            let a2 = allocator.clone();

            // Awkward sizes with a 16-byte and a 32-byte alignment
            let t1 = thread::spawn(move || a1.allocate_aligned(17, 16, 0).ok().map(addr));
            let t2 = thread::spawn(move || a2.allocate_aligned(33, 32, 0).ok().map(addr));

            if let Some(addr) = t1.join().unwrap() {
                assert_eq!(addr % 16, 0, "claim misaligned for 16");
            }
            if let Some(addr) = t2.join().unwrap() {
                assert_eq!(addr % 32, 0, "claim misaligned for 32");
            }
        });
    }

    /// Test: Racing for the last bytes, exactly the ones that fit succeed
    /// and the head never passes the capacity
    #[test]
    fn loom_oom_under_contention() {
        loom::model(|| {
            let allocator = Arc::new(LinearAllocator::new(&PARENT, 128).unwrap());

            let a1 = allocator.clone();
            let a2 = allocator.clone();
            let a3 = allocator.clone();

            // Each tries to allocate 64 bytes (only 2 can succeed)
            let t1 = thread::spawn(move || a1.allocate_aligned(64, 8, 0).ok().map(addr));
            let t2 = thread::spawn(move || a2.allocate_aligned(64, 8, 0).ok().map(addr));
            let t3 = thread::spawn(move || a3.allocate_aligned(64, 8, 0).ok().map(addr));

            let results = [
                t1.join().unwrap(),
                t2.join().unwrap(),
                t3.join().unwrap(),
            ];

            let successes: Vec<usize> = results.iter().flatten().copied().collect();

            assert_eq!(successes.len(), 2, "exactly two 64-byte blocks fit");
            assert_eq!(allocator.remaining(), 0);

            let (a, b) = (successes[0], successes[1]);
            assert!(a + 64 <= b || b + 64 <= a, "blocks overlap");
        });
    }
}

// ============================================================================
// Documentation-only module for non-loom builds
// ============================================================================

#[cfg(not(feature = "loom"))]
/// Loom tests are only available with the `loom` feature.
///
/// To run loom tests:
/// ```bash
/// cargo test --package keel-unsafe-primitives --features loom -- --test-threads=1 loom
/// ```
pub mod _loom_docs {}

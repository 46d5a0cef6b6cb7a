//! Integration tests for the default allocator registry.

use keel_allocator::{
    allocate, default_allocator, reset_default_allocator, set_default_allocator,
    with_default_allocator, SystemAllocator,
};
use keel_unsafe_primitives::LinearAllocator;
use std::sync::{Mutex, PoisonError};
use tracing_subscriber::EnvFilter;

static SERIAL: Mutex<()> = Mutex::new(());
static PARENT: SystemAllocator = SystemAllocator::new();

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn arena(capacity: usize) -> &'static LinearAllocator<'static, SystemAllocator> {
    Box::leak(Box::new(LinearAllocator::new(&PARENT, capacity).unwrap()))
}

#[test]
fn test_default_shared_by_all_threads() {
    init_tracing();
    let _serial = SERIAL.lock().unwrap_or_else(PoisonError::into_inner);
    reset_default_allocator();

    let linear = arena(16 * 64);
    with_default_allocator(linear, || {
        std::thread::scope(|s| {
            for i in 0..4u64 {
                s.spawn(move || {
                    for j in 0..4u64 {
                        let value = allocate(i * 10 + j).unwrap();
                        assert_eq!(*value, i * 10 + j);
                        assert!(value.allocator().is_equal(linear));
                    }
                });
            }
        });
    });

    // 16 allocations of 8 bytes, each aligned to 8.
    assert_eq!(linear.current_position(), 16 * 8);
    assert_eq!(default_allocator().name(), "system");
}

#[test]
fn test_nested_scopes_restore_in_order() {
    init_tracing();
    let _serial = SERIAL.lock().unwrap_or_else(PoisonError::into_inner);
    reset_default_allocator();

    let outer = arena(64);
    let inner = arena(64);

    with_default_allocator(outer, || {
        assert!(default_allocator().is_equal(outer));
        with_default_allocator(inner, || {
            assert!(default_allocator().is_equal(inner));
        });
        assert!(default_allocator().is_equal(outer));
    });

    assert_eq!(default_allocator().name(), "system");
}

#[test]
fn test_exhausted_default_reports_error() {
    init_tracing();
    let _serial = SERIAL.lock().unwrap_or_else(PoisonError::into_inner);
    reset_default_allocator();

    let tiny = arena(16);
    let previous = set_default_allocator(tiny);

    let first = allocate([0u8; 16]).unwrap();
    let err = allocate(1u8).unwrap_err();
    assert!(err.is_out_of_memory());
    drop(first);

    set_default_allocator(previous);
}

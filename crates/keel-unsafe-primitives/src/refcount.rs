//! Intrusive reference counting
//!
//! The count lives inside the shared object ([`RefCounted`]) rather than in a
//! separate control block, so a type-erased `RefPtr<dyn Trait>` can share the
//! same count as the concrete value it was built from.
//!
//! Types outside this crate get a count by wrapping in [`Counted<T>`], which
//! also unsizes: `Box<Counted<Concrete>>` coerces to `Box<Counted<dyn Trait>>`.
//!
//! # Safety Invariants
//!
//! 1. **Counted ownership**: Every live `RefPtr` accounts for exactly one count
//! 2. **Single destruction**: The object is destroyed only by the `RefPtr`
//!    whose release took the count from one to zero
//! 3. **Happens-before**: All uses through other pointers happen before the
//!    destruction (Release decrement, Acquire fence on the zero transition)
//!
//! # Verification
//!
//! The loom model tests in `loom_tests` exercise concurrent clone/drop.

use alloc::boxed::Box;
use core::fmt;
use core::marker::PhantomData;
use core::ops::Deref;
use core::ptr::NonNull;

use crate::atomic::{fence, AtomicUsize, Ordering};

/// Counts above this abort before the counter could wrap.
const MAX_REFCOUNT: usize = isize::MAX as usize;

/// Thread-safe reference count starting at zero.
pub struct AtomicRefCount {
    count: AtomicUsize,
}

impl AtomicRefCount {
    /// A count of zero.
    pub fn new() -> Self {
        Self {
            count: AtomicUsize::new(0),
        }
    }

    /// Add one reference.
    pub fn increment(&self) {
        // A new reference can only be formed from an existing one, so no
        // synchronization is needed here.
        let previous = self.count.fetch_add(1, Ordering::Relaxed);
        assert!(previous < MAX_REFCOUNT, "reference count overflow");
    }

    /// Drop one reference. Returns true when the count reached zero.
    ///
    /// # Safety
    ///
    /// The caller must own one of the counted references and give it up: it
    /// may not use the object through that reference afterwards. When this
    /// returns true the caller is responsible for destroying the object.
    pub unsafe fn decrement(&self) -> bool {
        let previous = self.count.fetch_sub(1, Ordering::Release);
        debug_assert!(previous != 0, "reference count underflow");
        if previous != 1 {
            return false;
        }
        fence(Ordering::Acquire);
        true
    }

    /// Whether exactly one reference is held.
    pub fn is_one(&self) -> bool {
        self.count.load(Ordering::Acquire) == 1
    }

    /// Whether no reference is held.
    pub fn is_zero(&self) -> bool {
        self.count.load(Ordering::Acquire) == 0
    }

    /// Current count (racy under concurrent use; diagnostics only).
    pub fn get(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }
}

impl Default for AtomicRefCount {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AtomicRefCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AtomicRefCount").field(&self.get()).finish()
    }
}

/// An object that carries its own [`AtomicRefCount`].
///
/// [`RefPtr`] destroys the object when the count it reads through
/// `ref_count` reaches zero, so that count must be trustworthy.
///
/// # Safety
///
/// Implementors must guarantee that:
///
/// 1. **Owned count**: `ref_count` returns a counter stored inside `self`
///    and used by no other object
/// 2. **Stable**: every call returns the same counter for the object's
///    whole lifetime
/// 3. **No other writers**: the counter is not incremented or decremented
///    except through [`RefPtr`] or [`RefCounted::release`] under its contract
///
/// Prefer [`Counted<T>`], which upholds all three for any `T`.
pub unsafe trait RefCounted {
    /// The embedded count.
    fn ref_count(&self) -> &AtomicRefCount;

    /// Add one reference.
    fn add_ref(&self) {
        self.ref_count().increment();
    }

    /// Drop one reference. Returns true when the last reference is gone.
    ///
    /// # Safety
    ///
    /// Same contract as [`AtomicRefCount::decrement`].
    unsafe fn release(&self) -> bool {
        // SAFETY: forwarded caller contract.
        unsafe { self.ref_count().decrement() }
    }

    /// Whether the caller holds the only reference.
    fn has_one_ref(&self) -> bool {
        self.ref_count().is_one()
    }
}

/// Attaches an [`AtomicRefCount`] to any value.
///
/// ```
/// use keel_unsafe_primitives::{Counted, RefPtr};
///
/// trait Shape: Send + Sync {
///     fn area(&self) -> u32;
/// }
///
/// struct Square(u32);
///
/// impl Shape for Square {
///     fn area(&self) -> u32 {
///         self.0 * self.0
///     }
/// }
///
/// let boxed: Box<Counted<dyn Shape>> = Box::new(Counted::new(Square(3)));
/// let shape = RefPtr::from_box(boxed);
/// assert_eq!(shape.area(), 9);
/// ```
///
/// The count cannot be released from safe code:
///
/// ```compile_fail
/// use keel_unsafe_primitives::{Counted, RefCounted, RefPtr};
///
/// let a = RefPtr::new(Counted::new(1u32));
/// let b = a.clone();
/// a.release();
/// ```
pub struct Counted<T: ?Sized> {
    ref_count: AtomicRefCount,
    value: T,
}

impl<T> Counted<T> {
    /// Wrap `value` with a count of zero.
    pub fn new(value: T) -> Self {
        Self {
            ref_count: AtomicRefCount::new(),
            value,
        }
    }
}

// SAFETY: the count is a private field of this object, never replaced, and
// only reachable through RefCounted, whose release is unsafe.
unsafe impl<T: ?Sized> RefCounted for Counted<T> {
    fn ref_count(&self) -> &AtomicRefCount {
        &self.ref_count
    }
}

impl<T: ?Sized> Deref for Counted<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Counted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Counted")
            .field("ref_count", &self.ref_count)
            .field("value", &&self.value)
            .finish()
    }
}

/// Owning pointer to a heap-allocated [`RefCounted`] object.
pub struct RefPtr<T: ?Sized + RefCounted> {
    ptr: NonNull<T>,
    _owns: PhantomData<T>,
}

impl<T: RefCounted> RefPtr<T> {
    /// Move `value` to the heap and take the first reference.
    pub fn new(value: T) -> Self {
        Self::from_box(Box::new(value))
    }
}

impl<T: ?Sized + RefCounted> RefPtr<T> {
    /// Take the first reference to a boxed object.
    ///
    /// Works for trait objects: box the concrete value, coerce the box, then
    /// wrap it. The embedded count must still be zero.
    pub fn from_box(value: Box<T>) -> Self {
        debug_assert!(
            value.ref_count().is_zero(),
            "object already owned by another RefPtr"
        );
        value.ref_count().increment();
        Self {
            ptr: NonNull::from(Box::leak(value)),
            _owns: PhantomData,
        }
    }

    /// Whether this is the only reference.
    pub fn has_one_ref(&self) -> bool {
        (**self).ref_count().is_one()
    }

    /// Whether both pointers refer to the same object.
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        core::ptr::eq(
            this.ptr.as_ptr().cast::<u8>(),
            other.ptr.as_ptr().cast::<u8>(),
        )
    }

    /// Raw pointer to the object.
    pub fn as_ptr(this: &Self) -> *const T {
        this.ptr.as_ptr()
    }
}

impl<T: ?Sized + RefCounted> Clone for RefPtr<T> {
    fn clone(&self) -> Self {
        (**self).ref_count().increment();
        Self {
            ptr: self.ptr,
            _owns: PhantomData,
        }
    }
}

impl<T: ?Sized + RefCounted> Drop for RefPtr<T> {
    fn drop(&mut self) {
        // SAFETY: this RefPtr owns one reference and gives it up here.
        let last = unsafe { (**self).ref_count().decrement() };
        if last {
            // SAFETY: the count reached zero, so this was the last RefPtr and
            // the allocation came from Box::leak in from_box.
            drop(unsafe { Box::from_raw(self.ptr.as_ptr()) });
        }
    }
}

impl<T: ?Sized + RefCounted> Deref for RefPtr<T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: this RefPtr holds a reference, so the object is alive.
        unsafe { self.ptr.as_ref() }
    }
}

impl<T: ?Sized + RefCounted + fmt::Debug> fmt::Debug for RefPtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

// SAFETY: RefPtr shares T across threads like Arc does: sending a RefPtr can
// drop T on another thread (needs Send) and clones give shared access from
// several threads (needs Sync). The count itself is atomic.
unsafe impl<T: ?Sized + RefCounted + Send + Sync> Send for RefPtr<T> {}

// SAFETY: see Send; &RefPtr<T> can be cloned into an owned RefPtr<T>.
unsafe impl<T: ?Sized + RefCounted + Send + Sync> Sync for RefPtr<T> {}

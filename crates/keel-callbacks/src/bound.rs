//! Bound argument storage and unwrapping
//!
//! A bound argument is either owned by the callback or held through a weak
//! relation to its owner. Unwrapping produces the value handed to the
//! functor on each call:
//!
//! - every `Clone` value is captured by value and unwraps to a fresh clone,
//! - [`WeakRef<T>`], built with [`weak`], unwraps to `Arc<T>` while the
//!   owner is alive and to nothing once it is gone.
//!
//! `WeakRef` is not `Clone`, so the two cases never overlap.
//! Reference semantics for anything else are opted into by binding a
//! pointer (`Arc<T>`, `&'static T`, `RefPtr<T>`) as the value.

use core::fmt;
use std::sync::{Arc, Weak};

use crate::type_list::{Cons, Nil, TypeList};

/// A value captured at bind time.
pub trait BoundArg {
    /// What the functor receives.
    type Unwrapped;

    /// Whether the value is held through a weak relation.
    const IS_WEAK: bool = false;

    /// Produce the argument for one call, or `None` if a weak owner is gone.
    fn unwrap_bound(&self) -> Option<Self::Unwrapped>;
}

impl<T: Clone> BoundArg for T {
    type Unwrapped = T;

    fn unwrap_bound(&self) -> Option<T> {
        Some(self.clone())
    }
}

/// A weak relation to an `Arc`-owned object.
///
/// Binding one as the receiver of a [`Method`](crate::Method) makes the
/// callback a weak call: it is skipped once the owner is gone.
pub struct WeakRef<T: ?Sized>(Weak<T>);

/// Refer to `owner` weakly.
pub fn weak<T: ?Sized>(owner: &Arc<T>) -> WeakRef<T> {
    WeakRef(Arc::downgrade(owner))
}

impl<T: ?Sized> WeakRef<T> {
    /// Whether the owner is still alive.
    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }
}

impl<T: ?Sized> From<Weak<T>> for WeakRef<T> {
    fn from(weak: Weak<T>) -> Self {
        Self(weak)
    }
}

impl<T: ?Sized> fmt::Debug for WeakRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakRef")
            .field("alive", &self.is_alive())
            .finish()
    }
}

impl<T: ?Sized> BoundArg for WeakRef<T> {
    type Unwrapped = Arc<T>;

    const IS_WEAK: bool = true;

    fn unwrap_bound(&self) -> Option<Arc<T>> {
        self.0.upgrade()
    }
}

/// A list of bound arguments.
pub trait BoundArgList: TypeList {
    /// The unwrapped values, in order.
    type Unwrapped: TypeList;

    /// How many items are held weakly.
    const WEAK_COUNT: usize;

    /// Whether the first item is held weakly.
    const FIRST_IS_WEAK: bool;

    /// Unwrap every item, or `None` if any weak owner is gone.
    fn unwrap_all(&self) -> Option<Self::Unwrapped>;
}

impl BoundArgList for Nil {
    type Unwrapped = Nil;

    const WEAK_COUNT: usize = 0;

    const FIRST_IS_WEAK: bool = false;

    fn unwrap_all(&self) -> Option<Nil> {
        Some(Nil)
    }
}

impl<H: BoundArg, T: BoundArgList> BoundArgList for Cons<H, T> {
    type Unwrapped = Cons<H::Unwrapped, T::Unwrapped>;

    const WEAK_COUNT: usize = H::IS_WEAK as usize + T::WEAK_COUNT;

    const FIRST_IS_WEAK: bool = H::IS_WEAK;

    fn unwrap_all(&self) -> Option<Self::Unwrapped> {
        Some(Cons(self.0.unwrap_bound()?, self.1.unwrap_all()?))
    }
}

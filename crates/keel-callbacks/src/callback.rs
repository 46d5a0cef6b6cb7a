//! Type-erased bound callbacks
//!
//! A [`Callback<Args, R>`] holds a shared, immutable bind state and runs it
//! with the caller's `Args` tuple. Copies share the state through its
//! intrusive reference count; the state is destroyed with the last copy.
//!
//! Every run returns `Option<R>`: `None` means the callback's receiver was
//! held weakly and no longer exists, so the call was skipped. Callbacks
//! without a weak receiver always return `Some`.

use core::fmt;

use keel_unsafe_primitives::{Counted, RefPtr};

use crate::bind_state::BindStateBase;
use crate::error::CallbackError;

/// Shared handle to a type-erased bind state.
pub type SharedBindState<Args, R> = RefPtr<Counted<dyn BindStateBase<Args, R>>>;

/// A bound callable taking the argument tuple `Args` and returning `R`.
pub struct Callback<Args, R = ()> {
    bind_state: Option<SharedBindState<Args, R>>,
}

/// A callback taking and returning nothing.
pub type Closure = Callback<(), ()>;

impl<Args, R> Callback<Args, R> {
    /// Wrap a bind state.
    pub fn from_bind_state(bind_state: SharedBindState<Args, R>) -> Self {
        Self {
            bind_state: Some(bind_state),
        }
    }

    /// Whether there is nothing to run.
    pub fn is_empty(&self) -> bool {
        self.bind_state.is_none()
    }

    /// Release the bind state, leaving the callback empty.
    pub fn reset(&mut self) {
        self.bind_state = None;
    }

    /// Whether both callbacks share the same bind state (or are both empty).
    pub fn equals(&self, other: &Self) -> bool {
        match (&self.bind_state, &other.bind_state) {
            (Some(a), Some(b)) => RefPtr::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    /// Number of arguments captured at bind time.
    pub fn bound_arg_count(&self) -> usize {
        self.bind_state
            .as_ref()
            .map_or(0, |state| state.bound_arg_count())
    }

    /// Whether runs are skipped once the receiver is gone.
    pub fn is_weak_call(&self) -> bool {
        self.bind_state
            .as_ref()
            .is_some_and(|state| state.is_weak_call())
    }

    /// Whether this is the only copy sharing the bind state.
    pub fn has_one_ref(&self) -> bool {
        self.bind_state
            .as_ref()
            .is_some_and(RefPtr::has_one_ref)
    }

    /// Run the callback.
    ///
    /// `Ok(None)` means a weak receiver was gone and nothing ran.
    pub fn try_run(&self, args: Args) -> Result<Option<R>, CallbackError> {
        let state = self.bind_state.as_ref().ok_or(CallbackError::Empty)?;
        Ok(state.invoke(args))
    }

    /// Run the callback.
    ///
    /// # Panics
    ///
    /// Panics if the callback is empty.
    pub fn run(&self, args: Args) -> Option<R> {
        match self.try_run(args) {
            Ok(result) => result,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<Args, R> Default for Callback<Args, R> {
    fn default() -> Self {
        Self { bind_state: None }
    }
}

impl<Args, R> Clone for Callback<Args, R> {
    fn clone(&self) -> Self {
        Self {
            bind_state: self.bind_state.clone(),
        }
    }
}

impl<Args, R> PartialEq for Callback<Args, R> {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl<Args, R> Eq for Callback<Args, R> {}

impl<Args, R> fmt::Debug for Callback<Args, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("empty", &self.is_empty())
            .field("bound_args", &self.bound_arg_count())
            .field("weak", &self.is_weak_call())
            .finish()
    }
}

//! keel Callbacks - Type-Safe Bound Callables
//!
//! Binds a functor to a leading prefix of its arguments and hands back a
//! [`Callback`] over the rest. The callback is type-erased over the functor
//! and the bound values, yet its argument tuple and return type are fixed at
//! compile time.
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use keel_callbacks::{bind, method, weak};
//!
//! struct Greeter {
//!     greeting: &'static str,
//! }
//!
//! impl Greeter {
//!     fn greet(&self, name: &str) -> String {
//!         format!("{}, {name}!", self.greeting)
//!     }
//! }
//!
//! let greeter = Arc::new(Greeter { greeting: "Hello" });
//! let cb = bind(method(Greeter::greet), (weak(&greeter),));
//!
//! assert_eq!(cb.run(("keel",)).as_deref(), Some("Hello, keel!"));
//!
//! drop(greeter);
//! assert_eq!(cb.run(("keel",)), None);
//! ```
//!
//! # Invariants
//!
//! 1. **Argument order**: bound arguments precede unbound ones, and both keep
//!    their order
//! 2. **Shared state**: copies of a callback share one immutable bind state,
//!    destroyed when the last copy goes away
//! 3. **Weak receivers only**: a weak reference can only be bound as the
//!    receiver of a method; any other weak binding fails to build
//! 4. **Skipped calls**: a weak call whose receiver is gone returns `None`
//!    without running anything
//!
//! # Module Organization
//!
//! - `type_list` - Type-level lists and tuple conversion
//! - `passing` - Argument passing policy
//! - `functor` - Classification of callables
//! - `bound` - Bound argument storage and unwrapping
//! - `invoker` - Dispatch of one bound call
//! - `bind_state` - Reference-counted functor and bound arguments
//! - `callback` - The type-erased `Callback`
//! - `bind` - The `bind` entry point
//! - `at_exit` - Scoped exit-time closures

#![deny(unsafe_code)]

pub mod at_exit;
pub mod bind;
pub mod bind_state;
pub mod bound;
pub mod callback;
pub mod error;
pub mod functor;
pub mod invoker;
pub mod passing;
pub mod type_list;

// Re-export commonly used items
pub use bind::{bind, MakeUnboundRunType};
pub use bind_state::{BindState, BindStateBase};
pub use at_exit::AtExitManager;
pub use bound::{weak, BoundArg, BoundArgList, WeakRef};
pub use callback::{Callback, Closure};
pub use error::{AtExitError, CallbackError};
pub use functor::{method, FunctorTraits, Method};
pub use invoker::Invoker;
pub use passing::{passing_mode, PassingMode, PassingTraits, PassingTraitsType};
pub use type_list::{
    Concat, ConcatTypeLists, Cons, DropItems, DropTypeListItem, IntoTuple, Nil, TakeItems,
    TakeTypeListItem, Tuple, TypeList,
};

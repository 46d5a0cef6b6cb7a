//! Binding functors to arguments
//!
//! [`bind`] captures a functor together with a leading prefix of its
//! parameters and returns a [`Callback`] over the remaining ones. The
//! callback's argument tuple and return type are derived from the functor:
//!
//! ```
//! use keel_callbacks::{bind, Callback};
//!
//! fn scale(factor: i32, x: i32) -> i32 {
//!     factor * x
//! }
//!
//! let triple: Callback<(i32,), i32> = bind(scale, (3,));
//! assert_eq!(triple.run((5,)), Some(15));
//! ```
//!
//! Any `Clone` value can be bound; it is captured by value and cloned into
//! every call. A [`weak`](crate::weak) reference may only be bound as the
//! receiver of a method. Anything else is rejected when the binding is
//! compiled:
//!
//! ```compile_fail
//! use std::sync::Arc;
//! use keel_callbacks::{bind, weak};
//!
//! fn read(value: Arc<u32>) -> u32 {
//!     *value
//! }
//!
//! let value = Arc::new(7u32);
//! let cb = bind(read, (weak(&value),));
//! ```

use keel_unsafe_primitives::{Counted, RefPtr};

use crate::bind_state::{BindState, BindStateBase};
use crate::bound::BoundArgList;
use crate::callback::Callback;
use crate::functor::FunctorTraits;
use crate::type_list::{Concat, DropItems, IntoTuple, Tuple, TypeList};

/// The argument tuple left for the caller when `B` is bound to a functor
/// over `P`.
pub type MakeUnboundRunType<P, B> = <<<P as Tuple>::List as DropItems<
    <<B as Tuple>::List as TypeList>::Len,
>>::Output as IntoTuple>::Tuple;

/// Bind `functor` to the leading arguments `bound_args`.
///
/// `bound_args` is a tuple; each item is a `Clone` value (cloned into every
/// call) or, as the receiver of a [`Method`](crate::Method), a
/// [`WeakRef`](crate::WeakRef).
///
/// # Panics
///
/// In debug builds, panics if `functor` is an empty [`Callback`].
pub fn bind<F, P, B, U>(functor: F, bound_args: B) -> Callback<<U as IntoTuple>::Tuple, F::Output>
where
    F: FunctorTraits<P> + Send + Sync + 'static,
    F::Output: 'static,
    P: Tuple + 'static,
    P::List: DropItems<<B::List as TypeList>::Len, Output = U> + IntoTuple<Tuple = P>,
    B: Tuple,
    B::List: BoundArgList + Send + Sync + 'static,
    <B::List as BoundArgList>::Unwrapped: Concat<U, Output = P::List>,
    U: IntoTuple + 'static,
    U::Tuple: Tuple<List = U> + 'static,
{
    let state: Box<Counted<dyn BindStateBase<U::Tuple, F::Output>>> = Box::new(Counted::new(
        BindState::<F, P, B::List, U>::new(functor, bound_args.into_list()),
    ));

    tracing::trace!(
        functor = core::any::type_name::<F>(),
        bound = <B::List as TypeList>::LEN,
        "callback bound"
    );

    Callback::from_bind_state(RefPtr::from_box(state))
}

//! Bound state storage
//!
//! [`BindState`] owns one functor and one list of bound arguments. It is
//! immutable once built. A [`Callback`] stores it inside a [`Counted`], so the
//! intrusive reference count shared by every copy sits in the same
//! allocation.
//!
//! Callbacks only see it through [`BindStateBase<Args, R>`], an object-safe
//! view whose single dispatch entry point is checked by the type system, so
//! a callback can never pair a state with the wrong invoker.
//!
//! [`Callback`]: crate::callback::Callback
//! [`Counted`]: keel_unsafe_primitives::Counted

use core::fmt;
use core::marker::PhantomData;

use crate::bound::BoundArgList;
use crate::functor::FunctorTraits;
use crate::invoker::Invoker;
use crate::type_list::{Concat, IntoTuple, Tuple};

/// A functor with its bound arguments.
///
/// `P` is the functor's parameter tuple, `B` the bound list and `U` the list
/// of parameters left for the caller.
pub struct BindState<F, P, B, U> {
    functor: F,
    bound_args: B,
    _signature: PhantomData<fn(U) -> P>,
}

impl<F, P, B, U> BindState<F, P, B, U>
where
    F: FunctorTraits<P>,
    B: BoundArgList,
{
    /// Number of bound arguments.
    pub const BOUND_ARG_COUNT: usize = B::LEN;

    /// Capture `functor` and `bound_args`.
    ///
    /// Building a state with a weak bound argument anywhere but the receiver
    /// of a method fails at compile time.
    pub fn new(functor: F, bound_args: B) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Invoker::<F, P, B>::CHECK_WEAK_BINDING;
        debug_assert!(!functor.is_null(), "binding a null functor");

        Self {
            functor,
            bound_args,
            _signature: PhantomData,
        }
    }

    /// The captured functor.
    pub fn functor(&self) -> &F {
        &self.functor
    }

    /// The captured arguments.
    pub fn bound_args(&self) -> &B {
        &self.bound_args
    }
}

impl<F, P, B, U> fmt::Debug for BindState<F, P, B, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindState")
            .field("functor", &core::any::type_name::<F>())
            .field("bound_args", &core::any::type_name::<B>())
            .finish()
    }
}

/// Type-erased view of a [`BindState`] taking the argument tuple `Args`.
pub trait BindStateBase<Args, R>: Send + Sync {
    /// Run the bound functor; `None` if a weak receiver is gone.
    fn invoke(&self, args: Args) -> Option<R>;

    /// Number of bound arguments.
    fn bound_arg_count(&self) -> usize;

    /// Whether the receiver is held weakly.
    fn is_weak_call(&self) -> bool;
}

impl<F, P, B, U> BindStateBase<U::Tuple, F::Output> for BindState<F, P, B, U>
where
    F: FunctorTraits<P> + Send + Sync,
    P: Tuple,
    B: BoundArgList + Send + Sync,
    U: IntoTuple,
    U::Tuple: Tuple<List = U>,
    B::Unwrapped: Concat<U, Output = P::List>,
    P::List: IntoTuple<Tuple = P>,
{
    fn invoke(&self, args: U::Tuple) -> Option<F::Output> {
        Invoker::<F, P, B>::run(&self.functor, &self.bound_args, args.into_list())
    }

    fn bound_arg_count(&self) -> usize {
        Self::BOUND_ARG_COUNT
    }

    fn is_weak_call(&self) -> bool {
        Invoker::<F, P, B>::IS_WEAK_CALL
    }
}

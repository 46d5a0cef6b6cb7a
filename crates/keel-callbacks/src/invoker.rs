//! Dispatch of a bound call
//!
//! [`Invoker<F, P, B>`] turns a functor `F` over parameters `P`, its bound
//! arguments `B` and the unbound arguments supplied at call time into one
//! concrete call:
//!
//! 1. unwrap every bound argument in order,
//! 2. if the call is a weak call and the receiver is gone, skip it,
//! 3. otherwise append the unbound arguments and invoke the functor.
//!
//! Bound arguments always precede unbound ones and both keep their order.

use core::marker::PhantomData;

use crate::bound::BoundArgList;
use crate::functor::FunctorTraits;
use crate::type_list::{Concat, IntoTuple, Tuple, TypeList};

/// Stateless dispatcher for one (functor, parameters, bound list) shape.
pub struct Invoker<F, P, B>(PhantomData<fn() -> (F, P, B)>);

impl<F, P, B> Invoker<F, P, B>
where
    F: FunctorTraits<P>,
    B: BoundArgList,
{
    /// The functor is a method whose receiver is held weakly.
    pub const IS_WEAK_CALL: bool = F::IS_METHOD && B::FIRST_IS_WEAK;

    /// Evaluating this rejects, at build time, any weak bound argument that
    /// is not the receiver of a method.
    pub const CHECK_WEAK_BINDING: () = assert!(
        B::WEAK_COUNT == 0 || (Self::IS_WEAK_CALL && B::WEAK_COUNT == 1),
        "weak bound arguments are only supported as the receiver of a method"
    );

    /// Call `functor` with the unwrapped `bound` list followed by `unbound`.
    ///
    /// Returns `None` when the weak receiver no longer exists.
    pub fn run<U>(functor: &F, bound: &B, unbound: U) -> Option<F::Output>
    where
        U: TypeList,
        P: Tuple,
        B::Unwrapped: Concat<U, Output = P::List>,
        P::List: IntoTuple<Tuple = P>,
    {
        let Some(unwrapped) = bound.unwrap_all() else {
            tracing::trace!(
                functor = core::any::type_name::<F>(),
                "weak receiver gone, call skipped"
            );
            return None;
        };

        let params = <B::Unwrapped as Concat<U>>::concat(unwrapped, unbound);
        Some(functor.invoke(<P::List as IntoTuple>::into_tuple(params)))
    }
}

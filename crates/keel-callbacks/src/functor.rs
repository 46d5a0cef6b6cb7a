//! Functor classification
//!
//! [`FunctorTraits<Params>`] describes a callable over the parameter tuple
//! `Params`: its arity, its return type and whether it is a method, i.e.
//! whether the first parameter is an implicit receiver. It is implemented for
//!
//! - every `Fn(A, ..) -> R` up to eight parameters (functions, function
//!   pointers, closures),
//! - [`Method<M>`], a method whose receiver is reached through any pointer
//!   that derefs to the receiver type,
//! - [`Callback`], so bound callbacks can be bound again.
//!
//! A callable of any other shape simply has no implementation, so binding it
//! fails to build.

use core::fmt;
use core::ops::Deref;

use crate::callback::Callback;
use crate::type_list::{Tuple, TypeList};

/// Static description of a callable taking the tuple `Params`.
pub trait FunctorTraits<Params> {
    /// Return type.
    type Output;

    /// Number of parameters, the receiver included.
    const ARITY: usize;

    /// Whether the first parameter is the receiver of a method.
    const IS_METHOD: bool = false;

    /// Call with the full parameter tuple.
    fn invoke(&self, params: Params) -> Self::Output;

    /// Whether the callable has nothing to call.
    fn is_null(&self) -> bool {
        false
    }
}

macro_rules! count {
    () => { 0usize };
    ($head:ident $($tail:ident)*) => { 1usize + count!($($tail)*) };
}

macro_rules! impl_fn_functor {
    ($($arg:ident),*) => {
        impl<Func, R, $($arg),*> FunctorTraits<($($arg,)*)> for Func
        where
            Func: Fn($($arg),*) -> R,
        {
            type Output = R;

            const ARITY: usize = count!($($arg)*);

            #[allow(non_snake_case)]
            fn invoke(&self, ($($arg,)*): ($($arg,)*)) -> R {
                self($($arg),*)
            }
        }
    };
}

impl_fn_functor!();
impl_fn_functor!(A);
impl_fn_functor!(A, B);
impl_fn_functor!(A, B, C);
impl_fn_functor!(A, B, C, D);
impl_fn_functor!(A, B, C, D, E);
impl_fn_functor!(A, B, C, D, E, F);
impl_fn_functor!(A, B, C, D, E, F, G);
impl_fn_functor!(A, B, C, D, E, F, G, H);

/// A method: a callable whose first parameter is `&Receiver`.
///
/// When bound, the receiver is supplied as a pointer (`Arc<T>`, `RefPtr<T>`,
/// `&'static T`, or a weak reference that upgrades to one).
#[derive(Clone, Copy)]
pub struct Method<M>(M);

/// Wrap a method so it is classified as one: `method(Counter::increment)`.
pub fn method<M>(m: M) -> Method<M> {
    Method(m)
}

impl<M> fmt::Debug for Method<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Method")
            .field(&core::any::type_name::<M>())
            .finish()
    }
}

macro_rules! impl_method_functor {
    ($($arg:ident),*) => {
        impl<M, Ptr, Recv, R, $($arg),*> FunctorTraits<(Ptr, $($arg,)*)> for Method<M>
        where
            M: Fn(&Recv, $($arg),*) -> R,
            Ptr: Deref<Target = Recv>,
            Recv: ?Sized,
        {
            type Output = R;

            const ARITY: usize = 1 + count!($($arg)*);

            const IS_METHOD: bool = true;

            #[allow(non_snake_case)]
            fn invoke(&self, (receiver, $($arg,)*): (Ptr, $($arg,)*)) -> R {
                (self.0)(&*receiver, $($arg),*)
            }
        }
    };
}

impl_method_functor!();
impl_method_functor!(A);
impl_method_functor!(A, B);
impl_method_functor!(A, B, C);
impl_method_functor!(A, B, C, D);
impl_method_functor!(A, B, C, D, E);
impl_method_functor!(A, B, C, D, E, F);
impl_method_functor!(A, B, C, D, E, F, G);

impl<Args: Tuple, R> FunctorTraits<Args> for Callback<Args, R> {
    type Output = Option<R>;

    const ARITY: usize = <Args::List as TypeList>::LEN;

    fn invoke(&self, params: Args) -> Option<R> {
        self.run(params)
    }

    fn is_null(&self) -> bool {
        self.is_empty()
    }
}

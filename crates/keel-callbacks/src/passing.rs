//! Argument passing policy
//!
//! Classifies a parameter type as cheap to copy ([`PassingMode::ByValue`]:
//! scalars, pointers, references, function pointers) or as an owned value
//! whose ownership is moved through the call ([`PassingMode::ByMove`]).
//!
//! Every argument moves into the call in Rust, and a move of a `Copy` type
//! is a bitwise copy, so the dispatch signature uses each parameter type
//! as is: [`PassingTraits::Type`] is always the type itself. The mode is a
//! classification for diagnostics and generic code; dispatch never
//! consults it. Binding does not require passing traits either.

use std::sync::Arc;

use keel_unsafe_primitives::{RefCounted, RefPtr};

use crate::callback::Callback;

/// How an argument travels through the dispatch entry point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PassingMode {
    /// Bitwise copy; the caller keeps its value.
    ByValue,
    /// Ownership moves into the callee.
    ByMove,
}

/// Passing policy for a parameter type.
pub trait PassingTraits {
    /// Type used for the parameter in the dispatch signature. Always `Self`,
    /// since arguments are moved rather than passed by reference.
    type Type;
    /// How the parameter is passed.
    const MODE: PassingMode;
}

/// The dispatch-signature type for `T`.
pub type PassingTraitsType<T> = <T as PassingTraits>::Type;

/// The passing mode of `T`.
pub const fn passing_mode<T: PassingTraits + ?Sized>() -> PassingMode {
    T::MODE
}

/// Give types passing traits.
///
/// ```
/// use keel_callbacks::{impl_passing_traits, passing_mode, PassingMode};
///
/// #[derive(Clone, Copy)]
/// enum Level { Low, High }
///
/// struct Report(String);
///
/// impl_passing_traits!(by_value: Level);
/// impl_passing_traits!(by_move: Report);
///
/// assert_eq!(passing_mode::<Level>(), PassingMode::ByValue);
/// assert_eq!(passing_mode::<Report>(), PassingMode::ByMove);
/// ```
#[macro_export]
macro_rules! impl_passing_traits {
    (by_value: $($ty:ty),+ $(,)?) => {
        $(
            impl $crate::passing::PassingTraits for $ty {
                type Type = $ty;
                const MODE: $crate::passing::PassingMode = $crate::passing::PassingMode::ByValue;
            }
        )+
    };
    (by_move: $($ty:ty),+ $(,)?) => {
        $(
            impl $crate::passing::PassingTraits for $ty {
                type Type = $ty;
                const MODE: $crate::passing::PassingMode = $crate::passing::PassingMode::ByMove;
            }
        )+
    };
}

impl_passing_traits!(by_value:
    u8, u16, u32, u64, u128, usize,
    i8, i16, i32, i64, i128, isize,
    f32, f64, bool, char, (),
);

impl_passing_traits!(by_move: String);

impl<T: ?Sized> PassingTraits for *const T {
    type Type = Self;
    const MODE: PassingMode = PassingMode::ByValue;
}

impl<T: ?Sized> PassingTraits for *mut T {
    type Type = Self;
    const MODE: PassingMode = PassingMode::ByValue;
}

impl<T: ?Sized> PassingTraits for &T {
    type Type = Self;
    const MODE: PassingMode = PassingMode::ByValue;
}

impl<T: ?Sized> PassingTraits for &mut T {
    type Type = Self;
    const MODE: PassingMode = PassingMode::ByValue;
}

impl<T> PassingTraits for Vec<T> {
    type Type = Self;
    const MODE: PassingMode = PassingMode::ByMove;
}

impl<T: ?Sized> PassingTraits for Box<T> {
    type Type = Self;
    const MODE: PassingMode = PassingMode::ByMove;
}

impl<T: ?Sized> PassingTraits for Arc<T> {
    type Type = Self;
    const MODE: PassingMode = PassingMode::ByMove;
}

impl<T> PassingTraits for Option<T> {
    type Type = Self;
    const MODE: PassingMode = PassingMode::ByMove;
}

impl<T, const N: usize> PassingTraits for [T; N] {
    type Type = Self;
    const MODE: PassingMode = PassingMode::ByMove;
}

impl<T: ?Sized + RefCounted> PassingTraits for RefPtr<T> {
    type Type = Self;
    const MODE: PassingMode = PassingMode::ByMove;
}

impl<Args, R> PassingTraits for Callback<Args, R> {
    type Type = Self;
    const MODE: PassingMode = PassingMode::ByMove;
}

macro_rules! impl_fn_pointer {
    ($($arg:ident),*) => {
        impl<R, $($arg),*> PassingTraits for fn($($arg),*) -> R {
            type Type = Self;
            const MODE: PassingMode = PassingMode::ByValue;
        }
    };
}

impl_fn_pointer!();
impl_fn_pointer!(A);
impl_fn_pointer!(A, B);
impl_fn_pointer!(A, B, C);
impl_fn_pointer!(A, B, C, D);
impl_fn_pointer!(A, B, C, D, E);
impl_fn_pointer!(A, B, C, D, E, F);
impl_fn_pointer!(A, B, C, D, E, F, G);
impl_fn_pointer!(A, B, C, D, E, F, G, H);

macro_rules! impl_tuple {
    ($($item:ident),+) => {
        impl<$($item),+> PassingTraits for ($($item,)+) {
            type Type = Self;
            const MODE: PassingMode = PassingMode::ByMove;
        }
    };
}

impl_tuple!(A);
impl_tuple!(A, B);
impl_tuple!(A, B, C);
impl_tuple!(A, B, C, D);
impl_tuple!(A, B, C, D, E);
impl_tuple!(A, B, C, D, E, F);
impl_tuple!(A, B, C, D, E, F, G);
impl_tuple!(A, B, C, D, E, F, G, H);

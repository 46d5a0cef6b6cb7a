//! Type-level lists
//!
//! A list is built from [`Nil`] and [`Cons`]. The same types serve as a
//! compile-time sequence of types (`Cons<i32, Cons<String, Nil>>`) and as a
//! heterogeneous value of that shape (`Cons(1, Cons(s, Nil))`), so every
//! type-level operation here has a value-level twin.
//!
//! Lengths are Peano naturals ([`Zero`], [`Succ`]) so that "drop N" and
//! "take N" can be resolved by the trait solver.
//!
//! # Laws
//!
//! 1. **Saturation**: dropping or taking more items than the list holds
//!    yields `Nil` or the whole list respectively, never an error
//! 2. **Split**: `Take<N, L> ++ Drop<N, L> == L` for every `N`
//! 3. **Identity**: `Nil ++ L == L` and `L ++ Nil == L`
//! 4. **Associativity**: `(A ++ B) ++ C == A ++ (B ++ C)`

use core::marker::PhantomData;

// ============================================================================
// Lists
// ============================================================================

/// The empty list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Nil;

/// A list with head `H` followed by the list `T`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Cons<H, T>(pub H, pub T);

/// Spell a list type: `type_list![i32, String]` is `Cons<i32, Cons<String, Nil>>`.
#[macro_export]
macro_rules! type_list {
    () => { $crate::type_list::Nil };
    ($head:ty $(, $tail:ty)* $(,)?) => {
        $crate::type_list::Cons<$head, $crate::type_list!($($tail),*)>
    };
}

/// Build a list value: `list![1, "a"]` is `Cons(1, Cons("a", Nil))`.
#[macro_export]
macro_rules! list {
    () => { $crate::type_list::Nil };
    ($head:expr $(, $tail:expr)* $(,)?) => {
        $crate::type_list::Cons($head, $crate::list!($($tail),*))
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __list_pattern {
    () => { $crate::type_list::Nil };
    ($head:ident $(, $tail:ident)*) => {
        $crate::type_list::Cons($head, $crate::__list_pattern!($($tail),*))
    };
}

// ============================================================================
// Naturals
// ============================================================================

/// A type-level natural number.
pub trait Nat {
    const VALUE: usize;
}

/// 0
#[derive(Clone, Copy, Debug, Default)]
pub struct Zero;

/// N + 1
#[derive(Clone, Copy, Debug, Default)]
pub struct Succ<N>(PhantomData<N>);

impl Nat for Zero {
    const VALUE: usize = 0;
}

impl<N: Nat> Nat for Succ<N> {
    const VALUE: usize = N::VALUE + 1;
}

pub type N0 = Zero;
pub type N1 = Succ<N0>;
pub type N2 = Succ<N1>;
pub type N3 = Succ<N2>;
pub type N4 = Succ<N3>;
pub type N5 = Succ<N4>;
pub type N6 = Succ<N5>;
pub type N7 = Succ<N6>;
pub type N8 = Succ<N7>;

// ============================================================================
// Operations
// ============================================================================

/// A well-formed list.
pub trait TypeList {
    /// Length as a type-level natural.
    type Len: Nat;
    /// Length as a value.
    const LEN: usize = <Self::Len as Nat>::VALUE;
}

impl TypeList for Nil {
    type Len = Zero;
}

impl<H, T: TypeList> TypeList for Cons<H, T> {
    type Len = Succ<T::Len>;
}

/// Remove the first `N` items, saturating at `Nil`.
pub trait DropItems<N>: TypeList {
    type Output: TypeList;

    fn drop_items(self) -> Self::Output;
}

impl<L: TypeList> DropItems<Zero> for L {
    type Output = L;

    fn drop_items(self) -> L {
        self
    }
}

impl<N> DropItems<Succ<N>> for Nil {
    type Output = Nil;

    fn drop_items(self) -> Nil {
        Nil
    }
}

impl<N, H, T: DropItems<N>> DropItems<Succ<N>> for Cons<H, T> {
    type Output = T::Output;

    fn drop_items(self) -> Self::Output {
        <T as DropItems<N>>::drop_items(self.1)
    }
}

/// Keep the first `N` items, saturating at the whole list.
pub trait TakeItems<N>: TypeList {
    type Output: TypeList;

    fn take_items(self) -> Self::Output;
}

impl<L: TypeList> TakeItems<Zero> for L {
    type Output = Nil;

    fn take_items(self) -> Nil {
        Nil
    }
}

impl<N> TakeItems<Succ<N>> for Nil {
    type Output = Nil;

    fn take_items(self) -> Nil {
        Nil
    }
}

impl<N, H, T: TakeItems<N>> TakeItems<Succ<N>> for Cons<H, T> {
    type Output = Cons<H, T::Output>;

    fn take_items(self) -> Self::Output {
        Cons(self.0, <T as TakeItems<N>>::take_items(self.1))
    }
}

/// Append the list `R`, preserving the order of both.
pub trait Concat<R: TypeList>: TypeList {
    type Output: TypeList;

    fn concat(self, rhs: R) -> Self::Output;
}

impl<R: TypeList> Concat<R> for Nil {
    type Output = R;

    fn concat(self, rhs: R) -> R {
        rhs
    }
}

impl<R: TypeList, H, T: Concat<R>> Concat<R> for Cons<H, T> {
    type Output = Cons<H, T::Output>;

    fn concat(self, rhs: R) -> Self::Output {
        Cons(self.0, <T as Concat<R>>::concat(self.1, rhs))
    }
}

/// `List` without its first `N` items.
pub type DropTypeListItem<N, List> = <List as DropItems<N>>::Output;

/// The first `N` items of `List`.
pub type TakeTypeListItem<N, List> = <List as TakeItems<N>>::Output;

/// `List1` followed by `List2`.
pub type ConcatTypeLists<List1, List2> = <List1 as Concat<List2>>::Output;

// ============================================================================
// Tuple conversion
// ============================================================================

/// A tuple that can be viewed as a list.
pub trait Tuple {
    type List: TypeList;

    fn into_list(self) -> Self::List;
}

/// A list that can be packed back into a tuple.
pub trait IntoTuple: TypeList {
    type Tuple;

    fn into_tuple(self) -> Self::Tuple;
}

macro_rules! impl_tuple {
    ($($item:ident),*) => {
        impl<$($item),*> Tuple for ($($item,)*) {
            type List = $crate::type_list!($($item),*);

            #[allow(non_snake_case, clippy::unused_unit)]
            fn into_list(self) -> Self::List {
                let ($($item,)*) = self;
                $crate::list!($($item),*)
            }
        }

        impl<$($item),*> IntoTuple for $crate::type_list!($($item),*) {
            type Tuple = ($($item,)*);

            #[allow(non_snake_case, clippy::unused_unit)]
            fn into_tuple(self) -> Self::Tuple {
                let $crate::__list_pattern!($($item),*) = self;
                ($($item,)*)
            }
        }
    };
}

impl_tuple!();
impl_tuple!(A);
impl_tuple!(A, B);
impl_tuple!(A, B, C);
impl_tuple!(A, B, C, D);
impl_tuple!(A, B, C, D, E);
impl_tuple!(A, B, C, D, E, F);
impl_tuple!(A, B, C, D, E, F, G);
impl_tuple!(A, B, C, D, E, F, G, H);

#[cfg(test)]
mod tests {
    use super::*;
    use core::any::TypeId;

    fn same<A: 'static, B: 'static>() -> bool {
        TypeId::of::<A>() == TypeId::of::<B>()
    }

    type Abc = type_list![u8, u16, u32];

    #[test]
    fn test_len() {
        assert_eq!(Nil::LEN, 0);
        assert_eq!(<Abc as TypeList>::LEN, 3);
        assert_eq!(<N8 as Nat>::VALUE, 8);
    }

    #[test]
    fn test_drop() {
        assert!(same::<DropTypeListItem<N0, Abc>, Abc>());
        assert!(same::<DropTypeListItem<N1, Abc>, type_list![u16, u32]>());
        assert!(same::<DropTypeListItem<N3, Abc>, Nil>());
    }

    #[test]
    fn test_drop_saturates() {
        assert!(same::<DropTypeListItem<N5, Abc>, Nil>());
        assert!(same::<DropTypeListItem<N2, Nil>, Nil>());
    }

    #[test]
    fn test_take() {
        assert!(same::<TakeTypeListItem<N0, Abc>, Nil>());
        assert!(same::<TakeTypeListItem<N2, Abc>, type_list![u8, u16]>());
        assert!(same::<TakeTypeListItem<N3, Abc>, Abc>());
    }

    #[test]
    fn test_take_saturates() {
        assert!(same::<TakeTypeListItem<N7, Abc>, Abc>());
        assert!(same::<TakeTypeListItem<N1, Nil>, Nil>());
    }

    #[test]
    fn test_concat_preserves_order() {
        assert!(same::<
            ConcatTypeLists<type_list![u8], type_list![u16, u32]>,
            Abc,
        >());
        assert!(!same::<
            ConcatTypeLists<type_list![u16, u32], type_list![u8]>,
            Abc,
        >());
    }

    #[test]
    fn test_concat_identity() {
        assert!(same::<ConcatTypeLists<Nil, Abc>, Abc>());
        assert!(same::<ConcatTypeLists<Abc, Nil>, Abc>());
        assert!(same::<ConcatTypeLists<Nil, Nil>, Nil>());
    }

    #[test]
    fn test_value_operations() {
        let items = list![1u8, 2u16, 3u32];

        assert_eq!(DropItems::<N1>::drop_items(items), list![2u16, 3u32]);
        assert_eq!(TakeItems::<N2>::take_items(items), list![1u8, 2u16]);
        assert_eq!(DropItems::<N4>::drop_items(items), Nil);
        assert_eq!(TakeItems::<N4>::take_items(items), items);
        assert_eq!(list![1u8].concat(list![2u16, 3u32]), items);
    }

    #[test]
    fn test_tuple_conversion() {
        let list = (1, "two", 3.0).into_list();
        assert_eq!(list, list![1, "two", 3.0]);
        assert_eq!(list.into_tuple(), (1, "two", 3.0));

        assert_eq!(().into_list(), Nil);
        assert_eq!(Nil.into_tuple(), ());
        assert!(same::<<(u8, u16, u32) as Tuple>::List, Abc>());
        assert!(same::<<Abc as IntoTuple>::Tuple, (u8, u16, u32)>());
    }

    #[test]
    fn test_eight_items() {
        let tuple = (1u8, 2u16, 3u32, 4u64, 5i8, 6i16, 7i32, 8i64);
        let list = tuple.into_list();
        assert_eq!(<<(u8, u16, u32, u64, i8, i16, i32, i64) as Tuple>::List as TypeList>::LEN, 8);
        assert_eq!(list.into_tuple(), tuple);
    }
}

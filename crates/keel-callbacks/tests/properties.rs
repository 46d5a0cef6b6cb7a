//! Property tests for argument ordering and type-level lists.

use keel_callbacks::{bind, list, Concat, DropItems, IntoTuple, TakeItems, Tuple};
use keel_callbacks::type_list::{N0, N1, N2, N3, N4, N5};
use proptest::prelude::*;

fn collect(a: u8, b: u8, c: u8, d: u8) -> Vec<u8> {
    vec![a, b, c, d]
}

proptest! {
    #[test]
    fn bound_arguments_precede_unbound(a: u8, b: u8, c: u8, d: u8) {
        let none = bind(collect, ());
        let one = bind(collect, (a,));
        let two = bind(collect, (a, b));
        let three = bind(collect, (a, b, c));
        let all = bind(collect, (a, b, c, d));

        let expected = vec![a, b, c, d];
        prop_assert_eq!(none.run((a, b, c, d)), Some(expected.clone()));
        prop_assert_eq!(one.run((b, c, d)), Some(expected.clone()));
        prop_assert_eq!(two.run((c, d)), Some(expected.clone()));
        prop_assert_eq!(three.run((d,)), Some(expected.clone()));
        prop_assert_eq!(all.run(()), Some(expected));
    }

    #[test]
    fn repeated_runs_are_independent(bound: i64, xs in proptest::collection::vec(any::<i64>(), 0..16)) {
        let cb = bind(|a: i64, b: i64| a.wrapping_sub(b), (bound,));
        for x in xs {
            prop_assert_eq!(cb.run((x,)), Some(bound.wrapping_sub(x)));
        }
    }

    #[test]
    fn take_then_drop_rebuilds_list(a: u32, b: u16, c: i8, d: bool) {
        let items = list![a, b, c, d];

        macro_rules! check_split {
            ($($n:ty),*) => {$(
                let front = <_ as TakeItems<$n>>::take_items(items);
                let back = <_ as DropItems<$n>>::drop_items(items);
                prop_assert_eq!(front.concat(back), items);
            )*};
        }

        check_split!(N0, N1, N2, N3, N4, N5);
    }

    #[test]
    fn concat_identity_and_tuple_conversion(a: u64, b: char) {
        let items = (a, b).into_list();

        prop_assert_eq!(list![].concat(items), items);
        prop_assert_eq!(items.concat(list![]), items);
        prop_assert_eq!(items.into_tuple(), (a, b));
    }

    #[test]
    fn concat_is_associative(a: u8, b: u16, c: u32) {
        let (x, y, z) = (list![a], list![b, a], list![c]);
        prop_assert_eq!(x.concat(y).concat(z), x.concat(y.concat(z)));
    }
}

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::rc::Rc;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::core::{SpecialWireKind, TypeDescriptor};

/// Types that can describe their own wire shape.
///
/// Implement it with `#[derive(Describe)]` on structs; the impls for standard
/// types live in this module.
pub trait Describe {
    fn describe() -> TypeDescriptor;
}

/// Input type for handlers that take no parameters.
///
/// Decodes from `{}` (and from an empty request body), and gives the handler a
/// zero-argument client method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Empty {}

impl Describe for Empty {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::anonymous(Vec::new())
    }
}

macro_rules! describe_as {
    ($descriptor:expr => $($ty:ty),+ $(,)?) => {
        $(
            impl Describe for $ty {
                fn describe() -> TypeDescriptor {
                    $descriptor
                }
            }
        )+
    };
}

describe_as!(TypeDescriptor::string() => String, str, char);
describe_as!(TypeDescriptor::boolean() => bool);
describe_as!(
    TypeDescriptor::number() =>
    i8, i16, i32, i64, i128, isize,
    u8, u16, u32, u64, u128, usize,
    f32, f64,
    std::num::NonZeroU8, std::num::NonZeroU16, std::num::NonZeroU32,
    std::num::NonZeroU64, std::num::NonZeroUsize,
    std::num::NonZeroI32, std::num::NonZeroI64,
);
describe_as!(TypeDescriptor::Unknown => (), serde_json::Value);
describe_as!(
    TypeDescriptor::SpecialWire(SpecialWireKind::Timestamp) =>
    chrono::NaiveDateTime, chrono::NaiveDate,
);

impl<Tz: chrono::TimeZone> Describe for chrono::DateTime<Tz> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::SpecialWire(SpecialWireKind::Timestamp)
    }
}

impl Describe for Cow<'_, str> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::string()
    }
}

impl<T: Describe> Describe for Option<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::optional(T::describe())
    }
}

macro_rules! describe_transparent {
    ($($ty:ident),+) => {
        $(
            impl<T: Describe + ?Sized> Describe for $ty<T> {
                fn describe() -> TypeDescriptor {
                    T::describe()
                }
            }
        )+
    };
}

describe_transparent!(Box, Arc, Rc);

impl<T: Describe + ?Sized> Describe for &T {
    fn describe() -> TypeDescriptor {
        T::describe()
    }
}

macro_rules! describe_sequence {
    ($($ty:ident),+) => {
        $(
            impl<T: Describe> Describe for $ty<T> {
                fn describe() -> TypeDescriptor {
                    TypeDescriptor::sequence(T::describe())
                }
            }
        )+
    };
}

describe_sequence!(Vec, VecDeque, BTreeSet);

impl<T: Describe, S> Describe for HashSet<T, S> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::sequence(T::describe())
    }
}

impl<T: Describe> Describe for [T] {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::sequence(T::describe())
    }
}

impl<T: Describe, const N: usize> Describe for [T; N] {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::sequence(T::describe())
    }
}

// Maps have no structural counterpart in the descriptor model.
impl<K, V, S> Describe for HashMap<K, V, S> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::Unknown
    }
}

impl<K, V> Describe for BTreeMap<K, V> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::Unknown
    }
}

impl<K, V, S> Describe for indexmap::IndexMap<K, V, S> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::Unknown
    }
}

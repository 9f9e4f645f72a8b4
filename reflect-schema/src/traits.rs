//! The `Reflect` trait, its std implementations, and the capability traits
//!
//! Capabilities are opt-in behaviours. A type implements the trait and its
//! descriptor wires it in with the matching `TypeInfo::with_*` method (the
//! derive macro does this from `#[reflect(...)]` flags).

use std::borrow::Cow;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, LinkedList, VecDeque};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::rc::Rc;
use std::sync::mpsc::{Receiver, Sender, SyncSender};
use std::sync::{Arc, Mutex, RwLock};
use std::time::SystemTime;

use crate::schema::{Schema, SchemaObject};
use crate::types::{IntKind, Kind, Type, TypeInfo, WellKnown};

/// Types that can describe their own shape
///
/// # Example
///
/// ```rust
/// use reflect_schema::{Field, Kind, Reflect, TypeInfo};
///
/// struct Point {
///     x: f64,
///     y: f64,
/// }
///
/// impl Reflect for Point {
///     fn type_info() -> TypeInfo {
///         TypeInfo::of::<Self>(Kind::Struct(vec![
///             Field::new::<f64>("x"),
///             Field::new::<f64>("y"),
///         ]))
///         .with_name("Point")
///         .with_module_path(module_path!())
///     }
/// }
/// ```
pub trait Reflect: 'static {
    /// Build the descriptor; called once per type per process
    fn type_info() -> TypeInfo;
}

/// Provide a complete schema instead of reflecting the type
pub trait CustomSchema {
    fn json_schema() -> Schema;
}

/// Adjust the reflected schema in place
pub trait ExtendSchema {
    fn extend_schema(schema: &mut SchemaObject);
}

/// Reflect another type in place of this one
pub trait AliasSchema {
    fn alias_type() -> Type;
}

/// Substitute the type reflected for individual properties
pub trait PropertyAlias {
    /// Type to use for `property`, `None` to keep the field's own type
    fn property_alias(property: &str) -> Option<Type>;
}

/// Per-field descriptions, keyed by Rust field name
pub trait FieldDocs {
    fn field_doc(field: &str) -> Option<String>;
}

/// Enumerations accepted either by name or by integer code
pub trait DualEnum {}

// ============================================================================
// Primitive implementations
// ============================================================================

impl Reflect for bool {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Self>(Kind::Bool)
    }
}

macro_rules! impl_reflect_integer {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Reflect for $ty {
                fn type_info() -> TypeInfo {
                    TypeInfo::of::<Self>(Kind::Integer(IntKind::$kind))
                }
            }
        )*
    };
}

impl_reflect_integer!(
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    i128 => I128,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    u128 => U128,
    usize => Usize,
);

macro_rules! impl_reflect_leaf {
    ($kind:expr => $($ty:ty),* $(,)?) => {
        $(
            impl Reflect for $ty {
                fn type_info() -> TypeInfo {
                    TypeInfo::of::<Self>($kind)
                }
            }
        )*
    };
}

impl_reflect_leaf!(Kind::Number => f32, f64);
impl_reflect_leaf!(Kind::String => String, str, char);
impl_reflect_leaf!(Kind::Dynamic => serde_json::Value);

// ============================================================================
// Wrappers
// ============================================================================

macro_rules! impl_reflect_pointer {
    ($($ty:ident),* $(,)?) => {
        $(
            impl<T: Reflect + ?Sized> Reflect for $ty<T> {
                fn type_info() -> TypeInfo {
                    TypeInfo::of::<Self>(Kind::Pointer(Type::of::<T>))
                }
            }
        )*
    };
}

impl_reflect_pointer!(Box, Arc, Rc, Mutex, RwLock, RefCell);

impl<T: Reflect> Reflect for Option<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Self>(Kind::Pointer(Type::of::<T>))
    }
}

impl<T: Reflect + ?Sized> Reflect for &'static T {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Self>(Kind::Pointer(Type::of::<T>))
    }
}

impl<T> Reflect for Cow<'static, T>
where
    T: Reflect + ToOwned + ?Sized,
    T::Owned: 'static,
{
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Self>(Kind::Pointer(Type::of::<T>))
    }
}

// ============================================================================
// Collections
// ============================================================================

impl<T: Reflect> Reflect for [T] {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Self>(Kind::Seq(Type::of::<T>))
    }
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Self>(Kind::Array(Type::of::<T>, N))
    }
}

macro_rules! impl_reflect_seq {
    ($($ty:ident),* $(,)?) => {
        $(
            impl<T: Reflect> Reflect for $ty<T> {
                fn type_info() -> TypeInfo {
                    TypeInfo::of::<Self>(Kind::Seq(Type::of::<T>))
                }
            }
        )*
    };
}

impl_reflect_seq!(Vec, VecDeque, LinkedList, BTreeSet);

impl<T: Reflect, S: 'static> Reflect for HashSet<T, S> {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Self>(Kind::Seq(Type::of::<T>))
    }
}

impl<K: Reflect, V: Reflect, S: 'static> Reflect for HashMap<K, V, S> {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Self>(Kind::Map {
            key: Type::of::<K>,
            value: Type::of::<V>,
        })
    }
}

impl<K: Reflect, V: Reflect> Reflect for BTreeMap<K, V> {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Self>(Kind::Map {
            key: Type::of::<K>,
            value: Type::of::<V>,
        })
    }
}

impl Reflect for serde_json::Map<String, serde_json::Value> {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Self>(Kind::Map {
            key: Type::of::<String>,
            value: Type::of::<serde_json::Value>,
        })
    }
}

// ============================================================================
// Well-known leaf types
// ============================================================================

macro_rules! impl_reflect_well_known {
    ($($ty:ty => $well_known:ident),* $(,)?) => {
        $(
            impl Reflect for $ty {
                fn type_info() -> TypeInfo {
                    TypeInfo::of::<Self>(Kind::String).with_well_known(WellKnown::$well_known)
                }
            }
        )*
    };
}

impl_reflect_well_known!(
    SystemTime => DateTime,
    IpAddr => Ipv4,
    Ipv4Addr => Ipv4,
    Ipv6Addr => Ipv6,
    url::Url => Uri,
);

#[cfg(feature = "chrono")]
impl<Tz: chrono::TimeZone + 'static> Reflect for chrono::DateTime<Tz> {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Self>(Kind::String).with_well_known(WellKnown::DateTime)
    }
}

#[cfg(feature = "chrono")]
impl_reflect_well_known!(chrono::NaiveDate => Date);

#[cfg(feature = "uuid")]
impl_reflect_well_known!(uuid::Uuid => Uuid);

// ============================================================================
// Types without a JSON representation
// ============================================================================

macro_rules! impl_reflect_channel {
    ($($ty:ident),* $(,)?) => {
        $(
            impl<T: Reflect> Reflect for $ty<T> {
                fn type_info() -> TypeInfo {
                    TypeInfo::of::<Self>(Kind::Channel(Type::of::<T>))
                }
            }
        )*
    };
}

impl_reflect_channel!(Sender, SyncSender, Receiver);

impl<R: 'static> Reflect for fn() -> R {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Self>(Kind::Function)
    }
}

impl<A: 'static, R: 'static> Reflect for fn(A) -> R {
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Self>(Kind::Function)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_kinds() {
        assert!(matches!(Type::of::<bool>().kind(), Kind::Bool));
        assert!(matches!(Type::of::<i64>().kind(), Kind::Integer(IntKind::I64)));
        assert!(matches!(Type::of::<f32>().kind(), Kind::Number));
        assert!(matches!(Type::of::<char>().kind(), Kind::String));
        assert!(matches!(Type::of::<str>().kind(), Kind::String));
    }

    #[test]
    fn test_primitives_are_unnamed() {
        assert_eq!(Type::of::<String>().name(), "");
        assert_eq!(Type::of::<Vec<u8>>().name(), "");
    }

    #[test]
    fn test_collection_kinds() {
        match Type::of::<[u16; 4]>().kind() {
            Kind::Array(elem, len) => {
                assert_eq!(*len, 4);
                assert_eq!(elem(), Type::of::<u16>());
            }
            other => panic!("expected array, got {other:?}"),
        }

        match Type::of::<HashMap<u32, String>>().kind() {
            Kind::Map { key, value } => {
                assert_eq!(key(), Type::of::<u32>());
                assert_eq!(value(), Type::of::<String>());
            }
            other => panic!("expected map, got {other:?}"),
        }

        assert!(matches!(Type::of::<BTreeSet<i8>>().kind(), Kind::Seq(_)));
    }

    #[test]
    fn test_wrappers_are_pointers() {
        assert_eq!(Type::of::<Option<String>>().deref(), Type::of::<String>());
        assert_eq!(Type::of::<Arc<Box<str>>>().deref(), Type::of::<str>());
        assert_eq!(Type::of::<Cow<'static, str>>().deref(), Type::of::<str>());
    }

    #[test]
    fn test_well_known_types() {
        assert_eq!(
            Type::of::<SystemTime>().capabilities().well_known,
            Some(WellKnown::DateTime)
        );
        assert_eq!(
            Type::of::<Ipv6Addr>().capabilities().well_known,
            Some(WellKnown::Ipv6)
        );
        assert_eq!(
            Type::of::<url::Url>().capabilities().well_known,
            Some(WellKnown::Uri)
        );
    }

    #[test]
    fn test_unsupported_kinds() {
        assert!(matches!(Type::of::<Sender<u8>>().kind(), Kind::Channel(_)));
        assert!(matches!(Type::of::<fn() -> u8>().kind(), Kind::Function));
    }
}

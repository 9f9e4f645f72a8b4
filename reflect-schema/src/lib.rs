//! # reflect-schema
//!
//! Generate [JSON Schema](https://json-schema.org/) (draft 2020-12) documents
//! from Rust type descriptors.
//!
//! Every reflectable type implements [`Reflect`], which returns a
//! [`TypeInfo`]: the type's shape (struct fields, element types, map key and
//! value types), its display name, and the optional capabilities it opts
//! into. A [`Reflector`] walks these descriptors and produces a [`Schema`]
//! tree that serializes with `serde`.
//!
//! ## Quick Start
//!
//! ```rust
//! use reflect_schema::Reflect;
//!
//! #[derive(Reflect)]
//! struct User {
//!     #[reflect(json = "id", jsonschema = "minimum=1")]
//!     id: u64,
//!     #[reflect(json = "name,omitempty", jsonschema = "title=Display name")]
//!     name: String,
//!     #[reflect(json = "friends")]
//!     friends: Vec<u64>,
//! }
//!
//! let schema = reflect_schema::reflect::<User>().unwrap();
//! let json = serde_json::to_value(&schema).unwrap();
//!
//! assert_eq!(json["$ref"], "#/$defs/User");
//! assert_eq!(json["$defs"]["User"]["required"], serde_json::json!(["id", "friends"]));
//! ```
//!
//! ## Features
//!
//! | Feature | Description | Default |
//! |---------|-------------|---------|
//! | `derive` | `#[derive(Reflect)]` | ✅ |
//! | `chrono` | Support for `chrono::DateTime` and `NaiveDate` | ❌ |
//! | `uuid` | Support for `uuid::Uuid` | ❌ |
//!
//! ## Annotations
//!
//! Fields carry struct-tag style annotations. With the derive macro they are
//! written as `#[reflect(...)]` attributes; hand-written descriptors use
//! [`Field::with_tag`] or [`Tags::parse`].
//!
//! | Annotation | Meaning |
//! |------------|---------|
//! | `json = "name,omitempty"` | Property name and options (`-` skips, `omitempty`/`omitzero` make it optional, `inline` flattens) |
//! | `jsonschema = "k=v,..."` | Schema keywords (`title`, `minLength`, `enum`, `oneof_type`, `required`, `nullable`, ...) |
//! | `jsonschema_extras = "k=v,..."` | Extension keywords copied into the schema |
//! | `jsonschema_description = "..."` | Property description |
//!
//! Commas inside a `jsonschema` value are escaped as `\,`.
//!
//! ## Type Mappings
//!
//! | Rust Type | Schema |
//! |-----------|--------|
//! | `bool` | `{"type": "boolean"}` |
//! | integers | `{"type": "integer"}` |
//! | `f32`, `f64` | `{"type": "number"}` |
//! | `String`, `&str`, `char` | `{"type": "string"}` |
//! | `Vec<u8>` | `{"type": "string", "contentEncoding": "base64"}` |
//! | `Vec<T>`, sets | `{"type": "array", "items": T}` |
//! | `[T; N]` | array with `minItems = maxItems = N` |
//! | `HashMap<String, V>` | `{"type": "object", "additionalProperties": V}` |
//! | `HashMap<u32, V>` | `patternProperties` keyed by `^[0-9]+$` |
//! | `Option<T>`, `Box<T>`, `Arc<T>` | `T` |
//! | `serde_json::Value` | `true` |
//! | `SystemTime`, `chrono::DateTime` | `date-time` string |
//! | `url::Url` | `uri` string |
//! | `Ipv4Addr`, `Ipv6Addr` | `ipv4` / `ipv6` string |
//!
//! Named structs are emitted once under `$defs` and referenced with `$ref`,
//! which makes self-referential types finite.
//!
//! ## Tracing
//!
//! The crate emits `tracing` events and never installs a subscriber:
//! root generation and cache activity at debug level, annotation parsing and
//! cache stores at trace level.

pub mod cache;
pub mod error;
pub mod id;
pub mod properties;
pub mod reflector;
pub mod schema;
pub mod tags;
pub mod traits;
pub mod types;

mod definitions;
mod keywords;
mod walker;

pub use cache::CacheStats;
pub use error::{ReflectError, Result};
pub use id::{to_kebab_case, Id, IdError};
pub use properties::Properties;
pub use reflector::{
    comment_key, reflect, reflect_from_type, AdditionalFieldsFn, KeyNamerFn, LookupCommentFn,
    LookupFn, MapperFn, NamerFn, Reflector,
};
pub use schema::{Definitions, InstanceType, Schema, SchemaObject, VERSION};
pub use tags::{split_on_unescaped_commas, FieldTags};
pub use traits::{AliasSchema, CustomSchema, DualEnum, ExtendSchema, FieldDocs, PropertyAlias, Reflect};
pub use types::{Capabilities, Field, IntKind, Kind, Tags, Type, TypeFn, TypeInfo, WellKnown};
pub use walker::INTEGER_KEY_PATTERN;

// Re-export derive macro when available
#[cfg(feature = "derive")]
pub use reflect_schema_macros::Reflect;

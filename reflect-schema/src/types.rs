//! Type descriptors
//!
//! A [`Type`] is a cheap handle to the [`TypeInfo`] of one Rust type. Handles
//! are built once per type through [`Reflect::type_info`] and interned in a
//! process-wide table, so repeated lookups are a hash probe.
//!
//! Field and element types are stored as `fn() -> Type` thunks. Building a
//! descriptor never resolves them, which keeps self-referential types finite.

use std::any::TypeId;
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, LazyLock};

use dashmap::DashMap;

use crate::schema::{InstanceType, Schema, SchemaObject};
use crate::traits::{
    AliasSchema, CustomSchema, DualEnum, ExtendSchema, FieldDocs, PropertyAlias, Reflect,
};

/// Lazily resolved type reference
pub type TypeFn = fn() -> Type;

static TYPES: LazyLock<DashMap<TypeId, Type>> = LazyLock::new(DashMap::new);

/// Shared handle to a type descriptor
///
/// Two handles are equal when they describe the same Rust type.
#[derive(Clone)]
pub struct Type(Arc<TypeInfo>);

impl Type {
    /// Descriptor of `T`, built on first use
    pub fn of<T: Reflect + ?Sized>() -> Type {
        let id = TypeId::of::<T>();
        if let Some(ty) = TYPES.get(&id) {
            return ty.value().clone();
        }

        // Built outside the map so descriptors may look up other types.
        let ty = Type(Arc::new(T::type_info()));
        TYPES.entry(id).or_insert(ty).value().clone()
    }

    /// Wrap a hand-built descriptor without interning it
    ///
    /// Such handles share their [`TypeId`] with other descriptors, so
    /// per-type caches never store anything derived from them.
    pub fn from_info(info: TypeInfo) -> Type {
        Type(Arc::new(info))
    }

    /// True when this handle is the process-wide descriptor of its type
    pub fn is_interned(&self) -> bool {
        TYPES
            .get(&self.0.id)
            .is_some_and(|interned| Arc::ptr_eq(&interned.value().0, &self.0))
    }

    pub fn info(&self) -> &TypeInfo {
        &self.0
    }

    pub fn id(&self) -> TypeId {
        self.0.id
    }

    /// Display name used for definitions; empty for unnamed types
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Full Rust type name, for diagnostics
    pub fn rust_name(&self) -> &str {
        self.0.rust_name
    }

    pub fn module_path(&self) -> &str {
        &self.0.module_path
    }

    pub fn kind(&self) -> &Kind {
        &self.0.kind
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.0.capabilities
    }

    /// Follow pointer kinds down to the first non-pointer type
    pub fn deref(&self) -> Type {
        let mut ty = self.clone();
        loop {
            let next = match ty.kind() {
                Kind::Pointer(elem) => *elem,
                _ => return ty,
            };
            ty = next();
        }
    }

    /// True for structs and pointers to structs
    pub fn is_struct(&self) -> bool {
        matches!(self.deref().kind(), Kind::Struct(_))
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Type {}

impl Hash for Type {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Type").field(&self.0.rust_name).finish()
    }
}

/// Everything the walker needs to know about one type
#[derive(Debug, Clone)]
pub struct TypeInfo {
    id: TypeId,
    rust_name: &'static str,
    name: Cow<'static, str>,
    module_path: Cow<'static, str>,
    kind: Kind,
    capabilities: Capabilities,
}

impl TypeInfo {
    /// Unnamed descriptor of `T` with the given kind
    pub fn of<T: ?Sized + 'static>(kind: Kind) -> Self {
        Self {
            id: TypeId::of::<T>(),
            rust_name: std::any::type_name::<T>(),
            name: Cow::Borrowed(""),
            module_path: Cow::Borrowed(""),
            kind,
            capabilities: Capabilities::default(),
        }
    }

    /// Set the display name
    #[must_use = "This method returns a new TypeInfo and does not modify self"]
    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the module path used for comment lookups and default ids
    #[must_use = "This method returns a new TypeInfo and does not modify self"]
    pub fn with_module_path(mut self, path: impl Into<Cow<'static, str>>) -> Self {
        self.module_path = path.into();
        self
    }

    /// Use the schema provided by `T` instead of reflecting the kind
    #[must_use = "This method returns a new TypeInfo and does not modify self"]
    pub fn with_custom_schema<T: CustomSchema>(mut self) -> Self {
        self.capabilities.custom_schema = Some(T::json_schema);
        self
    }

    /// Let `T` adjust the reflected schema
    #[must_use = "This method returns a new TypeInfo and does not modify self"]
    pub fn with_extend<T: ExtendSchema>(mut self) -> Self {
        self.capabilities.extend = Some(T::extend_schema);
        self
    }

    /// Reflect the type returned by `T::alias_type` instead
    #[must_use = "This method returns a new TypeInfo and does not modify self"]
    pub fn with_alias<T: AliasSchema>(mut self) -> Self {
        self.capabilities.alias = Some(T::alias_type);
        self
    }

    /// Substitute per-property types
    #[must_use = "This method returns a new TypeInfo and does not modify self"]
    pub fn with_property_alias<T: PropertyAlias>(mut self) -> Self {
        self.capabilities.property_alias = Some(T::property_alias);
        self
    }

    /// Take field descriptions from `T::field_doc`
    #[must_use = "This method returns a new TypeInfo and does not modify self"]
    pub fn with_field_docs<T: FieldDocs>(mut self) -> Self {
        self.capabilities.field_docs = Some(T::field_doc);
        self
    }

    /// Describe values as either their string name or integer code
    #[must_use = "This method returns a new TypeInfo and does not modify self"]
    pub fn with_dual_enum<T: DualEnum>(mut self) -> Self {
        self.capabilities.dual_enum = true;
        self
    }

    /// Mark as a leaf type with a fixed schema
    #[must_use = "This method returns a new TypeInfo and does not modify self"]
    pub fn with_well_known(mut self, well_known: WellKnown) -> Self {
        self.capabilities.well_known = Some(well_known);
        self
    }

    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    /// Take the kind out, e.g. to give a newtype its inner type's shape
    pub fn into_kind(self) -> Kind {
        self.kind
    }
}

/// Shape of a type
#[derive(Debug, Clone)]
pub enum Kind {
    Bool,
    Integer(IntKind),
    Number,
    String,
    /// Named fields in declaration order
    Struct(Vec<Field>),
    /// Variable-length sequence
    Seq(TypeFn),
    /// Fixed-length array
    Array(TypeFn, usize),
    Map {
        key: TypeFn,
        value: TypeFn,
    },
    /// Box, Option, Arc and friends; transparent to the walker
    Pointer(TypeFn),
    /// Any JSON value
    Dynamic,
    Channel(TypeFn),
    Function,
}

impl Kind {
    /// Lower-case kind name for messages
    pub fn describe(&self) -> &'static str {
        match self {
            Kind::Bool => "bool",
            Kind::Integer(_) => "integer",
            Kind::Number => "number",
            Kind::String => "string",
            Kind::Struct(_) => "struct",
            Kind::Seq(_) => "sequence",
            Kind::Array(..) => "array",
            Kind::Map { .. } => "map",
            Kind::Pointer(_) => "pointer",
            Kind::Dynamic => "dynamic",
            Kind::Channel(_) => "channel",
            Kind::Function => "function",
        }
    }
}

/// Integer widths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntKind {
    I8,
    I16,
    I32,
    I64,
    I128,
    Isize,
    U8,
    U16,
    U32,
    U64,
    U128,
    Usize,
}

/// Leaf types with a fixed schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WellKnown {
    /// RFC 3339 timestamp
    DateTime,
    /// Calendar date
    Date,
    Uri,
    Ipv4,
    Ipv6,
    Uuid,
}

impl WellKnown {
    pub fn schema(self) -> Schema {
        let format = match self {
            WellKnown::DateTime => "date-time",
            WellKnown::Date => "date",
            WellKnown::Uri => "uri",
            WellKnown::Ipv4 => "ipv4",
            WellKnown::Ipv6 => "ipv6",
            WellKnown::Uuid => "uuid",
        };
        SchemaObject::with_format(InstanceType::String, format).into()
    }
}

/// Optional behaviours a type opts into
#[derive(Debug, Clone, Default)]
pub struct Capabilities {
    pub custom_schema: Option<fn() -> Schema>,
    pub extend: Option<fn(&mut SchemaObject)>,
    pub alias: Option<TypeFn>,
    pub property_alias: Option<fn(&str) -> Option<Type>>,
    pub field_docs: Option<fn(&str) -> Option<String>>,
    pub dual_enum: bool,
    pub well_known: Option<WellKnown>,
}

/// A struct field
#[derive(Debug, Clone)]
pub struct Field {
    name: Cow<'static, str>,
    ty: TypeFn,
    tags: Tags,
    embedded: bool,
}

impl Field {
    /// Field named `name` of type `T`
    pub fn new<T: Reflect + ?Sized>(name: impl Into<Cow<'static, str>>) -> Self {
        Self::with_type_fn(name, Type::of::<T>)
    }

    pub fn with_type_fn(name: impl Into<Cow<'static, str>>, ty: TypeFn) -> Self {
        Self {
            name: name.into(),
            ty,
            tags: Tags::new(),
            embedded: false,
        }
    }

    #[must_use = "This method returns a new Field and does not modify self"]
    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags = tags;
        self
    }

    /// Add one annotation
    #[must_use = "This method returns a new Field and does not modify self"]
    pub fn with_tag(
        mut self,
        key: impl Into<Cow<'static, str>>,
        value: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.tags = self.tags.with(key, value);
        self
    }

    /// Mark the field as embedded; an untagged embedded struct is flattened
    #[must_use = "This method returns a new Field and does not modify self"]
    pub fn embedded(mut self) -> Self {
        self.embedded = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> Type {
        (self.ty)()
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    pub fn is_embedded(&self) -> bool {
        self.embedded
    }
}

/// Raw annotations attached to a field, keyed by annotation name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags(Vec<(Cow<'static, str>, Cow<'static, str>)>);

impl Tags {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Add or replace an annotation
    #[must_use = "This method returns a new Tags and does not modify self"]
    pub fn with(
        mut self,
        key: impl Into<Cow<'static, str>>,
        value: impl Into<Cow<'static, str>>,
    ) -> Self {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse the conventional `key:"value" other:"value"` struct-tag syntax
    ///
    /// Parsing stops at the first malformed entry; entries read so far are kept.
    /// The first occurrence of a key wins.
    pub fn parse(raw: &str) -> Self {
        let mut tags = Tags::new();
        let mut rest = raw;

        loop {
            rest = rest.trim_start_matches(' ');
            if rest.is_empty() {
                break;
            }

            let key_len = rest
                .find(|c: char| c <= ' ' || c == ':' || c == '"' || c == '\x7f')
                .unwrap_or(rest.len());
            if key_len == 0 || !rest[key_len..].starts_with(":\"") {
                break;
            }
            let key = &rest[..key_len];
            rest = &rest[key_len + 2..];

            let Some((value, remaining)) = read_quoted(rest) else {
                break;
            };
            rest = remaining;

            if tags.get(key).is_none() {
                tags.0.push((Cow::Owned(key.to_string()), Cow::Owned(value)));
            }
        }

        tags
    }
}

/// Read a double-quoted value whose opening quote was already consumed
fn read_quoted(input: &str) -> Option<(String, &str)> {
    let mut value = String::new();
    let mut chars = input.char_indices();

    while let Some((index, c)) = chars.next() {
        match c {
            '"' => return Some((value, &input[index + 1..])),
            '\\' => {
                let (_, escaped) = chars.next()?;
                value.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    other => other,
                });
            }
            other => value.push(other),
        }
    }

    None
}

//! JSON Schema document tree
//!
//! [`Schema`] is either a boolean schema or a [`SchemaObject`] holding the
//! draft 2020-12 keywords. The tree maps 1:1 onto JSON through serde:
//!
//! - `Schema::Bool(b)` serializes as the literal `b`
//! - an object schema with no keywords serializes as `true`
//! - keywords left at their empty value are omitted
//! - `extras` is flattened into the object

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};

use crate::id::Id;
use crate::properties::Properties;

/// JSON Schema dialect written to the root `$schema` keyword
pub const VERSION: &str = "https://json-schema.org/draft/2020-12/schema";

/// Named definitions collected during one generation pass (`$defs`)
pub type Definitions = BTreeMap<String, Schema>;

/// Primitive JSON instance types (`type` keyword)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceType {
    Null,
    Boolean,
    Object,
    Array,
    Number,
    String,
    Integer,
}

impl InstanceType {
    /// Parse a `type` keyword value, `None` for unknown names
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "null" => Some(Self::Null),
            "boolean" => Some(Self::Boolean),
            "object" => Some(Self::Object),
            "array" => Some(Self::Array),
            "number" => Some(Self::Number),
            "string" => Some(Self::String),
            "integer" => Some(Self::Integer),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
            Self::Number => "number",
            Self::String => "string",
            Self::Integer => "integer",
        }
    }
}

/// A schema node: boolean schema or keyword object
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    Bool(bool),
    Object(SchemaObject),
}

impl Schema {
    /// A node holding only a `$ref`
    pub fn new_ref(reference: impl Into<String>) -> Self {
        Schema::Object(SchemaObject {
            reference: Some(reference.into()),
            ..Default::default()
        })
    }

    /// `$ref` pointing into the root's `$defs`
    pub fn definition_ref(name: &str) -> Self {
        Self::new_ref(format!("#/$defs/{name}"))
    }

    pub fn as_object(&self) -> Option<&SchemaObject> {
        match self {
            Schema::Object(obj) => Some(obj),
            Schema::Bool(_) => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut SchemaObject> {
        match self {
            Schema::Object(obj) => Some(obj),
            Schema::Bool(_) => None,
        }
    }

    /// Borrow the node as an object, replacing a boolean schema with an empty object
    pub fn ensure_object(&mut self) -> &mut SchemaObject {
        match self {
            Schema::Object(obj) => obj,
            Schema::Bool(_) => {
                *self = Schema::default();
                self.ensure_object()
            }
        }
    }

    pub fn into_object(self) -> SchemaObject {
        match self {
            Schema::Object(obj) => obj,
            Schema::Bool(_) => SchemaObject::default(),
        }
    }

    /// The `$ref` of this node, if any
    pub fn reference(&self) -> Option<&str> {
        self.as_object().and_then(|obj| obj.reference.as_deref())
    }
}

impl Default for Schema {
    fn default() -> Self {
        Schema::Object(SchemaObject::default())
    }
}

impl From<SchemaObject> for Schema {
    fn from(obj: SchemaObject) -> Self {
        Schema::Object(obj)
    }
}

impl From<bool> for Schema {
    fn from(value: bool) -> Self {
        Schema::Bool(value)
    }
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Schema::Bool(value) => serializer.serialize_bool(*value),
            Schema::Object(obj) if obj.is_empty() => serializer.serialize_bool(true),
            Schema::Object(obj) => obj.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Bool(value) => Ok(Schema::Bool(value)),
            other => SchemaObject::deserialize(other)
                .map(Schema::Object)
                .map_err(serde::de::Error::custom),
        }
    }
}

/// Keyword object of a schema node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SchemaObject {
    // RFC draft-bhutton-json-schema-00 section 8 (core)
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(rename = "$id", skip_serializing_if = "Id::is_empty")]
    pub id: Id,
    #[serde(rename = "$anchor", skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(rename = "$dynamicRef", skip_serializing_if = "Option::is_none")]
    pub dynamic_ref: Option<String>,
    #[serde(rename = "$defs", skip_serializing_if = "BTreeMap::is_empty")]
    pub definitions: Definitions,
    #[serde(rename = "$comment", skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    // section 10.2 (subschemas)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<Schema>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<Schema>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<Schema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not: Option<Box<Schema>>,
    #[serde(rename = "if", skip_serializing_if = "Option::is_none")]
    pub if_schema: Option<Box<Schema>>,
    #[serde(rename = "then", skip_serializing_if = "Option::is_none")]
    pub then_schema: Option<Box<Schema>>,
    #[serde(rename = "else", skip_serializing_if = "Option::is_none")]
    pub else_schema: Option<Box<Schema>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub dependent_schemas: BTreeMap<String, Schema>,

    // section 10.3 (applicators)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub prefix_items: Vec<Schema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contains: Option<Box<Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub pattern_properties: BTreeMap<String, Schema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_names: Option<Box<Schema>>,

    // validation vocabulary, section 6
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<InstanceType>,
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,
    #[serde(rename = "const", skip_serializing_if = "Option::is_none")]
    pub const_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub unique_items: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_contains: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_contains: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_properties: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_properties: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub dependent_required: BTreeMap<String, Vec<String>>,

    // sections 7 and 8 (format, content)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_encoding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_media_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_schema: Option<Box<Schema>>,

    // section 9 (meta-data)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub read_only: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub write_only: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<Value>,

    /// Extension keywords merged into the object on the wire
    #[serde(flatten)]
    pub extras: BTreeMap<String, Value>,
}

impl SchemaObject {
    /// Node carrying only a `type` keyword
    pub fn with_type(instance_type: InstanceType) -> Self {
        Self {
            instance_type: Some(instance_type),
            ..Default::default()
        }
    }

    /// Node carrying only `type` and `format`
    pub fn with_format(instance_type: InstanceType, format: &str) -> Self {
        Self {
            instance_type: Some(instance_type),
            format: Some(format.to_string()),
            ..Default::default()
        }
    }

    /// True when no keyword is set; such a node accepts every instance
    pub fn is_empty(&self) -> bool {
        *self == SchemaObject::default()
    }

    /// Property map, created on first use
    pub fn properties_mut(&mut self) -> &mut Properties {
        self.properties.get_or_insert_with(Properties::new)
    }
}

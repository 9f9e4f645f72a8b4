//! Attribute parsing using darling.
//!
//! This module defines the attribute structures for `#[reflect(...)]`
//! attributes on containers and fields.

use darling::ast::Data;
use darling::util::Ignored;
use darling::{FromDeriveInput, FromField};
use syn::{Generics, Ident, Type};

/// Container-level attributes parsed from `#[reflect(...)]` on the struct.
///
/// Capability flags wire in a trait the type must also implement.
#[derive(Debug, FromDeriveInput)]
#[darling(
    attributes(reflect),
    supports(struct_named, struct_newtype, struct_unit)
)]
pub struct ContainerAttrs {
    /// The identifier of the type
    pub ident: Ident,

    /// Generic parameters of the type
    pub generics: Generics,

    /// Struct body
    pub data: Data<Ignored, FieldAttrs>,

    /// Display name used for `$defs`
    #[darling(default)]
    pub rename: Option<String>,

    /// The type implements `CustomSchema`
    #[darling(default)]
    pub custom_schema: bool,

    /// The type implements `ExtendSchema`
    #[darling(default)]
    pub extend: bool,

    /// The type implements `AliasSchema`
    #[darling(default)]
    pub alias: bool,

    /// The type implements `PropertyAlias`
    #[darling(default)]
    pub property_alias: bool,

    /// The type implements `FieldDocs`
    #[darling(default)]
    pub field_docs: bool,

    /// The type implements `DualEnum`
    #[darling(default)]
    pub dual_enum: bool,
}

impl ContainerAttrs {
    /// Get the schema name (renamed or original).
    pub fn schema_name(&self) -> String {
        self.rename
            .clone()
            .unwrap_or_else(|| self.ident.to_string())
    }
}

/// Field-level attributes parsed from `#[reflect(...)]` on struct fields.
#[derive(Debug, Clone, FromField)]
#[darling(attributes(reflect))]
pub struct FieldAttrs {
    /// Field identifier (None for tuple struct fields)
    pub ident: Option<Ident>,

    /// Field type
    pub ty: Type,

    /// Raw struct-tag string, e.g. `json:"id" yaml:"id"`
    #[darling(default)]
    pub tag: Option<String>,

    /// Name annotation: property name and options
    #[darling(default)]
    pub json: Option<String>,

    /// Schema keyword annotation
    #[darling(default)]
    pub jsonschema: Option<String>,

    /// Extension keyword annotation
    #[darling(default)]
    pub jsonschema_extras: Option<String>,

    /// Property description
    #[darling(default)]
    pub jsonschema_description: Option<String>,

    /// Flatten the field's struct into the parent when untagged
    #[darling(default)]
    pub embed: bool,
}

impl FieldAttrs {
    /// Explicit annotations as `(key, value)` pairs, in a fixed order.
    pub fn annotations(&self) -> Vec<(&'static str, String)> {
        [
            ("json", &self.json),
            ("jsonschema", &self.jsonschema),
            ("jsonschema_extras", &self.jsonschema_extras),
            ("jsonschema_description", &self.jsonschema_description),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.clone().map(|value| (key, value)))
        .collect()
    }
}

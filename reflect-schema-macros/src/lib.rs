//! # reflect-schema-macros
//!
//! Procedural macros for describing Rust types to `reflect-schema`.
//!
//! This crate provides the `#[derive(Reflect)]` macro, which builds the
//! type descriptor a `Reflector` walks to produce a JSON Schema.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use reflect_schema::Reflect;
//!
//! #[derive(Reflect)]
//! #[reflect(rename = "Account")]
//! struct User {
//!     #[reflect(json = "name", jsonschema = "minLength=1,maxLength=100")]
//!     name: String,
//!
//!     #[reflect(json = "email,omitempty", jsonschema = "format=email")]
//!     email: Option<String>,
//!
//!     #[reflect(embed)]
//!     audit: Audit,
//! }
//! ```
//!
//! ## Attributes
//!
//! ### Container Attributes
//!
//! - `#[reflect(rename = "Name")]` - Name used under `$defs`
//! - `#[reflect(custom_schema)]` - Use the type's `CustomSchema` impl
//! - `#[reflect(extend)]` - Apply the type's `ExtendSchema` impl
//! - `#[reflect(alias)]` - Reflect the type named by `AliasSchema`
//! - `#[reflect(property_alias)]` - Substitute property types via `PropertyAlias`
//! - `#[reflect(field_docs)]` - Describe fields via `FieldDocs`
//! - `#[reflect(dual_enum)]` - Accept a string name or integer code (`DualEnum`)
//!
//! ### Field Attributes
//!
//! - `#[reflect(json = "name,omitempty")]` - Name annotation
//! - `#[reflect(jsonschema = "k=v,...")]` - Schema keywords
//! - `#[reflect(jsonschema_extras = "k=v,...")]` - Extension keywords
//! - `#[reflect(jsonschema_description = "...")]` - Property description
//! - `#[reflect(tag = "json:\"id\" yaml:\"id\"")]` - Raw struct-tag string; explicit attributes win
//! - `#[reflect(embed)]` - Flatten the field's properties into the parent
//!
//! Named structs, unit structs and single-field tuple structs are supported.
//! The display name of a generic struct does not include its type arguments.

use proc_macro::TokenStream;
use syn::DeriveInput;

mod codegen;
mod parser;

use codegen::ImplBlockGenerator;
use parser::StructParser;

/// Derive macro implementing `reflect_schema::Reflect`.
///
/// # Example
///
/// ```rust,ignore
/// use reflect_schema::Reflect;
///
/// #[derive(Reflect)]
/// struct User {
///     name: String,
///     age: u32,
/// }
/// ```
#[proc_macro_derive(Reflect, attributes(reflect))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);

    match StructParser::parse(&input) {
        Ok(ir) => ImplBlockGenerator::generate(&ir).into(),
        Err(err) => err.write_errors().into(),
    }
}

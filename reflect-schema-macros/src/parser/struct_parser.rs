//! Struct parsing logic.
//!
//! This module turns a `DeriveInput` into a [`StructIR`]. It supports:
//! - Named structs with fields
//! - Unit structs
//! - Newtype structs, which take the shape of their inner type

use darling::ast::Style;
use darling::FromDeriveInput;
use syn::{DeriveInput, GenericParam, Generics, Ident, Type};

use crate::parser::attributes::{ContainerAttrs, FieldAttrs};

/// Shape of the derived type
#[derive(Debug, Clone)]
pub enum Shape {
    Named(Vec<FieldIR>),
    Unit,
    Newtype(Type),
}

/// One named field
#[derive(Debug, Clone)]
pub struct FieldIR {
    pub name: String,
    pub ty: Type,
    pub raw_tag: Option<String>,
    pub annotations: Vec<(&'static str, String)>,
    pub embedded: bool,
}

/// Capability traits the type opted into
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CapabilityFlags {
    pub custom_schema: bool,
    pub extend: bool,
    pub alias: bool,
    pub property_alias: bool,
    pub field_docs: bool,
    pub dual_enum: bool,
}

/// Everything the code generator needs
#[derive(Debug, Clone)]
pub struct StructIR {
    pub ident: Ident,
    pub generics: Generics,
    pub name: String,
    pub shape: Shape,
    pub capabilities: CapabilityFlags,
}

/// Parses struct definitions into [`StructIR`].
pub struct StructParser;

impl StructParser {
    pub fn parse(input: &DeriveInput) -> darling::Result<StructIR> {
        let attrs = ContainerAttrs::from_derive_input(input)?;
        Self::check_generics(&attrs.generics)?;

        let name = attrs.schema_name();
        let capabilities = CapabilityFlags {
            custom_schema: attrs.custom_schema,
            extend: attrs.extend,
            alias: attrs.alias,
            property_alias: attrs.property_alias,
            field_docs: attrs.field_docs,
            dual_enum: attrs.dual_enum,
        };

        let Some(fields) = attrs.data.take_struct() else {
            return Err(darling::Error::unsupported_shape("enum").with_span(&attrs.ident));
        };

        let shape = match fields.style {
            Style::Unit => Shape::Unit,
            Style::Tuple => {
                let mut fields = fields.fields;
                match (fields.pop(), fields.is_empty()) {
                    (Some(inner), true) => Shape::Newtype(inner.ty),
                    _ => {
                        return Err(darling::Error::unsupported_shape("tuple")
                            .with_span(&attrs.ident))
                    }
                }
            }
            Style::Struct => {
                let mut errors = darling::Error::accumulator();
                let fields = fields
                    .fields
                    .into_iter()
                    .filter_map(|field| errors.handle(Self::parse_field(field)))
                    .collect();
                errors.finish()?;
                Shape::Named(fields)
            }
        };

        Ok(StructIR {
            ident: attrs.ident,
            generics: attrs.generics,
            name,
            shape,
            capabilities,
        })
    }

    fn parse_field(field: FieldAttrs) -> darling::Result<FieldIR> {
        let annotations = field.annotations();
        let Some(ident) = field.ident else {
            return Err(darling::Error::custom("field has no identifier"));
        };

        Ok(FieldIR {
            name: ident.to_string().trim_start_matches("r#").to_string(),
            ty: field.ty,
            raw_tag: field.tag,
            annotations,
            embedded: field.embed,
        })
    }

    /// Descriptors are `'static`; lifetime and const parameters are rejected.
    fn check_generics(generics: &Generics) -> darling::Result<()> {
        let mut errors = darling::Error::accumulator();
        for param in &generics.params {
            match param {
                GenericParam::Type(_) => {}
                GenericParam::Lifetime(lifetime) => errors.push(
                    darling::Error::custom("Reflect cannot be derived for types with lifetime parameters")
                        .with_span(lifetime),
                ),
                GenericParam::Const(param) => errors.push(
                    darling::Error::custom("Reflect cannot be derived for types with const parameters")
                        .with_span(param),
                ),
            }
        }
        errors.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_parse_named_struct() {
        let input: DeriveInput = parse_quote! {
            struct User {
                #[reflect(json = "id")]
                id: u64,
                #[reflect(embed)]
                base: Base,
                r#type: String,
            }
        };

        let ir = StructParser::parse(&input).unwrap();
        assert_eq!(ir.name, "User");
        let Shape::Named(fields) = ir.shape else {
            panic!("expected named fields");
        };
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].annotations, vec![("json", "id".to_string())]);
        assert!(fields[1].embedded);
        assert_eq!(fields[2].name, "type");
    }

    #[test]
    fn test_parse_newtype() {
        let input: DeriveInput = parse_quote! {
            #[reflect(rename = "UserId")]
            struct Id(u64);
        };

        let ir = StructParser::parse(&input).unwrap();
        assert_eq!(ir.name, "UserId");
        assert!(matches!(ir.shape, Shape::Newtype(_)));
    }

    #[test]
    fn test_parse_unit_and_flags() {
        let input: DeriveInput = parse_quote! {
            #[reflect(custom_schema, dual_enum)]
            struct Marker;
        };

        let ir = StructParser::parse(&input).unwrap();
        assert!(matches!(ir.shape, Shape::Unit));
        assert!(ir.capabilities.custom_schema);
        assert!(ir.capabilities.dual_enum);
        assert!(!ir.capabilities.extend);
    }

    #[test]
    fn test_lifetimes_are_rejected() {
        let input: DeriveInput = parse_quote! {
            struct Borrowed<'a> {
                name: &'a str,
            }
        };

        assert!(StructParser::parse(&input).is_err());
    }
}

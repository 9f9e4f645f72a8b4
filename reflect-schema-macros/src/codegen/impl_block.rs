//! Impl block generation for the `Reflect` trait.
//!
//! This module generates the `impl Reflect for Type` blocks that are
//! emitted by the derive macro.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{parse_quote, Generics};

use crate::parser::{CapabilityFlags, FieldIR, Shape, StructIR};

/// Generates the impl block for the `Reflect` trait.
pub struct ImplBlockGenerator;

impl ImplBlockGenerator {
    /// Generate the complete `impl Reflect` block for a struct.
    pub fn generate(ir: &StructIR) -> TokenStream {
        let ident = &ir.ident;
        let generics = Self::bounded_generics(&ir.generics);
        let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

        let name = &ir.name;
        let info = Self::generate_info(&ir.shape);
        let capabilities = Self::generate_capabilities(ir.capabilities);

        quote! {
            impl #impl_generics ::reflect_schema::Reflect for #ident #ty_generics #where_clause {
                fn type_info() -> ::reflect_schema::TypeInfo {
                    #info
                        .with_name(#name)
                        .with_module_path(::core::module_path!())
                        #capabilities
                }
            }
        }
    }

    /// Expression building the unnamed `TypeInfo` for the shape.
    fn generate_info(shape: &Shape) -> TokenStream {
        match shape {
            Shape::Unit => quote! {
                ::reflect_schema::TypeInfo::of::<Self>(
                    ::reflect_schema::Kind::Struct(::std::vec::Vec::new())
                )
            },
            Shape::Named(fields) => {
                let fields = fields.iter().map(Self::generate_field);
                quote! {
                    ::reflect_schema::TypeInfo::of::<Self>(
                        ::reflect_schema::Kind::Struct(::std::vec![#(#fields),*])
                    )
                }
            }
            // A newtype shares its inner type's shape and leaf schema.
            Shape::Newtype(inner) => quote! {
                ({
                    let inner = ::reflect_schema::Type::of::<#inner>();
                    let info = ::reflect_schema::TypeInfo::of::<Self>(inner.kind().clone());
                    match inner.capabilities().well_known {
                        ::core::option::Option::Some(well_known) => info.with_well_known(well_known),
                        ::core::option::Option::None => info,
                    }
                })
            },
        }
    }

    fn generate_field(field: &FieldIR) -> TokenStream {
        let name = &field.name;
        let ty = &field.ty;

        let tags = match &field.raw_tag {
            Some(raw) => quote! { ::reflect_schema::Tags::parse(#raw) },
            None => quote! { ::reflect_schema::Tags::new() },
        };
        let annotations = field
            .annotations
            .iter()
            .map(|(key, value)| quote! { .with(#key, #value) });
        let embedded = field.embedded.then(|| quote! { .embedded() });

        quote! {
            ::reflect_schema::Field::new::<#ty>(#name)
                .with_tags(#tags #(#annotations)*)
                #embedded
        }
    }

    fn generate_capabilities(flags: CapabilityFlags) -> TokenStream {
        let mut tokens = TokenStream::new();
        if flags.custom_schema {
            tokens.extend(quote! { .with_custom_schema::<Self>() });
        }
        if flags.extend {
            tokens.extend(quote! { .with_extend::<Self>() });
        }
        if flags.alias {
            tokens.extend(quote! { .with_alias::<Self>() });
        }
        if flags.property_alias {
            tokens.extend(quote! { .with_property_alias::<Self>() });
        }
        if flags.field_docs {
            tokens.extend(quote! { .with_field_docs::<Self>() });
        }
        if flags.dual_enum {
            tokens.extend(quote! { .with_dual_enum::<Self>() });
        }
        tokens
    }

    /// Add a `Reflect` bound to every type parameter.
    fn bounded_generics(generics: &Generics) -> Generics {
        let mut generics = generics.clone();
        for param in generics.type_params_mut() {
            param.bounds.push(parse_quote!(::reflect_schema::Reflect));
        }
        generics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::StructParser;
    use syn::DeriveInput;

    fn generate(input: DeriveInput) -> String {
        let ir = StructParser::parse(&input).unwrap();
        ImplBlockGenerator::generate(&ir).to_string()
    }

    #[test]
    fn test_named_struct_impl() {
        let code = generate(parse_quote! {
            struct User {
                #[reflect(json = "name,omitempty")]
                name: String,
            }
        });

        assert!(code.contains("impl :: reflect_schema :: Reflect for User"));
        assert!(code.contains("Field :: new :: < String > (\"name\")"));
        assert!(code.contains(". with (\"json\" , \"name,omitempty\")"));
        assert!(code.contains(". with_name (\"User\")"));
    }

    #[test]
    fn test_raw_tag_is_parsed_at_runtime() {
        let code = generate(parse_quote! {
            struct User {
                #[reflect(tag = "yaml:\"user_name\"")]
                name: String,
            }
        });

        assert!(code.contains("Tags :: parse"));
    }

    #[test]
    fn test_generic_params_are_bounded() {
        let code = generate(parse_quote! {
            struct Page<T> {
                items: Vec<T>,
            }
        });

        assert!(code.contains("impl < T : :: reflect_schema :: Reflect >"));
        assert!(code.contains("for Page < T >"));
    }

    #[test]
    fn test_capabilities() {
        let code = generate(parse_quote! {
            #[reflect(extend, field_docs)]
            struct User;
        });

        assert!(code.contains("with_extend :: < Self >"));
        assert!(code.contains("with_field_docs :: < Self >"));
        assert!(!code.contains("with_custom_schema"));
    }
}

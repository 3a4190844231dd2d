//! Derive macro for jsonmap records
//!
//! `#[derive(Record)]` builds the static field table of a struct and the
//! per-position field accessors the transcoder calls, replacing runtime
//! reflection over field metadata.

extern crate proc_macro;

mod attributes;

use attributes::{parse_field, FieldKind, FieldSpec};
use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields};

/// `#[derive(Record)]`: implements `jsonmap_core::Record` and its shape traits
///
/// Field options, inside `#[jsonmap(...)]`:
/// - `rename = "wire"`: key in the JSON object (defaults to the field name)
/// - `map = "0:dog;1:cat"`: substitute the value through a table
/// - `nested` (or `map = ""`): transcode the value as a record
/// - `skip`: leave the field out entirely
///
/// Example:
/// ```ignore
/// use jsonmap_core::Record;
///
/// #[derive(Default, Record)]
/// struct Animal {
///     name: String,
///     #[jsonmap(rename = "type", map = "0:dog;1:cat;2:cow;3:others")]
///     kind: u8,
///     #[jsonmap(nested)]
///     owner: Option<Owner>,
/// }
/// ```
#[proc_macro_derive(Record, attributes(jsonmap))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input).unwrap_or_else(syn::Error::into_compile_error).into()
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let record_name = name.to_string();

    if !input.generics.params.is_empty() || input.generics.where_clause.is_some() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Record cannot be derived for generic structs",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(f) => &f.named,
            _ => return Err(syn::Error::new_spanned(input, "Only named fields are supported")),
        },
        _ => return Err(syn::Error::new_spanned(input, "Only structs are supported")),
    };

    let mut specs = Vec::new();
    for field in fields {
        if let Some(spec) = parse_field(field)? {
            if let Some(previous) = specs.iter().find(|s: &&FieldSpec| s.wire_name == spec.wire_name) {
                return Err(syn::Error::new_spanned(
                    field,
                    format!("wire name `{}` is already used by `{}`", spec.wire_name, previous.ident),
                ));
            }
            specs.push(spec);
        }
    }

    let descriptors = specs.iter().map(|spec| {
        let wire = &spec.wire_name;
        let substitution = match &spec.kind {
            FieldKind::Direct => quote! { ::core::option::Option::None },
            FieldKind::Nested => quote! { ::core::option::Option::Some("") },
            FieldKind::Enumerated(map) => quote! { ::core::option::Option::Some(#map) },
        };
        quote! { ::jsonmap_core::FieldDescriptor::new(#wire, #substitution) }
    });

    let encode_arms = specs.iter().enumerate().map(|(position, spec)| {
        let ident = &spec.ident;
        let helper = match spec.kind {
            FieldKind::Direct => quote! { encode_direct },
            FieldKind::Nested => quote! { encode_nested },
            FieldKind::Enumerated(_) => quote! { encode_enumerated },
        };
        quote! { #position => ::jsonmap_core::field::#helper(mapper, field, &self.#ident), }
    });

    let decode_arms = specs.iter().enumerate().map(|(position, spec)| {
        let ident = &spec.ident;
        let helper = match spec.kind {
            FieldKind::Direct => quote! { decode_direct },
            FieldKind::Nested => quote! { decode_nested },
            FieldKind::Enumerated(_) => quote! { decode_enumerated },
        };
        quote! { #position => ::jsonmap_core::field::#helper(mapper, field, wire, &mut self.#ident), }
    });

    let swap_arms = specs.iter().enumerate().map(|(position, spec)| {
        let ident = &spec.ident;
        quote! { #position => ::core::mem::swap(&mut self.#ident, &mut other.#ident), }
    });

    Ok(quote! {
        impl ::jsonmap_core::Record for #name {
            fn descriptor() -> &'static ::jsonmap_core::RecordDescriptor {
                static DESCRIPTOR: ::std::sync::OnceLock<::jsonmap_core::RecordDescriptor> =
                    ::std::sync::OnceLock::new();
                DESCRIPTOR.get_or_init(|| {
                    ::jsonmap_core::RecordDescriptor::new(#record_name, ::std::vec![#(#descriptors),*])
                })
            }

            #[allow(unused_variables)]
            fn encode_field(
                &self,
                mapper: &mut ::jsonmap_core::Mapper,
                field: &::jsonmap_core::FieldDescriptor,
            ) -> ::jsonmap_core::Result<::jsonmap_core::serde_json::Value> {
                match field.position() {
                    #(#encode_arms)*
                    _ => ::core::result::Result::Err(::jsonmap_core::Error::unknown_field(field)),
                }
            }

            #[allow(unused_variables)]
            fn decode_field(
                &mut self,
                mapper: &mut ::jsonmap_core::Mapper,
                field: &::jsonmap_core::FieldDescriptor,
                wire: &::jsonmap_core::serde_json::Value,
            ) -> ::jsonmap_core::Result<()> {
                match field.position() {
                    #(#decode_arms)*
                    _ => ::core::result::Result::Err(::jsonmap_core::Error::unknown_field(field)),
                }
            }

            #[allow(unused_variables, unreachable_code)]
            fn swap_field(
                &mut self,
                other: &mut Self,
                field: &::jsonmap_core::FieldDescriptor,
            ) -> ::jsonmap_core::Result<()> {
                match field.position() {
                    #(#swap_arms)*
                    _ => return ::core::result::Result::Err(::jsonmap_core::Error::unknown_field(field)),
                }
                ::core::result::Result::Ok(())
            }
        }

        ::jsonmap_core::record_shapes!(#name);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_expands_named_struct() {
        let input: DeriveInput = parse_quote! {
            struct Animal {
                name: String,
                #[jsonmap(rename = "type", map = "0:dog;1:cat")]
                kind: u8,
                #[jsonmap(skip)]
                scratch: u32,
            }
        };

        let tokens = expand(&input).unwrap().to_string();
        assert!(tokens.contains("encode_enumerated"));
        assert!(tokens.contains("\"0:dog;1:cat\""));
        assert!(tokens.contains("record_shapes"));
        assert!(!tokens.contains("scratch"));
    }

    #[test]
    fn test_rejects_generics() {
        let input: DeriveInput = parse_quote! { struct Wrapper<T> { inner: T } };
        let err = expand(&input).unwrap_err();
        assert!(err.to_string().contains("generic"));
    }

    #[test]
    fn test_rejects_tuple_structs_and_enums() {
        let input: DeriveInput = parse_quote! { struct Pair(u8, u8); };
        assert!(expand(&input).is_err());

        let input: DeriveInput = parse_quote! { enum Kind { Dog, Cat } };
        assert!(expand(&input).is_err());
    }

    #[test]
    fn test_rejects_duplicate_wire_names() {
        let input: DeriveInput = parse_quote! {
            struct Animal {
                kind: u8,
                #[jsonmap(rename = "kind")]
                other: u8,
            }
        };
        let err = expand(&input).unwrap_err();
        assert!(err.to_string().contains("already used"));
    }
}

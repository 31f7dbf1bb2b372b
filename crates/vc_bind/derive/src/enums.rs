//! `#[derive(Bean)]` on enums with unit variants.

use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{DataEnum, Fields};

use crate::attributes::{TypeAttributes, VariantAttributes};
use crate::generics::TypeParams;

/// Returns the body of `Bindable::type_meta`.
pub(crate) fn type_meta_body(
    data: &DataEnum,
    attrs: &TypeAttributes,
    params: &TypeParams,
    bind: &syn::Path,
) -> syn::Result<TokenStream> {
    if data.variants.is_empty() {
        return Err(syn::Error::new(
            data.brace_token.span.join(),
            "enums without variants are not supported",
        ));
    }
    if !attrs.creators.is_empty()
        || !attrs.factories.is_empty()
        || !attrs.getters.is_empty()
        || !attrs.setters.is_empty()
    {
        return Err(syn::Error::new(
            data.enum_token.span,
            "creators and methods are only supported on structs",
        ));
    }

    let mut variants = Vec::new();
    let mut idents = Vec::new();
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "only unit variants are supported",
            ));
        }
        let variant_attrs = VariantAttributes::parse_attrs(&variant.attrs)?;
        let name = variant.ident.unraw().to_string();
        let value = variant_attrs
            .rename
            .as_ref()
            .map(|value| quote! { .with_value(#value) });
        let custom = variant_attrs.custom.with_attribute_calls();
        let attributes = (!custom.is_empty()).then(|| {
            quote! { .with_attributes(#bind::members::Attributes::new() #custom) }
        });
        variants.push(quote! {
            #bind::registry::EnumVariant::new(#name) #value #attributes
        });
        idents.push(&variant.ident);
    }

    let indices = 0..idents.len();
    let index_of = quote! {
        |value: &dyn ::core::any::Any| -> ::core::option::Option<usize> {
            match value.downcast_ref::<Self>()? {
                #(Self::#idents => ::core::option::Option::Some(#indices),)*
            }
        }
    };
    let indices = 0..idents.len();
    let from_index = quote! {
        |index: usize| -> ::core::option::Option<#bind::__macro_exports::Box<dyn ::core::any::Any>> {
            match index {
                #(#indices => ::core::option::Option::Some(
                    #bind::__macro_exports::Box::new(Self::#idents)
                        as #bind::__macro_exports::Box<dyn ::core::any::Any>,
                ),)*
                _ => ::core::option::Option::None,
            }
        }
    };

    let declaration_params = params.declaration_params(bind);
    let default = attrs
        .default
        .then(|| quote! { .with_default::<Self>() });
    let custom = attrs.custom.with_attribute_calls();

    Ok(quote! {
        let ops = #bind::registry::EnumOps::new(
            #bind::__macro_exports::Vec::from([#(#variants),*]),
            #index_of,
            #from_index,
        );
        #bind::registry::TypeMeta::of::<Self>(#bind::registry::TypeShape::Enum(ops))
            .with_declaration(
                #bind::types::GenericDecl::new(
                    <Self as #bind::registry::Bindable>::type_descriptor().raw(),
                )
                #declaration_params
            )
            #default
            #custom
    })
}

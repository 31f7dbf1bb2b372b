//! See [`Bean`].
#![allow(clippy::std_instead_of_core, reason = "proc-macro lib")]
#![allow(clippy::std_instead_of_alloc, reason = "proc-macro lib")]

use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, parse_macro_input, parse_quote};

static BIND_ATTRIBUTE_NAME: &str = "bind";

// -----------------------------------------------------------------------------
// Modules

mod attributes;
mod auto_register;
mod bean;
mod enums;
mod generics;
mod manifest;

use attributes::TypeAttributes;
use generics::TypeParams;

// -----------------------------------------------------------------------------
// Macros

/// # Bean Derivation
///
/// `#[derive(Bean)]` implements `Bindable` for:
///
/// - structs with named fields, and unit structs, as beans,
/// - enums with unit variants only, written as strings.
///
/// Type parameters are bound by `Bindable`, and the type by `Default` when
/// `default` is set. Lifetime and const parameters are not supported.
///
/// ## Members
///
/// Every named field becomes a readable and writable member. Fields are
/// public members only when declared `pub`, otherwise they are included
/// only if a resolver decides so, or if the engine includes private members.
///
/// ```rust, ignore
/// #[derive(Bean)]
/// pub struct User {
///     pub name: String,
///     #[bind(rename = "mail", alias = "email")]
///     pub address: String,
///     #[bind(skip)]
///     pub session: u64,
///     #[bind(skip_serializing)]
///     pub password: String,
///     #[bind(include)]
///     created: u64,
/// }
/// ```
///
/// Field attributes:
///
/// - `rename = "name"`: The property name.
/// - `alias = "name"`: Another name accepted when deserializing, repeatable.
/// - `skip`: Excludes the field.
/// - `skip_serializing` / `skip_deserializing`: Excludes one direction.
/// - `include`: Includes a non-public field.
/// - `adapter = expr`: A per-property `Adapter`.
/// - `extends`: The field embeds the supertype, whose members are inherited.
/// - `@expr`: Any typed attribute, e.g. `@XmlTransient`.
///
/// Getters and setters are declared at the type level:
///
/// ```rust, ignore
/// #[derive(Bean)]
/// #[bind(getter(total = Self::total), setter(total = Self::set_total))]
/// pub struct Cart { /* ... */ }
/// ```
///
/// ## Creation
///
/// - `default`: Creates the value through `Default`, then assigns properties.
/// - `creator(path, names..)`: A constructor, e.g. `creator(Self::new, "x", _)`.
///   Names bind parameters to properties, `_` or missing names bind by position.
/// - `factory(path, names..)`: Same, declared as a factory function.
///
/// Without any of them, a memberwise creator taking every field is
/// generated, unless a field is skipped, embeds a supertype, or there are
/// more than eight fields.
///
/// ## Other type attributes
///
/// - `root = "name"`: The name used when root values are wrapped.
/// - `crate = path`: The path of `vc_bind`, when it cannot be found from
///   `Cargo.toml`.
/// - `auto_register`: Registers the type in `TypeRegistry::auto_register`.
///   No effect on generic types, or without the `auto_register` feature.
/// - `@expr`: Any typed attribute, e.g. `@XmlAccessorType(XmlAccessType::Field)`.
///
/// ## Enums
///
/// ```rust, ignore
/// #[derive(Bean, Default)]
/// #[bind(default)]
/// pub enum Status {
///     #[default]
///     Active,
///     #[bind(rename = "on-hold")]
///     OnHold,
/// }
/// ```
#[proc_macro_derive(Bean, attributes(bind))]
pub fn derive_bean(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    match impl_bean(&ast) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}

fn impl_bean(ast: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let attrs = TypeAttributes::parse_attrs(&ast.attrs)?;
    let bind = match &attrs.crate_path {
        Some(path) => path.clone(),
        None => manifest::vc_bind(),
    };
    let params = TypeParams::new(&ast.generics)?;
    let ident = &ast.ident;

    let type_meta = match &ast.data {
        Data::Struct(data) => bean::type_meta_body(data, &attrs, &params, &bind)?,
        Data::Enum(data) => enums::type_meta_body(data, &attrs, &params, &bind)?,
        Data::Union(data) => {
            return Err(syn::Error::new(
                data.union_token.span,
                "unions are not supported",
            ));
        }
    };
    let type_descriptor = generics::type_descriptor_body(ident, &params, &bind);
    let auto_register = auto_register::auto_register_impl(ident, &attrs, &params, &bind);

    let mut generics = params.bounded(&ast.generics, &bind);
    if attrs.default && params.is_generic() {
        let (_, ty_generics, _) = ast.generics.split_for_impl();
        generics
            .make_where_clause()
            .predicates
            .push(parse_quote! { #ident #ty_generics: ::core::default::Default });
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics #bind::registry::Bindable for #ident #ty_generics #where_clause {
            fn type_descriptor() -> #bind::types::TypeDescriptor {
                #type_descriptor
            }

            fn type_meta() -> #bind::registry::TypeMeta {
                #type_meta
            }
        }

        #auto_register
    })
}

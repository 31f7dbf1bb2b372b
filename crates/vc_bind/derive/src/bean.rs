//! `#[derive(Bean)]` on structs with named fields.

use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use syn::ext::IdentExt;
use syn::{DataStruct, Fields, Ident, Type};

use crate::attributes::{CreatorAttr, FieldAttributes, TypeAttributes};
use crate::generics::TypeParams;

/// Memberwise creators take at most this many arguments.
const MAX_MEMBERWISE_PARAMS: usize = 8;

struct BeanField<'a> {
    ident: &'a Ident,
    ty: &'a Type,
    public: bool,
    attrs: FieldAttributes,
}

impl BeanField<'_> {
    fn name(&self) -> String {
        self.ident.unraw().to_string()
    }
}

fn parse_fields(data: &DataStruct) -> syn::Result<Vec<BeanField<'_>>> {
    match &data.fields {
        Fields::Named(named) => named
            .named
            .iter()
            .map(|field| {
                Ok(BeanField {
                    // Named fields always have an ident.
                    ident: field.ident.as_ref().ok_or_else(|| {
                        syn::Error::new_spanned(field, "expected a named field")
                    })?,
                    ty: &field.ty,
                    public: matches!(field.vis, syn::Visibility::Public(_)),
                    attrs: FieldAttributes::parse_attrs(&field.attrs)?,
                })
            })
            .collect(),
        Fields::Unit => Ok(Vec::new()),
        Fields::Unnamed(unnamed) => Err(syn::Error::new_spanned(
            unnamed,
            "tuple structs are not supported, use named fields",
        )),
    }
}

fn member_tokens(field: &BeanField<'_>, params: &TypeParams, bind: &syn::Path) -> TokenStream {
    let BeanField { ident, ty, .. } = field;
    let name = field.name();

    let base = if params.is_generic() {
        let declared = params.declared_arg(ty, bind);
        quote! {
            #bind::members::Member::new(
                #name,
                #bind::members::MemberKind::Field,
                #declared,
                ::core::option::Option::Some(
                    #bind::members::Accessor::field::<Self, #ty>(|this| &this.#ident),
                ),
                ::core::option::Option::Some(
                    #bind::members::Mutator::field::<Self, #ty>(|this| &mut this.#ident),
                ),
            )
        }
    } else {
        quote! {
            #bind::members::Member::field::<Self, #ty>(
                #name,
                |this| &this.#ident,
                |this| &mut this.#ident,
            )
        }
    };

    let visibility = if field.public {
        quote! { #bind::members::Visibility::Public }
    } else {
        quote! { #bind::members::Visibility::Private }
    };

    let attrs = &field.attrs;
    let ignore = attrs
        .skip
        .then(|| quote! { .with_attribute(#bind::members::Ignore) });
    let options = attrs.has_property_options().then(|| {
        let rename = attrs.rename.iter();
        let aliases = &attrs.aliases;
        let serialize = !attrs.skip_serializing;
        let deserialize = !attrs.skip_deserializing;
        quote! {
            .with_attribute(
                #bind::members::PropertyOptions::new()
                    #(.rename(#rename))*
                    #(.alias(#aliases))*
                    .serialize(#serialize)
                    .deserialize(#deserialize)
            )
        }
    });
    let adapter = attrs
        .adapter
        .as_ref()
        .map(|adapter| quote! { .with_attribute(#bind::convert::PropertyAdapter::new(#adapter)) });
    let custom = attrs.custom.with_attribute_calls();

    quote! {
        #base
            .with_visibility(#visibility)
            #ignore
            #options
            #adapter
            #custom
    }
}

fn creator_tokens(kind: &str, creator: &CreatorAttr, bind: &syn::Path) -> TokenStream {
    let name = creator.name();
    let func = &creator.func;
    let ctor = match kind {
        "factory" => quote! { #bind::members::Creator::factory },
        _ => quote! { #bind::members::Creator::constructor },
    };
    let names = if creator.names.is_empty() {
        None
    } else {
        let names = creator.names.iter().map(|name| match name {
            Some(name) => quote! { ::core::option::Option::Some(#name) },
            None => quote! { ::core::option::Option::None },
        });
        Some(quote! { .with_param_names([#(#names),*]) })
    };
    quote! { #ctor(#name, #func) #names }
}

fn memberwise_tokens(fields: &[BeanField<'_>], bind: &syn::Path) -> Option<TokenStream> {
    if fields.len() > MAX_MEMBERWISE_PARAMS
        || fields.iter().any(|field| field.attrs.blocks_memberwise())
    {
        return None;
    }
    let idents: Vec<&Ident> = fields.iter().map(|field| field.ident).collect();
    let tys = fields.iter().map(|field| field.ty);
    let names = fields.iter().map(BeanField::name);
    Some(quote! {
        #bind::members::Creator::memberwise(|#(#idents: #tys),*| Self { #(#idents),* })
            .with_param_names([#(::core::option::Option::Some(#names)),*])
    })
}

/// Returns the body of `Bindable::type_meta`.
pub(crate) fn type_meta_body(
    data: &DataStruct,
    attrs: &TypeAttributes,
    params: &TypeParams,
    bind: &syn::Path,
) -> syn::Result<TokenStream> {
    let fields = parse_fields(data)?;

    let mut members = Vec::new();
    let mut supertypes = Vec::new();
    let mut dependencies: Vec<&Type> = Vec::new();
    for field in &fields {
        let ty = field.ty;
        if !dependencies
            .iter()
            .any(|known| known.to_token_stream().to_string() == ty.to_token_stream().to_string())
        {
            dependencies.push(ty);
        }
        if field.attrs.extends.is_some() {
            let ident = field.ident;
            let template = params.declared_descriptor(ty, bind);
            supertypes.push(quote! {
                .with_supertype(#bind::types::Supertype::new(
                    #template,
                    #bind::types::Upcast::new::<Self, #ty>(|this| &this.#ident, |this| &mut this.#ident),
                ))
            });
        } else {
            members.push(member_tokens(field, params, bind));
        }
    }

    for getter in &attrs.getters {
        let (name, func) = (&getter.name, &getter.func);
        members.push(quote! { #bind::members::Member::getter::<Self, _>(#name, #func) });
    }
    for setter in &attrs.setters {
        let (name, func) = (&setter.name, &setter.func);
        members.push(quote! { #bind::members::Member::setter::<Self, _>(#name, #func) });
    }

    let mut creators: Vec<TokenStream> = attrs
        .creators
        .iter()
        .map(|creator| creator_tokens("constructor", creator, bind))
        .chain(
            attrs
                .factories
                .iter()
                .map(|factory| creator_tokens("factory", factory, bind)),
        )
        .collect();
    if !attrs.has_explicit_creation()
        && let Some(memberwise) = memberwise_tokens(&fields, bind)
    {
        creators.push(memberwise);
    }

    let declaration_params = params.declaration_params(bind);
    let default = attrs
        .default
        .then(|| quote! { .with_default::<Self>() });
    let root = attrs
        .root
        .as_ref()
        .map(|root| quote! { .with_attribute(#bind::members::RootName(#root)) });
    let custom = attrs.custom.with_attribute_calls();

    Ok(quote! {
        let decl = #bind::members::BeanDecl::new()
            #(.with_member(#members))*
            #(.with_creator(#creators))*;
        let declaration = #bind::types::GenericDecl::new(
            <Self as #bind::registry::Bindable>::type_descriptor().raw(),
        )
            #declaration_params
            #(#supertypes)*;
        #bind::registry::TypeMeta::of::<Self>(#bind::registry::TypeShape::Bean(decl))
            .with_declaration(declaration)
            #default
            #root
            #custom
            #(.with_dependency::<#dependencies>())*
    })
}

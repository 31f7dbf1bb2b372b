//! Type parameters, descriptors and declared member types.

use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use syn::{GenericArgument, GenericParam, Generics, Ident, PathArguments, Type, parse_quote};

/// The type parameters of the derived type.
pub(crate) struct TypeParams {
    names: Vec<Ident>,
}

impl TypeParams {
    /// Collects the type parameters, rejecting lifetimes and const generics.
    pub fn new(generics: &Generics) -> syn::Result<Self> {
        let mut names = Vec::new();
        for param in &generics.params {
            match param {
                GenericParam::Type(param) => names.push(param.ident.clone()),
                GenericParam::Lifetime(param) => {
                    return Err(syn::Error::new_spanned(
                        param,
                        "bindable types must be `'static`, lifetime parameters are not supported",
                    ));
                }
                GenericParam::Const(param) => {
                    return Err(syn::Error::new_spanned(
                        param,
                        "const parameters are not supported",
                    ));
                }
            }
        }
        Ok(Self { names })
    }

    #[inline]
    pub fn is_generic(&self) -> bool {
        !self.names.is_empty()
    }

    /// Adds `T: Bindable` for every type parameter.
    pub fn bounded(&self, generics: &Generics, bind: &syn::Path) -> Generics {
        let mut generics = generics.clone();
        let where_clause = generics.make_where_clause();
        for name in &self.names {
            where_clause
                .predicates
                .push(parse_quote! { #name: #bind::registry::Bindable });
        }
        generics
    }

    fn position(&self, ty: &Type) -> Option<&Ident> {
        let Type::Path(path) = ty else {
            return None;
        };
        if path.qself.is_some() {
            return None;
        }
        let ident = path.path.get_ident()?;
        self.names.iter().find(|name| *name == ident)
    }

    fn mentions(&self, ty: &Type) -> bool {
        let tokens = ty.to_token_stream().to_string();
        self.names.iter().any(|name| {
            tokens
                .split(|c: char| !c.is_alphanumeric() && c != '_')
                .any(|word| word == name.to_string())
        })
    }

    /// `GenericDecl` parameters, `.with_param(TypeParam::new("T"))` each.
    pub fn declaration_params(&self, bind: &syn::Path) -> TokenStream {
        let names = self.names.iter().map(ToString::to_string);
        quote! { #(.with_param(#bind::types::TypeParam::new(#names)))* }
    }

    /// The descriptor arguments of the concrete type.
    pub fn descriptor_args(&self, bind: &syn::Path) -> TokenStream {
        let names = &self.names;
        quote! {
            [#(#bind::types::TypeArg::Type(<#names as #bind::registry::Bindable>::type_descriptor())),*]
        }
    }

    /// A `TypeArg` for `ty` written in terms of the parameters.
    ///
    /// A bare parameter becomes a variable, a path or array mentioning one
    /// gets its arguments replaced. Other types are concrete.
    pub fn declared_arg(&self, ty: &Type, bind: &syn::Path) -> TokenStream {
        if let Some(name) = self.position(ty) {
            let name = name.to_string();
            return quote! { #bind::types::TypeArg::var(#name) };
        }
        let descriptor = self.declared_descriptor(ty, bind);
        quote! { #bind::types::TypeArg::Type(#descriptor) }
    }

    /// A `TypeDescriptor` for `ty` written in terms of the parameters.
    pub fn declared_descriptor(&self, ty: &Type, bind: &syn::Path) -> TokenStream {
        let concrete = quote! { <#ty as #bind::registry::Bindable>::type_descriptor() };
        if !self.mentions(ty) {
            return concrete;
        }
        let args: Vec<&Type> = match ty {
            Type::Path(path) if path.qself.is_none() => {
                match path.path.segments.last().map(|segment| &segment.arguments) {
                    Some(PathArguments::AngleBracketed(args)) => args
                        .args
                        .iter()
                        .filter_map(|arg| match arg {
                            GenericArgument::Type(ty) => Some(ty),
                            _ => None,
                        })
                        .collect(),
                    _ => Vec::new(),
                }
            }
            Type::Array(array) => vec![&*array.elem],
            _ => Vec::new(),
        };
        if args.is_empty() {
            return concrete;
        }
        let len = args.len();
        let args = args.into_iter().map(|arg| self.declared_arg(arg, bind));
        quote! {{
            let concrete = #concrete;
            if concrete.args().len() == #len {
                concrete.with_args([#(#args),*])
            } else {
                concrete
            }
        }}
    }
}

/// The raw path string of the derived type, `module::Name`.
pub(crate) fn raw_path(ident: &Ident) -> TokenStream {
    let name = ident.to_string();
    quote! { ::core::concat!(::core::module_path!(), "::", #name) }
}

/// The body of `Bindable::type_descriptor`.
pub(crate) fn type_descriptor_body(
    ident: &Ident,
    params: &TypeParams,
    bind: &syn::Path,
) -> TokenStream {
    let raw_path = raw_path(ident);
    let name = ident.to_string();
    let raw = quote! { #bind::types::RawType::new(#raw_path, #name) };
    if params.is_generic() {
        let args = params.descriptor_args(bind);
        quote! {
            static CELL: #bind::impls::GenericDescriptorCell = #bind::impls::GenericDescriptorCell::new();
            CELL.get_or_insert::<Self>(|| {
                #bind::types::TypeDescriptor::concrete::<Self>(#raw, #args, #bind::types::Shape::Plain)
            })
        }
    } else {
        quote! {
            static CELL: #bind::impls::NonGenericDescriptorCell = #bind::impls::NonGenericDescriptorCell::new();
            CELL.get_or_init(|| {
                #bind::types::TypeDescriptor::concrete::<Self>(#raw, [], #bind::types::Shape::Plain)
            })
        }
    }
}

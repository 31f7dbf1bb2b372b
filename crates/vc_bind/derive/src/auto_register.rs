use proc_macro2::TokenStream;
use syn::Ident;

use crate::attributes::TypeAttributes;
use crate::generics::TypeParams;

/// Submits the registration of `ident` when `#[bind(auto_register)]` is set.
///
/// Generic types are skipped, their instantiations are unknown here.
#[cfg(feature = "auto_register")]
pub(crate) fn auto_register_impl(
    ident: &Ident,
    attrs: &TypeAttributes,
    params: &TypeParams,
    bind: &syn::Path,
) -> TokenStream {
    use quote::quote_spanned;

    match attrs.auto_register {
        Some(span) if !params.is_generic() => quote_spanned! { span =>
            #bind::__macro_exports::auto_register::inventory::submit! {
                #bind::__macro_exports::auto_register::__AutoRegisterFunc(
                    <#ident as #bind::__macro_exports::auto_register::__RegisterType>::__register
                )
            }
        },
        _ => TokenStream::new(),
    }
}

#[cfg(not(feature = "auto_register"))]
pub(crate) fn auto_register_impl(
    _: &Ident,
    _: &TypeAttributes,
    _: &TypeParams,
    _: &syn::Path,
) -> TokenStream {
    TokenStream::new()
}

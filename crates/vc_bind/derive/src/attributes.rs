//! Parsing of `#[bind(...)]` attributes.

use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::ext::IdentExt;
use syn::parse::{Parse, ParseStream};
use syn::{Attribute, Expr, Ident, LitStr, Path, Token, parenthesized};

use crate::BIND_ATTRIBUTE_NAME;

/// Runs `parse_item` over every `#[bind(...)]` in `attrs`, once per
/// comma-separated item.
fn parse_bind_attrs(
    attrs: &[Attribute],
    mut parse_item: impl FnMut(ParseStream) -> syn::Result<()>,
) -> syn::Result<()> {
    for attr in attrs {
        if !attr.path().is_ident(BIND_ATTRIBUTE_NAME) {
            continue;
        }
        attr.parse_args_with(|input: ParseStream| {
            while !input.is_empty() {
                parse_item(input)?;
                if input.is_empty() {
                    break;
                }
                input.parse::<Token![,]>()?;
            }
            Ok(())
        })?;
    }
    Ok(())
}

fn parse_str_value(input: ParseStream) -> syn::Result<LitStr> {
    input.parse::<Token![=]>()?;
    input.parse()
}

// -----------------------------------------------------------------------------
// CustomAttributes

/// Expressions given as `@expr`, attached as typed attributes.
#[derive(Default)]
pub(crate) struct CustomAttributes {
    values: Vec<Expr>,
}

impl CustomAttributes {
    /// Parses `@Foo` or `@bar::Baz::new(1)`.
    fn parse_one(&mut self, input: ParseStream) -> syn::Result<()> {
        input.parse::<Token![@]>()?;
        self.values.push(input.parse()?);
        Ok(())
    }

    /// Returns `.with_attribute(expr)` calls, one per expression.
    pub fn with_attribute_calls(&self) -> TokenStream {
        let values = &self.values;
        quote! { #(.with_attribute(#values))* }
    }
}

// -----------------------------------------------------------------------------
// Creators

/// A `creator(path, names..)` or `factory(path, names..)` entry.
pub(crate) struct CreatorAttr {
    pub func: Path,
    /// `Some` per named parameter, `None` for `_`.
    pub names: Vec<Option<LitStr>>,
}

impl Parse for CreatorAttr {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let content;
        parenthesized!(content in input);
        let func: Path = content.parse()?;
        let mut names = Vec::new();
        while !content.is_empty() {
            content.parse::<Token![,]>()?;
            if content.is_empty() {
                break;
            }
            if content.peek(Token![_]) {
                content.parse::<Token![_]>()?;
                names.push(None);
            } else {
                names.push(Some(content.parse()?));
            }
        }
        Ok(Self { func, names })
    }
}

impl CreatorAttr {
    /// The last segment of the function path.
    pub fn name(&self) -> String {
        self.func
            .segments
            .last()
            .map(|segment| segment.ident.unraw().to_string())
            .unwrap_or_default()
    }
}

/// A `getter(name = path)` or `setter(name = path)` entry.
pub(crate) struct MethodAttr {
    pub name: LitStr,
    pub func: Expr,
}

impl Parse for MethodAttr {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let content;
        parenthesized!(content in input);
        let name = if content.peek(LitStr) {
            content.parse()?
        } else {
            let ident = Ident::parse_any(&content)?;
            LitStr::new(&ident.unraw().to_string(), ident.span())
        };
        content.parse::<Token![=]>()?;
        let func = content.parse()?;
        Ok(Self { name, func })
    }
}

// -----------------------------------------------------------------------------
// TypeAttributes

/// Type-level attributes.
#[derive(Default)]
pub(crate) struct TypeAttributes {
    pub default: bool,
    pub auto_register: Option<Span>,
    pub root: Option<LitStr>,
    pub crate_path: Option<Path>,
    pub creators: Vec<CreatorAttr>,
    pub factories: Vec<CreatorAttr>,
    pub getters: Vec<MethodAttr>,
    pub setters: Vec<MethodAttr>,
    pub custom: CustomAttributes,
}

impl TypeAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();
        parse_bind_attrs(attrs, |input| this.parse_item(input))?;
        Ok(this)
    }

    fn parse_item(&mut self, input: ParseStream) -> syn::Result<()> {
        if input.peek(Token![@]) {
            return self.custom.parse_one(input);
        }
        let ident = Ident::parse_any(input)?;
        match ident.to_string().as_str() {
            "default" => self.default = true,
            "auto_register" => self.auto_register = Some(ident.span()),
            "root" => self.root = Some(parse_str_value(input)?),
            "crate" => {
                input.parse::<Token![=]>()?;
                self.crate_path = Some(input.parse()?);
            }
            "creator" => self.creators.push(input.parse()?),
            "factory" => self.factories.push(input.parse()?),
            "getter" => self.getters.push(input.parse()?),
            "setter" => self.setters.push(input.parse()?),
            other => {
                return Err(syn::Error::new(
                    ident.span(),
                    format!("unknown type attribute `{other}`"),
                ));
            }
        }
        Ok(())
    }

    /// `true` if the type declares its own way of being created.
    #[inline]
    pub fn has_explicit_creation(&self) -> bool {
        self.default || !self.creators.is_empty() || !self.factories.is_empty()
    }
}

// -----------------------------------------------------------------------------
// FieldAttributes

/// Field-level attributes.
#[derive(Default)]
pub(crate) struct FieldAttributes {
    pub rename: Option<LitStr>,
    pub aliases: Vec<LitStr>,
    pub skip: bool,
    pub skip_serializing: bool,
    pub skip_deserializing: bool,
    pub include: bool,
    pub adapter: Option<Expr>,
    pub extends: Option<Span>,
    pub custom: CustomAttributes,
}

impl FieldAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();
        parse_bind_attrs(attrs, |input| this.parse_item(input))?;
        Ok(this)
    }

    fn parse_item(&mut self, input: ParseStream) -> syn::Result<()> {
        if input.peek(Token![@]) {
            return self.custom.parse_one(input);
        }
        let ident = Ident::parse_any(input)?;
        match ident.to_string().as_str() {
            "rename" => self.rename = Some(parse_str_value(input)?),
            "alias" => self.aliases.push(parse_str_value(input)?),
            "skip" => self.skip = true,
            "skip_serializing" => self.skip_serializing = true,
            "skip_deserializing" => self.skip_deserializing = true,
            "include" => self.include = true,
            "adapter" => {
                input.parse::<Token![=]>()?;
                self.adapter = Some(input.parse()?);
            }
            "extends" => self.extends = Some(ident.span()),
            other => {
                return Err(syn::Error::new(
                    ident.span(),
                    format!("unknown field attribute `{other}`"),
                ));
            }
        }
        Ok(())
    }

    /// `true` if the field cannot be a memberwise creator argument.
    #[inline]
    pub fn blocks_memberwise(&self) -> bool {
        self.skip || self.skip_deserializing || self.extends.is_some()
    }

    /// `true` if the field needs a `PropertyOptions` attribute.
    #[inline]
    pub fn has_property_options(&self) -> bool {
        self.rename.is_some()
            || !self.aliases.is_empty()
            || self.skip_serializing
            || self.skip_deserializing
            || self.include
    }
}

// -----------------------------------------------------------------------------
// VariantAttributes

/// Variant-level attributes of unit enums.
#[derive(Default)]
pub(crate) struct VariantAttributes {
    pub rename: Option<LitStr>,
    pub custom: CustomAttributes,
}

impl VariantAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();
        parse_bind_attrs(attrs, |input| this.parse_item(input))?;
        Ok(this)
    }

    fn parse_item(&mut self, input: ParseStream) -> syn::Result<()> {
        if input.peek(Token![@]) {
            return self.custom.parse_one(input);
        }
        let ident = Ident::parse_any(input)?;
        match ident.to_string().as_str() {
            "rename" => self.rename = Some(parse_str_value(input)?),
            other => {
                return Err(syn::Error::new(
                    ident.span(),
                    format!("unknown variant attribute `{other}`"),
                ));
            }
        }
        Ok(())
    }
}

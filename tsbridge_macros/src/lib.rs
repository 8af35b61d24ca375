//! `#[derive(Describe)]` for tsbridge.
//!
//! Emits an `impl tsbridge::Describe` that mirrors how serde puts the struct
//! on the wire. Honored serde attributes:
//!
//! - container: `rename_all`, `transparent`
//! - field: `rename`, `skip`
//! - field: `skip_serializing`, `skip_serializing_if`, `skip_deserializing`
//!   (the field may be missing from one direction, so it becomes optional)
//!
//! One descriptor serves both request and response, so a `rename` or
//! `rename_all` whose `serialize` and `deserialize` sides disagree is a
//! compile error.
//!
//! `#[describe(inline)]` describes the struct as an anonymous object instead
//! of a named definition. Inline structs must not refer to themselves.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{quote, quote_spanned};
use syn::spanned::Spanned;
use syn::{
    parse_macro_input, Attribute, Data, DeriveInput, Fields, LitStr, Result as SynResult, Token,
};

#[proc_macro_derive(Describe, attributes(describe))]
pub fn derive_describe(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> SynResult<TokenStream2> {
    let ident = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new(
            input.generics.span(),
            "Describe cannot be derived for generic types; describe a concrete type instead",
        ));
    }

    let data = match &input.data {
        Data::Struct(data) => data,
        Data::Enum(data) => {
            return Err(syn::Error::new(
                data.enum_token.span(),
                "Describe cannot be derived for enums; model alternatives as a struct of Choice<T> fields",
            ))
        }
        Data::Union(data) => {
            return Err(syn::Error::new(
                data.union_token.span(),
                "Describe cannot be derived for unions",
            ))
        }
    };

    let container = ContainerAttrs::parse(&input.attrs)?;
    let rename_all = container.rename_all(ident)?;

    let body = match &data.fields {
        Fields::Unnamed(fields) if fields.unnamed.len() == 1 => {
            let ty = &fields.unnamed[0].ty;
            quote! { <#ty as ::tsbridge::Describe>::describe() }
        }
        Fields::Named(fields) if container.transparent => {
            let mut kept = fields.named.iter().filter(|f| !FieldAttrs::is_skipped(f));
            match (kept.next(), kept.next()) {
                (Some(field), None) => {
                    let ty = &field.ty;
                    quote! { <#ty as ::tsbridge::Describe>::describe() }
                }
                _ => {
                    return Err(syn::Error::new(
                        ident.span(),
                        "#[serde(transparent)] requires exactly one field",
                    ))
                }
            }
        }
        Fields::Named(fields) => {
            let mut entries = Vec::new();
            for field in &fields.named {
                let attrs = FieldAttrs::parse(&field.attrs)?;
                if attrs.skip {
                    continue;
                }
                let Some(field_ident) = &field.ident else {
                    continue;
                };
                let raw = field_ident.to_string();
                let raw = raw.strip_prefix("r#").unwrap_or(&raw);
                let wire_name = attrs.wire_name(field, rename_all.apply(raw))?;
                let ty = &field.ty;
                let constructor = if attrs.maybe_absent {
                    quote! { optional }
                } else {
                    quote! { new }
                };
                entries.push(quote_spanned! {field.span()=>
                    ::tsbridge::Field::#constructor(
                        #wire_name,
                        <#ty as ::tsbridge::Describe>::describe(),
                    )
                });
            }

            let fields = quote! { ::std::vec![#(#entries),*] };
            if container.inline {
                quote! {
                    ::tsbridge::TypeDescriptor::anonymous(::tsbridge::FieldList::Deferred(|| #fields))
                }
            } else {
                let name = ident.to_string();
                quote! {
                    ::tsbridge::TypeDescriptor::named(
                        ::std::concat!(::std::module_path!(), "::", #name),
                        ::tsbridge::FieldList::Deferred(|| #fields),
                    )
                }
            }
        }
        Fields::Unnamed(_) => {
            return Err(syn::Error::new(
                ident.span(),
                "Describe supports tuple structs with exactly one field only",
            ))
        }
        Fields::Unit => {
            return Err(syn::Error::new(
                ident.span(),
                "Describe cannot be derived for unit structs; use `struct Name {}`",
            ))
        }
    };

    Ok(quote! {
        impl ::tsbridge::Describe for #ident {
            fn describe() -> ::tsbridge::TypeDescriptor {
                #body
            }
        }
    })
}

#[derive(Default)]
struct ContainerAttrs {
    rename_all_ser: Option<RenameRule>,
    rename_all_de: Option<RenameRule>,
    transparent: bool,
    inline: bool,
}

impl ContainerAttrs {
    fn parse(attrs: &[Attribute]) -> SynResult<Self> {
        let mut out = Self::default();
        for attr in attrs {
            if attr.path().is_ident("serde") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("rename_all") {
                        if meta.input.peek(Token![=]) {
                            let lit: LitStr = meta.value()?.parse()?;
                            let rule = RenameRule::from_lit(&lit)?;
                            out.rename_all_ser = Some(rule);
                            out.rename_all_de = Some(rule);
                        } else {
                            meta.parse_nested_meta(|inner| {
                                let lit: LitStr = inner.value()?.parse()?;
                                let rule = Some(RenameRule::from_lit(&lit)?);
                                if inner.path.is_ident("serialize") {
                                    out.rename_all_ser = rule;
                                } else if inner.path.is_ident("deserialize") {
                                    out.rename_all_de = rule;
                                }
                                Ok(())
                            })?;
                        }
                    } else if meta.path.is_ident("transparent") {
                        out.transparent = true;
                    } else {
                        skip_meta(&meta)?;
                    }
                    Ok(())
                })?;
            } else if attr.path().is_ident("describe") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("inline") {
                        out.inline = true;
                        Ok(())
                    } else {
                        Err(meta.error("unknown describe attribute, expected `inline`"))
                    }
                })?;
            }
        }
        Ok(out)
    }

    fn rename_all(&self, ident: &syn::Ident) -> SynResult<RenameRule> {
        let ser = self.rename_all_ser.unwrap_or_default();
        let de = self.rename_all_de.unwrap_or_default();
        if ser != de {
            return Err(syn::Error::new(
                ident.span(),
                "Describe needs one wire name per field; rename_all must be the same for serialize and deserialize",
            ));
        }
        Ok(ser)
    }
}

#[derive(Default)]
struct FieldAttrs {
    rename_ser: Option<String>,
    rename_de: Option<String>,
    skip: bool,
    maybe_absent: bool,
}

impl FieldAttrs {
    fn parse(attrs: &[Attribute]) -> SynResult<Self> {
        let mut out = Self::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    if meta.input.peek(Token![=]) {
                        let lit: LitStr = meta.value()?.parse()?;
                        out.rename_ser = Some(lit.value());
                        out.rename_de = Some(lit.value());
                    } else {
                        meta.parse_nested_meta(|inner| {
                            let lit: LitStr = inner.value()?.parse()?;
                            if inner.path.is_ident("serialize") {
                                out.rename_ser = Some(lit.value());
                            } else if inner.path.is_ident("deserialize") {
                                out.rename_de = Some(lit.value());
                            }
                            Ok(())
                        })?;
                    }
                } else if meta.path.is_ident("skip") {
                    out.skip = true;
                } else if meta.path.is_ident("skip_serializing")
                    || meta.path.is_ident("skip_deserializing")
                {
                    out.maybe_absent = true;
                } else if meta.path.is_ident("skip_serializing_if") {
                    out.maybe_absent = true;
                    skip_meta(&meta)?;
                } else if meta.path.is_ident("flatten") {
                    return Err(meta.error("#[serde(flatten)] is not supported by Describe"));
                } else {
                    skip_meta(&meta)?;
                }
                Ok(())
            })?;
        }
        Ok(out)
    }

    /// The single name the field has on the wire. `default` is the name
    /// `rename_all` gives it.
    fn wire_name(&self, field: &syn::Field, default: String) -> SynResult<String> {
        let ser = self.rename_ser.as_deref().unwrap_or(&default);
        let de = self.rename_de.as_deref().unwrap_or(&default);
        if ser != de {
            return Err(syn::Error::new(
                field.span(),
                format!(
                    "Describe needs one wire name per field; serialized as `{ser}` but deserialized as `{de}`"
                ),
            ));
        }
        Ok(ser.to_string())
    }

    fn is_skipped(field: &syn::Field) -> bool {
        Self::parse(&field.attrs).is_ok_and(|attrs| attrs.skip)
    }
}

/// Consume the value of a serde option this macro does not care about.
fn skip_meta(meta: &syn::meta::ParseNestedMeta<'_>) -> SynResult<()> {
    if meta.input.peek(Token![=]) {
        meta.value()?.parse::<syn::Expr>()?;
    } else if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|inner| skip_meta(&inner))?;
    }
    Ok(())
}

/// serde's `rename_all` rules, applied to snake_case field names.
#[derive(Default, Clone, Copy, PartialEq, Eq)]
enum RenameRule {
    #[default]
    None,
    Lower,
    Upper,
    Pascal,
    Camel,
    Snake,
    ScreamingSnake,
    Kebab,
    ScreamingKebab,
}

impl RenameRule {
    fn from_lit(lit: &LitStr) -> SynResult<Self> {
        Ok(match lit.value().as_str() {
            "lowercase" => Self::Lower,
            "UPPERCASE" => Self::Upper,
            "PascalCase" => Self::Pascal,
            "camelCase" => Self::Camel,
            "snake_case" => Self::Snake,
            "SCREAMING_SNAKE_CASE" => Self::ScreamingSnake,
            "kebab-case" => Self::Kebab,
            "SCREAMING-KEBAB-CASE" => Self::ScreamingKebab,
            other => {
                return Err(syn::Error::new(
                    lit.span(),
                    format!("unknown rename_all rule `{other}`"),
                ))
            }
        })
    }

    fn apply(self, field: &str) -> String {
        match self {
            Self::None | Self::Snake => field.to_string(),
            Self::Lower => field.to_ascii_lowercase(),
            Self::Upper | Self::ScreamingSnake => field.to_ascii_uppercase(),
            Self::Kebab => field.replace('_', "-"),
            Self::ScreamingKebab => field.to_ascii_uppercase().replace('_', "-"),
            Self::Pascal => pascal(field),
            Self::Camel => {
                let pascal = pascal(field);
                let mut chars = pascal.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
                    None => String::new(),
                }
            }
        }
    }
}

fn pascal(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut capitalize = true;
    for c in field.chars() {
        if c == '_' {
            capitalize = true;
        } else if capitalize {
            out.push(c.to_ascii_uppercase());
            capitalize = false;
        } else {
            out.push(c);
        }
    }
    out
}

//! Expansion of `#[cgate_error]`.
//!
//! Every variant carries named fields including `context: Option<Cow<'static, str>>`.
//! A field named `source` marks the wrapped upstream error; a variant named `Internal`
//! holds a free-form `message`.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Attribute, Data, DeriveInput, Fields, Ident, Type, Variant};

use super::snake_case;

const CONTEXT_TYPE: &str = "Option<Cow<'static, str>>";

struct ErrorVariant<'a> {
    ident: &'a Ident,
    cfg: Vec<&'a Attribute>,
    source: Option<&'a Type>,
}

pub fn expand_derive(input: DeriveInput) -> TokenStream {
    let Data::Enum(data) = &input.data else {
        return syn::Error::new_spanned(&input.ident, "cgate_error can only be applied to enums")
            .to_compile_error();
    };

    let variants = match data.variants.iter().map(error_variant).collect::<syn::Result<Vec<_>>>() {
        Ok(variants) => variants,
        Err(err) => return err.to_compile_error(),
    };

    let name = &input.ident;
    let ext = format_ident!("{}Ext", name);
    let context_trait = context_trait(name, &ext, &variants);
    let source_impls = variants.iter().filter_map(|v| source_impl(name, &ext, v));
    let internal_impls = variants
        .iter()
        .find(|v| v.ident == "Internal")
        .map(|v| internal_impls(name, v));
    let kind = kind_fn(name, &variants);

    quote! {
        #[derive(Debug, ::thiserror::Error)]
        #input

        #context_trait
        #(#source_impls)*
        #internal_impls
        #kind

        #[allow(dead_code)]
        fn format_context(context: &Option<std::borrow::Cow<'static, str>>) -> std::borrow::Cow<'static, str> {
            match context {
                Some(c) => std::borrow::Cow::Owned(format!(" ({c})")),
                None => std::borrow::Cow::Borrowed(""),
            }
        }
    }
}

fn error_variant(v: &Variant) -> syn::Result<ErrorVariant<'_>> {
    let Fields::Named(fields) = &v.fields else {
        return Err(syn::Error::new_spanned(v, "cgate_error variants need named fields"));
    };

    let field = |name: &str| fields.named.iter().find(|f| f.ident.as_ref().is_some_and(|i| i == name));

    let context = field("context").ok_or_else(|| {
        syn::Error::new_spanned(&v.ident, format!("missing `context: {CONTEXT_TYPE}` field"))
    })?;
    let ty = &context.ty;
    if quote!(#ty).to_string().replace(' ', "") != CONTEXT_TYPE.replace(' ', "") {
        return Err(syn::Error::new_spanned(ty, format!("context field must be {CONTEXT_TYPE}")));
    }

    Ok(ErrorVariant {
        ident: &v.ident,
        cfg: v.attrs.iter().filter(|a| a.path().is_ident("cfg")).collect(),
        source: field("source").map(|f| &f.ty),
    })
}

/// `.context(..)` on results of this error type.
fn context_trait(name: &Ident, ext: &Ident, variants: &[ErrorVariant<'_>]) -> TokenStream {
    let arms = variants.iter().map(|v| {
        let (ident, cfg) = (v.ident, &v.cfg);
        quote! { #(#cfg)* #name::#ident { context, .. } => *context = Some(ctx.into()), }
    });

    quote! {
        pub trait #ext<T> {
            fn context(self, ctx: impl Into<std::borrow::Cow<'static, str>>) -> Result<T, #name>;
        }

        #[automatically_derived]
        impl<T> #ext<T> for Result<T, #name> {
            fn context(self, ctx: impl Into<std::borrow::Cow<'static, str>>) -> Self {
                self.map_err(|mut err| {
                    match &mut err {
                        #(#arms)*
                    }
                    err
                })
            }
        }
    }
}

/// `From<Source>` for `?`, plus `.context(..)` straight on the upstream result.
fn source_impl(name: &Ident, ext: &Ident, v: &ErrorVariant<'_>) -> Option<TokenStream> {
    let ty = v.source?;
    let (ident, cfg) = (v.ident, &v.cfg);

    Some(quote! {
        #(#cfg)*
        #[automatically_derived]
        impl From<#ty> for #name {
            fn from(source: #ty) -> Self {
                Self::#ident { source, context: None }
            }
        }

        #(#cfg)*
        #[automatically_derived]
        impl<T> #ext<T> for Result<T, #ty> {
            fn context(self, ctx: impl Into<std::borrow::Cow<'static, str>>) -> Result<T, #name> {
                self.map_err(|source| #name::#ident { source, context: Some(ctx.into()) })
            }
        }
    })
}

fn internal_impls(name: &Ident, v: &ErrorVariant<'_>) -> TokenStream {
    let cfg = &v.cfg;
    quote! {
        #(#cfg)*
        #[automatically_derived]
        impl From<&'static str> for #name {
            fn from(message: &'static str) -> Self {
                Self::Internal { message: std::borrow::Cow::Borrowed(message), context: None }
            }
        }

        #(#cfg)*
        #[automatically_derived]
        impl From<String> for #name {
            fn from(message: String) -> Self {
                Self::Internal { message: std::borrow::Cow::Owned(message), context: None }
            }
        }
    }
}

fn kind_fn(name: &Ident, variants: &[ErrorVariant<'_>]) -> TokenStream {
    let arms = variants.iter().map(|v| {
        let (ident, cfg) = (v.ident, &v.cfg);
        let kind = snake_case(&ident.to_string());
        quote! { #(#cfg)* Self::#ident { .. } => #kind, }
    });

    quote! {
        #[automatically_derived]
        impl #name {
            /// `snake_case` variant name, for structured log fields.
            #[must_use]
            pub const fn kind(&self) -> &'static str {
                match self {
                    #(#arms)*
                }
            }
        }
    }
}

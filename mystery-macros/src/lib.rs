//! Proc macros for typed prompt placeholders.
//!
//! Provides `#[derive(Placeholders)]`, which turns a struct of text fields
//! into a fixed placeholder set. Prompt templates are checked against that
//! set when they are parsed, so the tokens a template may use are decided
//! by the struct definition rather than by runtime search-and-replace.
//!
//! # Example
//!
//! ```ignore
//! #[derive(Placeholders)]
//! struct Greeting {
//!     /// Who is being greeted
//!     name: String,
//!     /// Extra closing line, may be empty
//!     #[placeholder(optional)]
//!     closing: String,
//! }
//!
//! assert_eq!(Greeting::PLACEHOLDERS, &["name", "closing"]);
//! ```

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, DeriveInput, Field, Lit, Meta};

/// Derive macro implementing `mystery_core::template::Placeholders`.
///
/// # Attributes
///
/// - `#[placeholder(optional)]` on fields - an empty value is allowed when filling
/// - `#[placeholder(rename = "...")]` on fields - override the token name (defaults to the field name)
#[proc_macro_derive(Placeholders, attributes(placeholder))]
pub fn derive_placeholders(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_placeholders(input)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

struct PlaceholderField {
    ident: syn::Ident,
    token: String,
    optional: bool,
}

fn expand_placeholders(input: DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        syn::Data::Struct(data) => match &data.fields {
            syn::Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Placeholders derive only supports structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Placeholders derive only supports structs",
            ))
        }
    };

    let mut parsed: Vec<PlaceholderField> = Vec::new();
    for field in fields {
        let parsed_field = parse_field(field)?;
        if parsed.iter().any(|p| p.token == parsed_field.token) {
            return Err(syn::Error::new_spanned(
                field,
                format!("duplicate placeholder `{}`", parsed_field.token),
            ));
        }
        parsed.push(parsed_field);
    }

    if parsed.is_empty() {
        return Err(syn::Error::new_spanned(
            &input,
            "Placeholders derive needs at least one field",
        ));
    }

    let tokens: Vec<&str> = parsed.iter().map(|p| p.token.as_str()).collect();
    let optional: Vec<&str> = parsed
        .iter()
        .filter(|p| p.optional)
        .map(|p| p.token.as_str())
        .collect();

    let arms = parsed.iter().map(|p| {
        let ident = &p.ident;
        let token = &p.token;
        quote! {
            #token => ::core::option::Option::Some(::core::convert::AsRef::<str>::as_ref(&self.#ident)),
        }
    });

    Ok(quote! {
        impl #impl_generics ::mystery_core::template::Placeholders for #struct_name #ty_generics #where_clause {
            const PLACEHOLDERS: &'static [&'static str] = &[#(#tokens),*];
            const OPTIONAL: &'static [&'static str] = &[#(#optional),*];

            fn placeholder(&self, name: &str) -> ::core::option::Option<&str> {
                match name {
                    #(#arms)*
                    _ => ::core::option::Option::None,
                }
            }
        }
    })
}

fn parse_field(field: &Field) -> syn::Result<PlaceholderField> {
    let ident = field
        .ident
        .clone()
        .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;

    let mut token = ident.to_string();
    let mut optional = false;

    for attr in &field.attrs {
        if !attr.path().is_ident("placeholder") {
            continue;
        }
        let meta = attr.parse_args::<Meta>()?;
        match meta {
            Meta::Path(path) if path.is_ident("optional") => optional = true,
            Meta::NameValue(nv) if nv.path.is_ident("rename") => {
                if let syn::Expr::Lit(expr_lit) = &nv.value {
                    if let Lit::Str(s) = &expr_lit.lit {
                        token = s.value();
                        continue;
                    }
                }
                return Err(syn::Error::new_spanned(
                    nv,
                    "rename expects a string literal",
                ));
            }
            other => {
                return Err(syn::Error::new_spanned(
                    other,
                    "unknown placeholder attribute, expected `optional` or `rename = \"...\"`",
                ))
            }
        }
    }

    if !is_token_name(&token) {
        return Err(syn::Error::new_spanned(
            field,
            format!("`{token}` is not a valid placeholder name (use lowercase letters, digits and `_`)"),
        ));
    }

    Ok(PlaceholderField {
        ident,
        token,
        optional,
    })
}

/// Placeholder names match `[a-z_][a-z0-9_]*`, the same rule templates use
/// to recognise a `{token}`.
fn is_token_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

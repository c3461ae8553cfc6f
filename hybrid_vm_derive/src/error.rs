//! Derive macro for error types.
//!
//! Generates `std::fmt::Display` and `std::error::Error` implementations from
//! `#[error("...")]` attributes.
//!
//! # Usage
//!
//! ```ignore
//! use hybrid_vm_derive::Error;
//!
//! #[derive(Debug, Error)]
//! pub enum DecodeError {
//!     #[error("invalid opcode {0:#04x}")]
//!     Opcode(u8),
//!
//!     #[error("operand at {offset} needs {requested} bytes")]
//!     Truncated { offset: usize, requested: usize, available: usize },
//!
//!     #[error("unknown error")]
//!     Unknown,
//! }
//! ```
//!
//! Only the fields a message mentions are bound, so variants may carry extra
//! context that is not part of their display text. Positional arguments
//! (`{0}`, `{1:#x}`) address tuple fields and accept format specs.

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::{ToTokens, format_ident, quote};
use syn::{Data, DeriveInput, Fields, Ident, Lit, Meta, parse_macro_input};

pub fn derive_error(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand_error_derive(&input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand_error_derive(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let display_body = match &input.data {
        Data::Enum(data_enum) => {
            let arms = data_enum
                .variants
                .iter()
                .map(|variant| {
                    let variant_name = &variant.ident;
                    let message = error_message(
                        &variant.attrs,
                        &variant.ident,
                        &format!("variant `{variant_name}`"),
                    )?;
                    let (pattern, write) = display_fields(&variant.fields, &message, false)?;
                    Ok(quote! { Self::#variant_name #pattern => #write, })
                })
                .collect::<syn::Result<Vec<_>>>()?;

            quote! {
                match self {
                    #(#arms)*
                }
            }
        }
        Data::Struct(data_struct) => {
            let message =
                error_message(&input.attrs, &input.ident, &format!("type `{name}`"))?;
            let (_, write) = display_fields(&data_struct.fields, &message, true)?;
            write
        }
        Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                input,
                "Error derive does not support unions",
            ));
        }
    };

    Ok(quote! {
        impl #impl_generics ::std::fmt::Display for #name #ty_generics #where_clause {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                #display_body
            }
        }

        impl #impl_generics ::std::error::Error for #name #ty_generics #where_clause {}
    })
}

/// Builds the destructuring pattern (enum variants only) and the `write!` call
/// for one set of fields.
///
/// With `on_self`, fields are read through `self` instead of being bound.
fn display_fields(
    fields: &Fields,
    message: &str,
    on_self: bool,
) -> syn::Result<(proc_macro2::TokenStream, proc_macro2::TokenStream)> {
    match fields {
        Fields::Unit => Ok((quote! {}, quote! { write!(f, #message) })),
        Fields::Unnamed(unnamed) => {
            let format_str = rename_positional(message);
            let used = referenced_args(&format_str);
            let count = unnamed.unnamed.len();

            for arg in &used {
                let known = arg
                    .strip_prefix('f')
                    .and_then(|idx| idx.parse::<usize>().ok())
                    .is_some_and(|idx| idx < count);
                if !known {
                    return Err(syn::Error::new_spanned(
                        unnamed,
                        format!("#[error] message refers to `{arg}`, which is not a field"),
                    ));
                }
            }

            let bindings = (0..count).map(|i| {
                let ident = format_ident!("f{}", i);
                if used.contains(&ident.to_string()) {
                    quote! { #ident }
                } else {
                    quote! { _ }
                }
            });
            let args = used.iter().map(|arg| {
                let ident = Ident::new(arg, Span::call_site());
                if on_self {
                    let index = syn::Index::from(arg[1..].parse::<usize>().unwrap_or(0));
                    quote! { #ident = self.#index }
                } else {
                    quote! { #ident = #ident }
                }
            });

            let pattern = quote! { (#(#bindings),*) };
            Ok((pattern, quote! { write!(f, #format_str, #(#args),*) }))
        }
        Fields::Named(named) => {
            let used = referenced_args(message);
            let field_names: Vec<String> = named
                .named
                .iter()
                .filter_map(|field| field.ident.as_ref().map(|ident| ident.to_string()))
                .collect();

            if let Some(unknown) = used.iter().find(|arg| !field_names.contains(arg)) {
                return Err(syn::Error::new_spanned(
                    named,
                    format!("#[error] message refers to `{unknown}`, which is not a field"),
                ));
            }

            let idents: Vec<Ident> = used
                .iter()
                .map(|arg| Ident::new(arg, Span::call_site()))
                .collect();
            let args = idents.iter().map(|ident| {
                if on_self {
                    quote! { #ident = self.#ident }
                } else {
                    quote! { #ident = #ident }
                }
            });

            let pattern = quote! { { #(#idents,)* .. } };
            Ok((pattern, quote! { write!(f, #message, #(#args),*) }))
        }
    }
}

/// Extracts the message of the `#[error("...")]` attribute in `attrs`.
fn error_message<T: ToTokens>(
    attrs: &[syn::Attribute],
    target: &T,
    target_desc: &str,
) -> syn::Result<String> {
    let attr = attrs
        .iter()
        .find(|attr| attr.path().is_ident("error"))
        .ok_or_else(|| {
            syn::Error::new_spanned(
                target,
                format!("missing #[error(\"...\")] attribute on {target_desc}"),
            )
        })?;

    let Meta::List(meta_list) = &attr.meta else {
        return Err(syn::Error::new_spanned(
            &attr.meta,
            "invalid #[error] attribute; use #[error(\"message\")]",
        ));
    };

    match syn::parse2::<Lit>(meta_list.tokens.clone()) {
        Ok(Lit::Str(lit_str)) => Ok(lit_str.value()),
        _ => Err(syn::Error::new_spanned(
            &attr.meta,
            "#[error] message must be a string literal, e.g. #[error(\"bad opcode {0:#04x}\")]",
        )),
    }
}

/// Returns the argument names a format string refers to, in first-use order.
fn referenced_args(format_str: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut chars = format_str.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.next_if_eq(&'{').is_some() => {}
            '{' => {
                let spec: String = chars.by_ref().take_while(|c| *c != '}').collect();
                let name = spec.split(':').next().unwrap_or_default().trim().to_string();
                if !name.is_empty() && !names.contains(&name) {
                    names.push(name);
                }
            }
            _ => {}
        }
    }
    names
}

/// Rewrites positional arguments `{0}`, `{1:x}` to `{f0}`, `{f1:x}`.
fn rename_positional(format_str: &str) -> String {
    let mut out = String::with_capacity(format_str.len() + 4);
    let mut chars = format_str.chars().peekable();
    while let Some(c) = chars.next() {
        out.push(c);
        if c != '{' {
            continue;
        }
        if let Some(escaped) = chars.next_if_eq(&'{') {
            out.push(escaped);
        } else if chars.peek().is_some_and(char::is_ascii_digit) {
            out.push('f');
        }
    }
    out
}

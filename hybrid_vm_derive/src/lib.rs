//! Derive macros for the hybrid-vm crate.
//!
//! Provides:
//! - `#[derive(Error)]` - `Display` + `std::error::Error` for error enums and structs

mod error;

use proc_macro::TokenStream;

/// Implements `Display` and `Error` from per-variant `#[error("...")]` messages.
#[proc_macro_derive(Error, attributes(error))]
pub fn derive_error(input: TokenStream) -> TokenStream {
    error::derive_error(input)
}

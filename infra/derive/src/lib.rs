#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros for the bridge workspace.
//!
//! ## Usage
//! Add the crate as a regular dependency next to `thiserror`:
//! ```toml
//! [dependencies]
//! hb-derive.workspace = true
//! thiserror.workspace = true
//! ```
//!
//! The examples are `ignore`d to avoid compiling in this crate; see `tests/` for working copies.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Attribute macro for defining component error enums.
///
/// Every crate in the workspace declares its failures as a single enum with named-field
/// variants. This macro wires that enum into the rest of the stack.
///
/// # Injected Behaviors
///
/// * **Derives**: `Debug` and `thiserror::Error` unless already present.
/// * **Context Support**: a companion `<Name>Ext` trait adding `.context(...)` to any `Result`
///   whose error converts into this enum.
/// * **Conversions**: `From<T>` for variants carrying a `source` field (or a field tagged
///   `#[source]` / `#[from]`), so `?` works on upstream errors.
/// * **Internal Fallback**: `From<&'static str>` and `From<String>` if an `Internal` variant exists.
/// * **Kind**: a `kind(&self) -> &'static str` accessor returning the variant name. The call
///   bridge uses it as the stable error code on the wire.
///
/// # Requirements
///
/// 1. The macro must be applied to an **enum**.
/// 2. Variants that support context carry `context: Option<Cow<'static, str>>`.
/// 3. Variants with a source must also carry a context field.
/// 4. Tuple or unit variants are rejected.
///
/// # Example
///
/// ```rust,ignore
/// use hb_derive::hb_error;
/// use std::borrow::Cow;
///
/// #[hb_error]
/// pub enum DetectionError {
///     #[error("Probe I/O failure{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal detection error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn read_records(path: &Path) -> Result<String, DetectionError> {
///     std::fs::read_to_string(path).context("Reading installation records")
/// }
///
/// assert_eq!(DetectionError::from("boom").kind(), "Internal");
/// ```
#[proc_macro_attribute]
pub fn hb_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}

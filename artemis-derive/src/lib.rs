#![recursion_limit = "128"]
//! # Artemis Derive Macros
//!
//! Procedural macros generating the mapping traits of the `artemis` crate.
//!
//! ## Macros
//!
//! ### `Entity`
//!
//! Derives `artemis::mapping::Entity`, producing the per-field declaration
//! the metadata registry classifies.
//!
//! - **Supported for**: non-generic structs with named fields
//! - **Container attribute**: `#[entity(name = "...", embeddable, factory = path)]`
//! - **Field attributes**: `#[id]`, `#[id(name = "...")]`,
//!   `#[column(name = "...", converter = Type, nested, skip)]`
//!
//! ```rust,ignore
//! use artemis_derive::Entity;
//!
//! #[derive(Entity, Default)]
//! #[entity(name = "people")]
//! pub struct Person {
//!     #[id]
//!     pub id: i64,
//!     #[column(name = "full_name")]
//!     pub name: String,
//!     pub phones: Vec<String>,
//!     #[column(nested)]
//!     pub address: Option<Address>,
//! }
//! ```
//!
//! ### `Convertible`
//!
//! Derives `artemis::common::Convertible` for value types stored inside a
//! single field. Structs become nested records, enums with unit variants
//! become strings.
//!
//! - **Container attribute**: `#[converter(ignored = "field_a, field_b")]`
//!
//! ```rust,ignore
//! #[derive(Convertible, Default)]
//! pub struct Money {
//!     pub amount: i64,
//!     pub currency: String,
//! }
//! ```

extern crate proc_macro;
mod convertible;
mod entity;

use crate::convertible::{generate_convertible_for_enum, generate_convertible_for_struct};
use crate::entity::generate_entity_for_struct;
use proc_macro::TokenStream;
use syn::{Data, DeriveInput};

/// Derives the `Convertible` trait for value types.
///
/// # Attributes
///
/// - `#[converter(ignored = "a, b")]` - Fields left out of the value and
///   restored with `Default::default()`
///
/// # Errors
///
/// Returns a compile error if:
/// - The type is a union
/// - A struct has unnamed fields
/// - An enum has a variant carrying data
#[proc_macro_derive(Convertible, attributes(converter))]
pub fn derive_convertible(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as DeriveInput);

    let result = match ast.data {
        Data::Struct(ref data) => generate_convertible_for_struct(&ast, data),
        Data::Enum(ref data) => generate_convertible_for_enum(&ast, data),
        Data::Union(_) => Err(syn::Error::new_spanned(
            &ast,
            "Cannot derive Convertible for unions. Only structs and enums are supported.",
        )),
    };

    match result {
        Ok(token_stream) => token_stream,
        Err(e) => e.to_compile_error().into(),
    }
}

/// Derives the `Entity` trait for mapped types.
///
/// Every field is declared as a plain value, a sequence or a map depending on
/// its type. Fields marked `#[column(nested)]` hold another `Entity`, either
/// directly or wrapped in `Option`.
///
/// # Errors
///
/// Returns a compile error if:
/// - Applied to an enum, a union or a generic struct
/// - Used on tuple structs or unit structs
/// - An attribute is malformed
#[proc_macro_derive(Entity, attributes(entity, id, column))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as DeriveInput);

    match ast.data {
        Data::Struct(ref data) => match generate_entity_for_struct(&ast, data) {
            Ok(token_stream) => token_stream,
            Err(e) => e.to_compile_error().into(),
        },
        Data::Enum(_) => syn::Error::new_spanned(
            &ast,
            "Cannot derive Entity for enums. Only structs are supported.",
        )
        .to_compile_error()
        .into(),
        Data::Union(_) => syn::Error::new_spanned(
            &ast,
            "Cannot derive Entity for unions. Only structs are supported.",
        )
        .to_compile_error()
        .into(),
    }
}

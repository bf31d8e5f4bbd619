//! Derive macros for Checklist action enums
//!
//! # Available Macros
//!
//! - `#[derive(Action)]` - Classifies action variants as user intents or
//!   asynchronous responses and names them for logging
//!
//! # Example
//!
//! ```ignore
//! use checklist_macros::Action;
//!
//! #[derive(Action, Clone, Debug)]
//! enum TodoAction {
//!     #[intent]
//!     AddTodoButtonTapped,
//!
//!     #[response]
//!     TodoSaved(Result<Todo, RepositoryError>),
//! }
//!
//! assert!(TodoAction::AddTodoButtonTapped.is_intent());
//! assert_eq!(TodoAction::AddTodoButtonTapped.action_name(), "AddTodoButtonTapped");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, Ident};

/// Derive macro for Action enums
///
/// Generates helper methods for action enums:
/// - `is_intent()` - Returns true if this variant is a user intent
/// - `is_response()` - Returns true if this variant carries an async result
/// - `action_name()` - Returns the variant name, for structured logs
///
/// # Attributes
///
/// - `#[intent]` - Mark a variant as something the user asked for
/// - `#[response]` - Mark a variant as the result of an effect
///
/// Unmarked variants are neither.
///
/// # Errors
///
/// Produces a compile error if:
/// - Applied to a non-enum type
/// - A variant has both `#[intent]` and `#[response]` attributes
#[proc_macro_derive(Action, attributes(intent, response))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let Data::Enum(data_enum) = &input.data else {
        return syn::Error::new_spanned(input, "#[derive(Action)] can only be used on enums")
            .to_compile_error()
            .into();
    };

    let mut intent_arms = Vec::new();
    let mut response_arms = Vec::new();
    let mut name_arms = Vec::new();

    for variant in &data_enum.variants {
        let is_intent = has_attribute(&variant.attrs, "intent");
        let is_response = has_attribute(&variant.attrs, "response");

        if is_intent && is_response {
            return syn::Error::new_spanned(
                variant,
                "Variant cannot be both #[intent] and #[response]",
            )
            .to_compile_error()
            .into();
        }

        let pattern = variant_pattern(&variant.ident, &variant.fields);
        let variant_name = variant.ident.to_string();

        if is_intent {
            intent_arms.push(quote! { #pattern => true, });
        }
        if is_response {
            response_arms.push(quote! { #pattern => true, });
        }
        name_arms.push(quote! { #pattern => #variant_name, });
    }

    let expanded = quote! {
        impl #impl_generics #name #ty_generics #where_clause {
            /// Returns true if this action is a user intent
            #[must_use]
            #[allow(unreachable_patterns)]
            pub const fn is_intent(&self) -> bool {
                match self {
                    #(#intent_arms)*
                    _ => false,
                }
            }

            /// Returns true if this action is the result of an effect
            #[must_use]
            #[allow(unreachable_patterns)]
            pub const fn is_response(&self) -> bool {
                match self {
                    #(#response_arms)*
                    _ => false,
                }
            }

            /// Returns the variant name
            #[must_use]
            pub const fn action_name(&self) -> &'static str {
                match self {
                    #(#name_arms)*
                }
            }
        }
    };

    TokenStream::from(expanded)
}

fn variant_pattern(variant: &Ident, fields: &Fields) -> TokenStream2 {
    match fields {
        Fields::Named(_) => quote! { Self::#variant { .. } },
        Fields::Unnamed(_) => quote! { Self::#variant(..) },
        Fields::Unit => quote! { Self::#variant },
    }
}

/// Helper function to check if an attribute list contains a specific attribute
fn has_attribute(attrs: &[Attribute], name: &str) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident(name))
}

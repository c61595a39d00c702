//! Shared utilities for autorelease procedural macro crates.
//!
//! Provides crate-path resolution so that generated code emits correct
//! fully-qualified paths regardless of whether the consumer depends on
//! an individual autorelease crate or the `autorelease` umbrella re-export,
//! plus the small signature helpers every attribute macro needs.

use proc_macro_crate::{FoundCrate, crate_name};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Attribute, FnArg, Pat, ReturnType, Signature, Type};

/// An autorelease crate that macro-generated code may reference.
pub enum AutoreleaseCrate {
    /// `autorelease_component`
    Component,
    /// `autorelease_extras`
    Extras,
}

impl AutoreleaseCrate {
    /// Returns the `Cargo.toml` package name for this crate.
    fn as_str(&self) -> &'static str {
        match self {
            Self::Component => "autorelease_component",
            Self::Extras => "autorelease_extras",
        }
    }
}

/// Returns a [`TokenStream`] path for the given autorelease crate.
///
/// Resolution order:
/// 1. Direct dependency (possibly renamed in `Cargo.toml`).
/// 2. Indirect access via the `autorelease` umbrella crate (`autorelease::<name>`).
/// 3. Fallback to the literal crate name (compile error will point the user
///    to the missing dependency).
pub fn resolve_crate_path(krate: AutoreleaseCrate) -> TokenStream {
    let name = krate.as_str();

    match crate_name(name) {
        Ok(FoundCrate::Itself) => {
            let ident = format_ident!("{}", name);
            quote!(#ident)
        }
        Ok(FoundCrate::Name(found)) => {
            let ident = format_ident!("{}", found);
            quote!(#ident)
        }
        Err(_) => match crate_name("autorelease") {
            Ok(FoundCrate::Name(found)) => {
                let umbrella = format_ident!("{}", found);
                let ident = format_ident!("{}", name);
                quote!(#umbrella::#ident)
            }
            _ => {
                let ident = format_ident!("{}", name);
                quote!(#ident)
            }
        },
    }
}

/// Checks if a return type is `Result<..>` (including single-argument aliases
/// such as `anyhow::Result<T>` or `io::Result<T>`).
#[must_use]
pub fn is_result_type(return_type: &ReturnType) -> bool {
    if let ReturnType::Type(_, ty) = return_type
        && let Type::Path(type_path) = ty.as_ref()
        && let Some(segment) = type_path.path.segments.last()
    {
        return segment.ident == "Result";
    }
    false
}

/// Validates a method signature that an attribute macro is about to wrap.
///
/// Wrapped methods must borrow their receiver (`&self` or `&mut self`),
/// must be synchronous, and must bind every argument to a plain identifier
/// so the wrapper can forward it. `attr` names the attribute in messages.
pub fn validate_wrapped_method(sig: &Signature, attr: &str) -> Option<TokenStream> {
    if let Some(asyncness) = &sig.asyncness {
        return Some(
            syn::Error::new_spanned(
                asyncness,
                format!("#[{attr}] cannot be applied to async methods"),
            )
            .to_compile_error(),
        );
    }

    match sig.inputs.first() {
        Some(FnArg::Receiver(receiver)) if receiver.reference.is_none() => {
            return Some(
                syn::Error::new_spanned(
                    receiver,
                    format!("#[{attr}] methods must take `&self` or `&mut self`, not `self` by value"),
                )
                .to_compile_error(),
            );
        }
        Some(FnArg::Receiver(_)) => {}
        _ => {
            return Some(
                syn::Error::new_spanned(
                    sig.fn_token,
                    format!("#[{attr}] methods must take `&self` or `&mut self` as the first parameter"),
                )
                .to_compile_error(),
            );
        }
    }

    for arg in sig.inputs.iter().skip(1) {
        if let FnArg::Typed(pat_type) = arg
            && !matches!(&*pat_type.pat, Pat::Ident(_))
        {
            return Some(
                syn::Error::new_spanned(
                    &pat_type.pat,
                    format!("#[{attr}] method parameters must be simple identifiers"),
                )
                .to_compile_error(),
            );
        }
    }

    None
}

/// Returns the identifiers of every non-receiver argument, in order.
///
/// Call only after [`validate_wrapped_method`] succeeded.
#[must_use]
pub fn argument_idents(sig: &Signature) -> Vec<syn::Ident> {
    sig.inputs
        .iter()
        .filter_map(|arg| match arg {
            FnArg::Typed(pat_type) => match &*pat_type.pat {
                Pat::Ident(pat_ident) => Some(pat_ident.ident.clone()),
                _ => None,
            },
            FnArg::Receiver(_) => None,
        })
        .collect()
}

/// Builds the turbofish used to forward a method's own type parameters
/// (`::<A, B>`), or nothing if the method is not generic over types.
#[must_use]
pub fn forward_type_params(sig: &Signature) -> TokenStream {
    let params: Vec<_> = sig.generics.type_params().map(|param| &param.ident).collect();
    if params.is_empty() {
        quote! {}
    } else {
        quote! { ::<#(#params),*> }
    }
}

/// Removes `mut` and `ref` from every argument binding.
///
/// Wrappers only forward their arguments, so binding modes copied from the
/// wrapped method would trigger `unused_mut` in the generated code.
pub fn strip_binding_modes(sig: &mut Signature) {
    for arg in &mut sig.inputs {
        if let FnArg::Typed(pat_type) = arg
            && let Pat::Ident(pat_ident) = &mut *pat_type.pat
        {
            pat_ident.mutability = None;
            pat_ident.by_ref = None;
        }
    }
}

/// Splits a wrapped method's attributes between the generated wrapper and
/// the hidden method that keeps the original body.
///
/// Lint attributes stay with the body they apply to, `cfg` goes to both,
/// and everything else (docs, other attribute macros) goes to the wrapper.
/// Returns `(wrapper, body)`.
#[must_use]
pub fn split_wrapped_attrs(attrs: &[Attribute]) -> (Vec<Attribute>, Vec<Attribute>) {
    const LINT_ATTRS: [&str; 5] = ["allow", "expect", "warn", "deny", "forbid"];

    let mut wrapper = Vec::new();
    let mut body = Vec::new();
    for attr in attrs {
        let path = attr.path();
        if path.is_ident("cfg") {
            wrapper.push(attr.clone());
            body.push(attr.clone());
        } else if LINT_ATTRS.iter().any(|lint| path.is_ident(lint)) {
            body.push(attr.clone());
        } else {
            wrapper.push(attr.clone());
        }
    }
    (wrapper, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_result_return_types() {
        let sig: Signature = syn::parse_quote! { fn a(&self) -> Result<u8, Error> };
        assert!(is_result_type(&sig.output));

        let sig: Signature = syn::parse_quote! { fn a(&self) -> anyhow::Result<u8> };
        assert!(is_result_type(&sig.output));

        let sig: Signature = syn::parse_quote! { fn a(&self) -> Option<u8> };
        assert!(!is_result_type(&sig.output));

        let sig: Signature = syn::parse_quote! { fn a(&self) };
        assert!(!is_result_type(&sig.output));
    }

    #[test]
    fn rejects_by_value_and_missing_receivers() {
        let sig: Signature = syn::parse_quote! { fn a(self) };
        assert!(validate_wrapped_method(&sig, "subscribes").is_some());

        let sig: Signature = syn::parse_quote! { fn a(value: u8) };
        assert!(validate_wrapped_method(&sig, "subscribes").is_some());

        let sig: Signature = syn::parse_quote! { async fn a(&self) };
        assert!(validate_wrapped_method(&sig, "subscribes").is_some());

        let sig: Signature = syn::parse_quote! { fn a(&mut self, (x, y): (u8, u8)) };
        assert!(validate_wrapped_method(&sig, "subscribes").is_some());
    }

    #[test]
    fn accepts_borrowed_receivers() {
        let sig: Signature = syn::parse_quote! { fn a(&self, value: u8) -> u8 };
        assert!(validate_wrapped_method(&sig, "timer").is_none());

        let sig: Signature = syn::parse_quote! { fn a(&mut self) };
        assert!(validate_wrapped_method(&sig, "timer").is_none());
    }

    #[test]
    fn collects_argument_idents_in_order() {
        let sig: Signature = syn::parse_quote! { fn a(&self, first: u8, second: &str) };
        let idents: Vec<String> = argument_idents(&sig).iter().map(ToString::to_string).collect();
        assert_eq!(idents, vec!["first", "second"]);
    }

    #[test]
    fn forwards_only_type_params() {
        let sig: Signature = syn::parse_quote! { fn a<'x, T: Clone>(&self, value: &'x T) };
        let rendered = forward_type_params(&sig).to_string();
        assert!(rendered.contains('T'));
        assert!(!rendered.contains("'x"));

        let sig: Signature = syn::parse_quote! { fn a(&self) };
        assert!(forward_type_params(&sig).is_empty());
    }

    #[test]
    fn strips_binding_modes_from_arguments() {
        let mut sig: Signature = syn::parse_quote! { fn a(&mut self, mut value: u8, ref name: String) };
        strip_binding_modes(&mut sig);
        let stripped: Signature = syn::parse_quote! { fn a(&mut self, value: u8, name: String) };
        assert_eq!(quote!(#sig).to_string(), quote!(#stripped).to_string());
    }

    #[test]
    fn splits_attributes_between_wrapper_and_body() {
        let item: syn::ImplItemFn = syn::parse_quote! {
            /// Docs.
            #[cfg(feature = "x")]
            #[expect(clippy::unused_self, reason = "test")]
            #[inline]
            fn a(&self) {}
        };
        let (wrapper, body) = split_wrapped_attrs(&item.attrs);

        let names = |attrs: &[Attribute]| -> Vec<String> {
            attrs
                .iter()
                .filter_map(|attr| attr.path().get_ident().map(ToString::to_string))
                .collect()
        };
        assert_eq!(names(&wrapper), vec!["doc", "cfg", "inline"]);
        assert_eq!(names(&body), vec!["cfg", "expect"]);
    }
}

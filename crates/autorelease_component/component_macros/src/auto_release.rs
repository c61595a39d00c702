//! Code generation for `#[auto_release]` on impl blocks.

use autorelease_macro_utils::{
    AutoreleaseCrate, argument_idents, forward_type_params, is_result_type, resolve_crate_path,
    split_wrapped_attrs, strip_binding_modes, validate_wrapped_method,
};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{ImplItem, ImplItemFn, ItemImpl, LitStr, ReturnType};

/// Teardown method intercepted when none is named.
const DEFAULT_TEARDOWN: &str = "on_destroy";

/// Parsed `#[auto_release(...)]` arguments.
pub(crate) struct AutoReleaseArgs {
    teardown: String,
}

impl Default for AutoReleaseArgs {
    fn default() -> Self {
        Self {
            teardown: DEFAULT_TEARDOWN.to_owned(),
        }
    }
}

impl AutoReleaseArgs {
    /// Parses `teardown = "name"`; everything else is rejected.
    pub(crate) fn parse(attr: proc_macro2::TokenStream) -> syn::Result<Self> {
        let mut args = Self::default();
        let parser = syn::meta::parser(|meta| {
            if meta.path.is_ident("teardown") {
                let name: LitStr = meta.value()?.parse()?;
                syn::parse_str::<syn::Ident>(&name.value())
                    .map_err(|_| syn::Error::new(name.span(), "teardown must name a method"))?;
                args.teardown = name.value();
                Ok(())
            } else {
                Err(meta.error("unsupported #[auto_release] option, expected `teardown = \"name\"`"))
            }
        });
        syn::parse::Parser::parse2(parser, attr)?;
        Ok(args)
    }
}

/// Generates the managed impl block, the `AutoRelease` flag and, when the
/// teardown signature allows it, a `Teardown` impl.
pub(crate) fn generate_auto_release(args: &AutoReleaseArgs, input: &ItemImpl) -> TokenStream {
    let ac = resolve_crate_path(AutoreleaseCrate::Component);

    if let Some((_, trait_path, _)) = &input.trait_ {
        return syn::Error::new_spanned(
            trait_path,
            "#[auto_release] must be applied to an inherent impl block",
        )
        .to_compile_error();
    }

    let teardown_name = &args.teardown;
    let teardown_ident = format_ident!("{}", teardown_name);
    let original_ident = format_ident!("__autorelease_original_{}", teardown_name);

    let mut items = Vec::with_capacity(input.items.len() + 1);
    let mut generic_teardown = true;
    let mut found = false;

    for item in &input.items {
        match item {
            ImplItem::Fn(method) if method.sig.ident == teardown_ident => {
                if let Some(err) = validate_wrapped_method(&method.sig, "auto_release") {
                    return err;
                }
                found = true;
                generic_teardown = method.sig.inputs.len() == 1
                    && method.sig.generics.params.is_empty()
                    && !is_result_type(&method.sig.output);
                items.extend(wrap_teardown(&ac, method, &original_ident));
            }
            other => items.push(quote! { #other }),
        }
    }

    if !found {
        items.push(quote! {
            /// Releases every collected resource of this component.
            ///
            /// # Errors
            ///
            /// Returns the first release failure; later resources are not released.
            pub fn #teardown_ident(&mut self) -> ::core::result::Result<(), #ac::ReleaseError> {
                #ac::release_all(&*self).map(|_| ())
            }
        });
    }

    let self_ty = &input.self_ty;
    let attrs = &input.attrs;
    let (impl_generics, _ty_generics, where_clause) = input.generics.split_for_impl();

    let teardown_impl = if generic_teardown {
        quote! {
            impl #impl_generics #ac::Teardown for #self_ty #where_clause {
                fn teardown(&mut self) -> ::core::result::Result<(), #ac::ReleaseError> {
                    Self::#teardown_ident(self).map(|_| ())
                }
            }
        }
    } else {
        quote! {}
    };

    quote! {
        #(#attrs)*
        impl #impl_generics #self_ty #where_clause {
            #(#items)*
        }

        impl #impl_generics #ac::AutoRelease for #self_ty #where_clause {
            const SETTINGS: #ac::AutoReleaseSettings =
                #ac::AutoReleaseSettings::new().with_teardown(#teardown_name);
        }

        #teardown_impl
    }
}

/// Moves the user's teardown body to a hidden method and puts a wrapper that
/// releases first in its place.
fn wrap_teardown(
    ac: &TokenStream,
    method: &ImplItemFn,
    original_ident: &syn::Ident,
) -> [TokenStream; 2] {
    let (wrapper_attrs, body_attrs) = split_wrapped_attrs(&method.attrs);

    let mut original = method.clone();
    original.attrs = body_attrs;
    original.vis = syn::Visibility::Inherited;
    original.sig.ident = original_ident.clone();

    let mut sig = method.sig.clone();
    strip_binding_modes(&mut sig);
    let args = argument_idents(&sig);
    let turbofish = forward_type_params(&sig);
    let vis = &method.vis;
    let call = quote! { self.#original_ident #turbofish (#(#args),*) };

    let body = if is_result_type(&sig.output) {
        quote! {
            #ac::release_all(&*self)?;
            #call
        }
    } else {
        let output = match &sig.output {
            ReturnType::Default => quote! { () },
            ReturnType::Type(_, ty) => quote! { #ty },
        };
        sig.output = syn::parse_quote! {
            -> ::core::result::Result<#output, #ac::ReleaseError>
        };
        quote! {
            #ac::release_all(&*self)?;
            ::core::result::Result::Ok(#call)
        }
    };

    [
        quote! {
            #[doc(hidden)]
            #original
        },
        quote! {
            #(#wrapper_attrs)*
            #vis #sig {
                #body
            }
        },
    ]
}

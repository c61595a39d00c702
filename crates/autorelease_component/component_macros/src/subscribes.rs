//! Code generation for `#[subscribes]` on methods.

use autorelease_macro_utils::{
    AutoreleaseCrate, argument_idents, forward_type_params, is_result_type, resolve_crate_path,
    split_wrapped_attrs, strip_binding_modes, validate_wrapped_method,
};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{ImplItemFn, ReturnType};

/// Parsed `#[subscribes(...)]` arguments.
#[derive(Default)]
pub(crate) struct SubscribesArgs {
    ignore_missing: bool,
}

impl SubscribesArgs {
    /// Parses the optional `ignore_missing` flag.
    pub(crate) fn parse(attr: TokenStream) -> syn::Result<Self> {
        let mut args = Self::default();
        let parser = syn::meta::parser(|meta| {
            if meta.path.is_ident("ignore_missing") {
                args.ignore_missing = true;
                Ok(())
            } else {
                Err(meta.error("unsupported #[subscribes] option, expected `ignore_missing`"))
            }
        });
        syn::parse::Parser::parse2(parser, attr)?;
        Ok(args)
    }
}

/// Generates the hidden body method and the collecting wrapper.
pub(crate) fn generate_subscribes(args: &SubscribesArgs, method: &ImplItemFn) -> TokenStream {
    if let Some(err) = validate_wrapped_method(&method.sig, "subscribes") {
        return err;
    }

    let ac = resolve_crate_path(AutoreleaseCrate::Component);
    let method_name = method.sig.ident.to_string();
    let inner_ident = format_ident!("__autorelease_subscribes_{}", method.sig.ident);

    let (wrapper_attrs, body_attrs) = split_wrapped_attrs(&method.attrs);

    let mut inner = method.clone();
    inner.attrs = body_attrs;
    inner.vis = syn::Visibility::Inherited;
    inner.sig.ident = inner_ident.clone();

    let mut sig = method.sig.clone();
    strip_binding_modes(&mut sig);
    let call_args = argument_idents(&sig);
    let turbofish = forward_type_params(&sig);
    let vis = &method.vis;

    let settings = if args.ignore_missing {
        quote! { #ac::SubscribesSettings::new().ignore_missing() }
    } else {
        quote! { #ac::SubscribesSettings::new() }
    };

    let returns_result = is_result_type(&sig.output);
    let call = if returns_result {
        quote! { self.#inner_ident #turbofish (#(#call_args),*)? }
    } else {
        let output = match &sig.output {
            ReturnType::Default => quote! { () },
            ReturnType::Type(_, ty) => quote! { #ty },
        };
        sig.output = syn::parse_quote! {
            -> ::core::result::Result<#output, #ac::UsageError>
        };
        quote! { self.#inner_ident #turbofish (#(#call_args),*) }
    };

    quote! {
        #[doc(hidden)]
        #inner

        #(#wrapper_attrs)*
        #vis #sig {
            static __COLLECTOR: #ac::MethodResultCollector =
                #ac::MethodResultCollector::new(#method_name, #settings);

            let __value = #call;
            let __class = {
                use #ac::__private::{ManagedProbe as _, UnmanagedProbe as _};
                (&#ac::__private::Probe::<Self>::new()).auto_release_settings()
            };
            {
                use #ac::__private::{ViaMaybeReleasable as _, ViaOpaque as _};
                __COLLECTOR.collect(
                    &*self,
                    __class.as_ref(),
                    (&#ac::__private::Field(&__value)).candidate(),
                )?;
            }
            ::core::result::Result::Ok(__value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(attr: TokenStream, method: ImplItemFn) -> String {
        let args = SubscribesArgs::parse(attr).unwrap();
        generate_subscribes(&args, &method).to_string()
    }

    #[test]
    fn parses_ignore_missing() {
        assert!(SubscribesArgs::parse(quote! { ignore_missing }).unwrap().ignore_missing);
        assert!(!SubscribesArgs::parse(quote! {}).unwrap().ignore_missing);
        assert!(SubscribesArgs::parse(quote! { strict }).is_err());
    }

    #[test]
    fn wraps_plain_return_in_usage_result() {
        let tokens = expand(
            quote! {},
            syn::parse_quote! {
                pub fn connect(&self, url: &str) -> Subscription { open(url) }
            },
        );
        assert!(tokens.contains("__autorelease_subscribes_connect"));
        assert!(tokens.contains("UsageError"));
        assert!(tokens.contains("\"connect\""));
    }

    #[test]
    fn keeps_result_signatures() {
        let tokens = expand(
            quote! { ignore_missing },
            syn::parse_quote! {
                fn connect(&mut self) -> Result<Subscription, FeedError> { todo!() }
            },
        );
        assert!(!tokens.contains("UsageError >"));
        assert!(tokens.contains("ignore_missing ()"));
    }

    #[test]
    fn rejects_async_methods() {
        let tokens = expand(quote! {}, syn::parse_quote! { async fn connect(&self) {} });
        assert!(tokens.contains("compile_error"));
    }
}

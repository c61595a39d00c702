//! Code generation for `#[timer]` on methods.

use autorelease_macro_utils::{
    AutoreleaseCrate, argument_idents, forward_type_params, resolve_crate_path, split_wrapped_attrs,
    strip_binding_modes, validate_wrapped_method,
};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Expr, ExprLit, ExprPath, ImplItemFn, Lit, LitStr};

enum LabelArg {
    Literal(LitStr),
    Function(ExprPath),
}

/// Parsed `#[timer(...)]` arguments.
#[derive(Default)]
pub(crate) struct TimerArgs {
    label: Option<LabelArg>,
    skip: Option<ExprPath>,
    log: Option<ExprPath>,
}

impl TimerArgs {
    /// Parses `label = "..." | path`, `skip = path` and `log = path`.
    pub(crate) fn parse(name: &str, attr: TokenStream) -> syn::Result<Self> {
        let mut args = Self::default();
        let parser = syn::meta::parser(|meta| {
            if meta.path.is_ident("label") {
                args.label = Some(match meta.value()?.parse::<Expr>()? {
                    Expr::Lit(ExprLit {
                        lit: Lit::Str(label),
                        ..
                    }) => LabelArg::Literal(label),
                    Expr::Path(path) => LabelArg::Function(path),
                    other => {
                        return Err(syn::Error::new_spanned(
                            other,
                            "`label` expects a string literal or a function path",
                        ));
                    }
                });
                Ok(())
            } else if meta.path.is_ident("skip") {
                args.skip = Some(meta.value()?.parse()?);
                Ok(())
            } else if meta.path.is_ident("log") {
                args.log = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error(format!(
                    "unsupported #[{name}] option, expected `label`, `skip` or `log`"
                )))
            }
        });
        syn::parse::Parser::parse2(parser, attr)?;
        Ok(args)
    }
}

/// Generates the hidden body method and the timing wrapper.
pub(crate) fn generate_timer(name: &str, args: &TimerArgs, method: &ImplItemFn) -> TokenStream {
    if let Some(err) = validate_wrapped_method(&method.sig, name) {
        return err;
    }

    let ae = resolve_crate_path(AutoreleaseCrate::Extras);
    let method_name = method.sig.ident.to_string();
    let inner_ident = format_ident!("__autorelease_timed_{}", method.sig.ident);

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

    let mut options = quote! { #ae::TimerOptions::new() };
    match &args.label {
        Some(LabelArg::Literal(label)) => options.extend(quote! { .with_label(#label) }),
        Some(LabelArg::Function(label)) => options.extend(quote! { .with_label_fn(#label) }),
        None => {}
    }
    if let Some(log) = &args.log {
        options.extend(quote! { .with_log(#log) });
    }

    let rendered = if call_args.is_empty() {
        quote! { ::std::vec::Vec::new() }
    } else {
        quote! {{
            use #ae::__private::{ViaDebug as _, ViaDisplay as _, ViaPlaceholder as _};
            ::std::vec![#((&&&#ae::__private::Arg(&#call_args)).render()),*]
        }}
    };

    let skip = args.skip.as_ref().map(|skip| {
        quote! {
            if #skip(&*self, &__args) {
                return self.#inner_ident #turbofish (#(#call_args),*);
            }
        }
    });

    quote! {
        #[doc(hidden)]
        #inner

        #(#wrapper_attrs)*
        #vis #sig {
            static __TIMER: ::std::sync::LazyLock<#ae::Timer> =
                ::std::sync::LazyLock::new(|| #ae::Timer::new(#method_name, #options));

            let __args: ::std::vec::Vec<::std::string::String> = #rendered;
            #skip
            __TIMER.time(
                ::core::any::type_name::<Self>(),
                &__args,
                || self.#inner_ident #turbofish (#(#call_args),*),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(attr: TokenStream, method: ImplItemFn) -> String {
        let args = TimerArgs::parse("timer", attr).unwrap();
        generate_timer("timer", &args, &method).to_string()
    }

    #[test]
    fn parses_every_option() {
        let args = TimerArgs::parse(
            "timer",
            quote! { label = "Page.load", skip = Page::hidden, log = record },
        )
        .unwrap();
        assert!(matches!(args.label, Some(LabelArg::Literal(_))));
        assert!(args.skip.is_some());
        assert!(args.log.is_some());

        let args = TimerArgs::parse("timer", quote! { label = label_for }).unwrap();
        assert!(matches!(args.label, Some(LabelArg::Function(_))));
    }

    #[test]
    fn rejects_unknown_options() {
        assert!(TimerArgs::parse("timer", quote! { verbose }).is_err());
        assert!(TimerArgs::parse("timer", quote! { label = 3 }).is_err());
    }

    #[test]
    fn keeps_the_signature() {
        let tokens = expand(
            quote! {},
            syn::parse_quote! {
                pub fn load(&self, page: u32) -> String { page.to_string() }
            },
        );
        assert!(tokens.contains("__autorelease_timed_load"));
        assert!(tokens.contains("-> String"));
        assert!(tokens.contains("\"load\""));
        assert!(tokens.contains("ViaDisplay"));
    }

    #[test]
    fn argumentless_methods_render_nothing() {
        let tokens = expand(quote! { log = record }, syn::parse_quote! { fn tick(&mut self) {} });
        assert!(!tokens.contains("ViaDisplay"));
        assert!(tokens.contains("with_log"));
        assert!(tokens.contains("record"));
    }

    #[test]
    fn skip_runs_the_body_untimed() {
        let tokens = expand(
            quote! { skip = hidden },
            syn::parse_quote! { fn tick(&self) {} },
        );
        assert!(tokens.contains("hidden"));
        assert!(tokens.contains("return self . __autorelease_timed_tick"));
    }

    #[test]
    fn rejects_by_value_receivers() {
        let tokens = expand(quote! {}, syn::parse_quote! { fn tick(self) {} });
        assert!(tokens.contains("compile_error"));
    }
}

//! Procedural macros for the `autorelease_extras` crate.

mod timer;

use proc_macro::TokenStream;

/// Times every call of a method.
///
/// The method must take `&self` or `&mut self`; its signature and return
/// value are unchanged. Calls are counted per method, across all instances.
///
/// | Option | Value |
/// |--------|-------|
/// | `label` | a string literal, or a `fn(&CallSite, &[String]) -> String` path |
/// | `skip` | a `fn(&Self, &[String]) -> bool` path, checked before the call |
/// | `log` | a `fn(&TimerLogEntry)` path; defaults to a `tracing::info!` record |
///
/// Arguments are rendered with `Display`, else `Debug`, else `_`.
/// `label` and `log` paths are evaluated in a `static`, so they cannot
/// mention `Self`.
///
/// # Example
///
/// ```ignore
/// #[timer(label = "Table.render", skip = Table::is_hidden)]
/// fn render(&self, rows: usize) -> String {
///     "...".repeat(rows)
/// }
/// ```
#[proc_macro_attribute]
pub fn timer(attr: TokenStream, item: TokenStream) -> TokenStream {
    expand("timer", attr, item)
}

/// Alias of [`timer`](macro@timer).
#[proc_macro_attribute]
pub fn time_performance(attr: TokenStream, item: TokenStream) -> TokenStream {
    expand("time_performance", attr, item)
}

fn expand(name: &str, attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = match timer::TimerArgs::parse(name, attr.into()) {
        Ok(args) => args,
        Err(err) => return err.to_compile_error().into(),
    };
    let method = syn::parse_macro_input!(item as syn::ImplItemFn);
    timer::generate_timer(name, &args, &method).into()
}

//! Procedural macros for the `autorelease_component` crate.
//!
//! - `#[derive(Component)]` makes a struct scannable
//! - `#[auto_release]` marks its type teardown-managed and wraps the teardown method
//! - `#[subscribes]` collects a method's releasable results
//!
//! # Example
//!
//! ```ignore
//! #[derive(Component)]
//! struct Panel {
//!     state: InstanceState,
//! }
//!
//! #[auto_release]
//! impl Panel {
//!     #[subscribes]
//!     fn connect(&self) -> Subscription {
//!         Subscription::new(|| {})
//!     }
//! }
//! ```

mod auto_release;
mod component;
mod subscribes;

use proc_macro::TokenStream;

/// Implements `Component` for a struct.
///
/// Every field is visited as a property in declaration order. A field typed
/// `InstanceState`, or tagged `#[component(state)]`, becomes the instance
/// state and is not visited. `#[component(skip)]` leaves a field out.
///
/// Field types without a `MaybeReleasable` impl are visited as holding
/// nothing. In generic structs, a field of parameter type `T` is only
/// scanned if the struct declares `T: MaybeReleasable`.
///
/// # Example
///
/// ```ignore
/// #[derive(Component)]
/// struct Feed {
///     socket: Subscription,
///     #[component(skip)]
///     backup: Subscription,
///     state: InstanceState,
/// }
/// ```
#[proc_macro_derive(Component, attributes(component))]
pub fn derive_component(item: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(item as syn::DeriveInput);
    component::derive_component(&input).into()
}

/// Marks a component type as teardown-managed.
///
/// Applied to an inherent `impl` block. The teardown method (`on_destroy`
/// unless `teardown = "name"` says otherwise) is replaced by a wrapper that
/// releases every property and every collected result, then runs the
/// original body.
///
/// | Original return | Wrapper return |
/// |-----------------|----------------|
/// | `R` | `Result<R, ReleaseError>` |
/// | `Result<T, E>` | `Result<T, E>`, requires `E: From<ReleaseError>` |
/// | no such method | `pub fn name(&mut self) -> Result<(), ReleaseError>` is generated |
///
/// `AutoRelease` is implemented for the type, and so is `Teardown` when
/// the teardown takes no arguments and does not return a `Result`. A second
/// `#[auto_release]` block for the same type fails to compile.
///
/// # Example
///
/// ```ignore
/// #[auto_release(teardown = "close")]
/// impl Feed {
///     fn close(&mut self) {
///         self.open = false;
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn auto_release(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = match auto_release::AutoReleaseArgs::parse(attr.into()) {
        Ok(args) => args,
        Err(err) => return err.to_compile_error().into(),
    };
    let input = syn::parse_macro_input!(item as syn::ItemImpl);
    auto_release::generate_auto_release(&args, &input).into()
}

/// Collects the releasable results of a method into its bucket.
///
/// The method must take `&self` or `&mut self`. After each successful call
/// the result is normalized and its releasables are appended to the
/// instance's bucket for this method. A plain return type `R` becomes
/// `Result<R, UsageError>`; a `Result<T, E>` keeps its signature, returns
/// errors from the body without collecting, and requires
/// `E: From<UsageError>`.
///
/// Calls fail with a `UsageError` when the type has no `#[auto_release]`
/// block, or when the result holds nothing releasable. `ignore_missing`
/// turns the latter into a silent no-op.
///
/// # Example
///
/// ```ignore
/// #[subscribes(ignore_missing)]
/// fn maybe_connect(&self, enabled: bool) -> Option<Subscription> {
///     enabled.then(|| Subscription::new(|| {}))
/// }
/// ```
#[proc_macro_attribute]
pub fn subscribes(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = match subscribes::SubscribesArgs::parse(attr.into()) {
        Ok(args) => args,
        Err(err) => return err.to_compile_error().into(),
    };
    let method = syn::parse_macro_input!(item as syn::ImplItemFn);
    subscribes::generate_subscribes(&args, &method).into()
}

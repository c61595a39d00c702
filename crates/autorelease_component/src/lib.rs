//! Automatic release of subscriptions when components are torn down.
//!
//! `autorelease_component` tracks cancellable resources produced by a
//! component's methods and releases all of them, exactly once, when the
//! component's teardown method runs:
//!
//! - [`releasable`] - the [`Releasable`] capability and result normalization
//! - [`component`] - the [`Component`] trait and per-instance [`InstanceState`]
//! - [`collector`] - the [`MethodResultCollector`] behind `#[subscribes]`
//! - [`teardown`] - the injector behind `#[auto_release]`
//! - [`subscription`] - a concrete cancellable [`Subscription`]
//! - [`error`] - [`UsageError`] and [`ReleaseError`]
//!
//! # Lifecycle
//!
//! | Stage | What happens |
//! |-------|--------------|
//! | Construction | the component starts with an empty [`InstanceState`] |
//! | `#[subscribes]` calls | each call's releasables are appended to the method's bucket |
//! | Teardown | properties, then buckets, are released; the original teardown runs last |
//!
//! # Example
//!
//! ```
//! use autorelease_component::prelude::*;
//!
//! #[derive(Component)]
//! struct Ticker {
//!     label: String,
//!     state: InstanceState,
//! }
//!
//! #[auto_release]
//! impl Ticker {
//!     #[subscribes]
//!     fn start(&self) -> Subscription {
//!         Subscription::new(|| {})
//!     }
//!
//!     fn on_destroy(&mut self) {
//!         self.label.clear();
//!     }
//! }
//!
//! let mut ticker = Ticker { label: "cpu".into(), state: InstanceState::new() };
//! let first = ticker.start().unwrap();
//! let second = ticker.start().unwrap();
//!
//! ticker.on_destroy().unwrap();
//!
//! assert!(first.is_closed() && second.is_closed());
//! assert!(ticker.label.is_empty());
//! ```

// Self-reference so that macro-generated `autorelease_component::` paths
// resolve inside this crate's own tests.
extern crate self as autorelease_component;

/// Method result collection.
pub mod collector;

/// Scannable components and their instance state.
pub mod component;

/// Error types.
pub mod error;

/// The releasable capability.
pub mod releasable;

/// Cancellable subscriptions.
pub mod subscription;

/// Teardown injection.
pub mod teardown;

#[doc(hidden)]
#[path = "private.rs"]
pub mod __private;

pub use collector::{MethodResultCollector, SubscribesSettings};
pub use component::{BucketKey, Component, InstanceState, find_all_releasable};
pub use error::{ReleaseError, UsageError};
pub use releasable::{
    MaybeReleasable, Releasable, ReleaseHandle, ReleaseIdentity, is_releasable, releasables_in,
};
pub use subscription::Subscription;
pub use teardown::{
    AutoRelease, AutoReleaseSettings, DEFAULT_TEARDOWN, Teardown, release_all, run_teardown,
};

/// Re-export the `#[derive(Component)]` macro.
pub use autorelease_component_macros::Component;

/// Re-export the `#[auto_release]` and `#[subscribes]` attribute macros.
pub use autorelease_component_macros::{auto_release, subscribes};

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::collector::*;
    pub use crate::component::*;
    pub use crate::error::*;
    pub use crate::releasable::*;
    pub use crate::subscription::*;
    pub use crate::teardown::*;
    pub use crate::{Component, auto_release, subscribes};
}

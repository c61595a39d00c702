//! Automatic release of subscriptions and other cancellable resources when
//! components are torn down.
//!
//! ```
//! use autorelease::prelude::*;
//!
//! #[derive(Component)]
//! struct Feed {
//!     status: Observed<&'static str>,
//!     state: InstanceState,
//! }
//!
//! #[auto_release]
//! impl Feed {
//!     #[subscribes]
//!     fn follow(&self) -> Subscription {
//!         self.status.observe().subscribe(|_| {})
//!     }
//! }
//!
//! let mut feed = Feed { status: Observed::new("idle"), state: InstanceState::new() };
//! let sub = feed.follow().unwrap();
//! feed.on_destroy().unwrap();
//! assert!(sub.is_closed());
//! ```

/// Layer 1: components, collection and teardown.
pub use autorelease_component;

/// Layer 2: timing, observed properties and tracing setup.
pub use autorelease_extras;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use autorelease_component::prelude::*;
    pub use autorelease_extras::{
        Clock, Observable, Observed, Timer, TimerLogEntry, TimerOptions, TracingConfig,
        TracingFormat, time_performance, timer,
    };
}

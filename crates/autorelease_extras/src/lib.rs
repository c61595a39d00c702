//! Companions to `autorelease_component`.
//!
//! | Module | Provides |
//! |--------|----------|
//! | [`timer`] | `#[timer]` / `#[time_performance]` call timing |
//! | [`observe`] | [`Observed`] properties projected to [`Observable`] streams |
//! | [`time`] | the [`Clock`] timers read from |
//! | [`tracing_setup`] | [`TracingConfig`] subscriber installation |
//!
//! # Example
//!
//! ```
//! use autorelease_component::prelude::*;
//! use autorelease_extras::{Observed, timer};
//!
//! fn quiet(_: &autorelease_extras::TimerLogEntry) {}
//!
//! #[derive(Component)]
//! struct Gauge {
//!     reading: Observed<u32>,
//!     state: InstanceState,
//! }
//!
//! #[auto_release]
//! impl Gauge {
//!     #[subscribes]
//!     fn watch(&self) -> Subscription {
//!         self.reading.observe().subscribe(|_| {})
//!     }
//!
//!     #[timer(log = quiet)]
//!     fn sample(&self, value: u32) {
//!         self.reading.set(value);
//!     }
//! }
//!
//! let mut gauge = Gauge { reading: Observed::new(0), state: InstanceState::new() };
//! gauge.watch().unwrap();
//! gauge.sample(7);
//! assert_eq!(gauge.reading.observe().listener_count(), 1);
//!
//! gauge.on_destroy().unwrap();
//! assert_eq!(gauge.reading.observe().listener_count(), 0);
//! ```

// Self-reference so that macro-generated `autorelease_extras::` paths
// resolve inside this crate's own tests.
extern crate self as autorelease_extras;

/// Observed properties.
pub mod observe;

/// Time sources.
pub mod time;

/// Method call timing.
pub mod timer;

/// Subscriber setup.
pub mod tracing_setup;

#[doc(hidden)]
#[path = "private.rs"]
pub mod __private;

#[cfg(any(test, feature = "test-utils"))]
pub use time::MockClock;
pub use observe::{Observable, Observed};
pub use time::{Clock, ClockProvider};
pub use timer::{CallSite, Label, LabelFn, LogFn, Timer, TimerLogEntry, TimerOptions, log_entry};
pub use tracing_setup::{TracingConfig, TracingFormat};

pub use autorelease_extras_macros::{time_performance, timer};

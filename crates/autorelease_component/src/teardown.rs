//! The class teardown injector.
//!
//! `#[auto_release]` marks a component type as teardown-managed and wraps its
//! teardown method. The wrapper calls [`release_all`] first and the original
//! teardown afterwards. This module holds the runtime half of that contract.
//!
//! # Release order
//!
//! | Step | Source | Order |
//! |------|--------|-------|
//! | 1 | Properties | declaration order, items within a collection in sequence order |
//! | 2 | Buckets | bucket creation order, items in append order |
//! | 3 | Original teardown | always, after every release succeeded |
//!
//! Releases run one at a time. The first failure aborts the pass: the remaining
//! items are not attempted, the original teardown does not run, and the error
//! reaches the caller unchanged.
//!
//! # Repeated teardown
//!
//! Buckets are drained by a teardown pass. Handles released by an earlier
//! pass are remembered on the [`InstanceState`] by their
//! [`ReleaseIdentity`](crate::ReleaseIdentity) and skipped by later passes,
//! which still run the original teardown. Tokio task handles are matched by
//! task id, everything else by the shared handle it was collected as. Within a single pass nothing is
//! deduplicated: a handle collected twice is released twice.

use crate::component::{Component, InstanceState, property_releasables};
use crate::error::ReleaseError;

/// Teardown method intercepted when `#[auto_release]` names none.
pub const DEFAULT_TEARDOWN: &str = "on_destroy";

/// Configuration recorded by `#[auto_release]`.
///
/// # Example
///
/// ```
/// use autorelease_component::{AutoReleaseSettings, DEFAULT_TEARDOWN};
///
/// const SETTINGS: AutoReleaseSettings = AutoReleaseSettings::new().with_teardown("shutdown");
///
/// assert_eq!(SETTINGS.teardown(), "shutdown");
/// assert_eq!(AutoReleaseSettings::default().teardown(), DEFAULT_TEARDOWN);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoReleaseSettings {
    teardown: &'static str,
}

impl AutoReleaseSettings {
    /// Creates settings that intercept [`DEFAULT_TEARDOWN`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            teardown: DEFAULT_TEARDOWN,
        }
    }

    /// Sets the name of the intercepted teardown method.
    #[must_use]
    pub const fn with_teardown(mut self, teardown: &'static str) -> Self {
        self.teardown = teardown;
        self
    }

    /// Returns the name of the intercepted teardown method.
    #[must_use]
    pub const fn teardown(&self) -> &'static str {
        self.teardown
    }
}

impl Default for AutoReleaseSettings {
    fn default() -> Self {
        Self::new()
    }
}

/// Marks a component type as teardown-managed.
///
/// Emitted by `#[auto_release]`. A type can carry at most one such block;
/// a second one is rejected as a conflicting implementation.
pub trait AutoRelease: Component {
    /// Settings the type was annotated with.
    const SETTINGS: AutoReleaseSettings;
}

/// Generic entry point for hosts that tear components down.
///
/// `#[auto_release]` implements this when the teardown method takes no
/// arguments and does not return a `Result` of its own.
pub trait Teardown {
    /// Releases every collected resource, then runs the original teardown.
    ///
    /// # Errors
    ///
    /// Returns the first [`ReleaseError`] raised by a release.
    fn teardown(&mut self) -> Result<(), ReleaseError>;
}

/// Releases every releasable reachable from a component.
///
/// Returns the number of release calls made. See the
/// [module documentation](self) for ordering and repeated-teardown rules.
///
/// # Errors
///
/// Returns the first [`ReleaseError`] raised; later items are not attempted.
pub fn release_all<C: Component + ?Sized>(instance: &C) -> Result<usize, ReleaseError> {
    let component = instance.component_name();
    let state = instance.instance_state();
    let previous = state.map_or(0, InstanceState::begin_teardown);

    let mut pending = property_releasables(instance);
    if let Some(state) = state {
        pending.extend(state.drain_buckets());
    }

    // Checked before this pass marks anything, so in-pass duplicates survive.
    let total = pending.len();
    if let Some(state) = state {
        pending.retain(|handle| !state.was_released(handle));
    }
    let skipped = total - pending.len();

    if previous > 0 {
        tracing::warn!(
            component,
            teardown = previous + 1,
            skipped,
            "component torn down more than once"
        );
    }

    for handle in &pending {
        handle.release().inspect_err(|err| {
            tracing::debug!(
                component,
                resource = handle.type_name(),
                error = %err,
                "release failed, aborting teardown"
            );
        })?;
        if let Some(state) = state {
            state.mark_released(handle);
        }
    }

    tracing::debug!(component, released = pending.len(), "released collected resources");
    Ok(pending.len())
}

/// Releases everything, then runs `original` on the same instance and
/// returns its result.
///
/// This is what the wrapper generated by `#[auto_release]` does, usable by
/// hand for components that do not use the attribute.
///
/// # Errors
///
/// Returns the first [`ReleaseError`] raised; `original` is not called.
///
/// # Example
///
/// ```
/// use autorelease_component::{Component, InstanceState, Subscription, run_teardown};
///
/// #[derive(Component)]
/// struct Feed {
///     socket: Subscription,
///     closed: bool,
///     state: InstanceState,
/// }
///
/// let mut feed = Feed {
///     socket: Subscription::new(|| {}),
///     closed: false,
///     state: InstanceState::new(),
/// };
///
/// let socket = feed.socket.clone();
/// run_teardown(&mut feed, |feed| feed.closed = true).unwrap();
///
/// assert!(socket.is_closed());
/// assert!(feed.closed);
/// ```
pub fn run_teardown<C, R>(
    instance: &mut C,
    original: impl FnOnce(&mut C) -> R,
) -> Result<R, ReleaseError>
where
    C: Component + ?Sized,
{
    release_all(&*instance)?;
    Ok(original(instance))
}

//! The releasable capability and result-shape normalization.
//!
//! Anything that can be cancelled or cleaned up with a single call is a
//! [`Releasable`]. Values that may or may not carry releasables (method
//! results, component properties) are probed through [`MaybeReleasable`],
//! which answers two questions:
//!
//! - **Capability**: is this value itself releasable? ([`MaybeReleasable::as_releasable`])
//! - **Sequence-likeness**: is this value a collection of candidates?
//!   ([`MaybeReleasable::as_sequence`])
//!
//! # Normalization
//!
//! [`releasables_in`] turns any value into a flat list of handles:
//!
//! | Value shape | Becomes |
//! |-------------|---------|
//! | Sequence (`Vec`, slice, array, tuple, `Option`, ...) | its items, spread one level |
//! | Single releasable | a one-element list |
//! | Anything else | an empty list |
//!
//! Items of a sequence are tested for the capability but never spread again,
//! so a `Vec<Vec<Subscription>>` yields nothing.
//!
//! # Example
//!
//! ```
//! use autorelease_component::{MaybeReleasable, Subscription, is_releasable, releasables_in};
//!
//! struct Unrelated;
//! impl MaybeReleasable for Unrelated {}
//!
//! let single = Subscription::new(|| {});
//! assert!(is_releasable(&single));
//! assert_eq!(releasables_in(&single).len(), 1);
//!
//! let mixed = (Subscription::new(|| {}), Subscription::new(|| {}), Unrelated);
//! assert!(!is_releasable(&mixed));
//! assert_eq!(releasables_in(&mixed).len(), 2);
//! ```

mod impls;

use std::sync::Arc;

use downcast_rs::{DowncastSync, impl_downcast};

use crate::error::ReleaseError;

/// A value exposing a single-call release operation.
///
/// Releasing cancels a subscription, aborts a task, or frees whatever the
/// value stands for. The auto-release machinery only guarantees that
/// `release` is *invoked* once per collected item; whether the underlying
/// resource honors it is up to the implementation.
///
/// Implementations should tolerate repeated calls, since hosts outside the
/// component lifecycle may release a value more than once.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use autorelease_component::{Releasable, ReleaseError};
///
/// struct Connection {
///     open: AtomicBool,
/// }
///
/// impl Releasable for Connection {
///     fn release(&self) -> Result<(), ReleaseError> {
///         self.open.store(false, Ordering::SeqCst);
///         Ok(())
///     }
/// }
///
/// let connection = Arc::new(Connection { open: AtomicBool::new(true) });
/// connection.release().unwrap();
/// assert!(!connection.open.load(Ordering::SeqCst));
/// ```
pub trait Releasable: DowncastSync {
    /// Releases the underlying resource.
    ///
    /// # Errors
    ///
    /// Returns a [`ReleaseError`] if the resource could not be released.
    fn release(&self) -> Result<(), ReleaseError>;

    /// Returns the type name for debugging purposes.
    fn type_name(&self) -> &'static str {
        core::any::type_name::<Self>()
    }

    /// Returns what identifies the underlying resource across handles.
    ///
    /// `None`, the default, identifies a handle by its allocation, so only
    /// clones of the same [`ReleaseHandle`] match. Types whose probes build a
    /// fresh handle each time (tokio task handles) return a stable key here.
    fn identity(&self) -> Option<ReleaseIdentity> {
        None
    }
}

impl_downcast!(sync Releasable);

/// A shared, type-erased handle to a [`Releasable`].
///
/// Handles are what buckets store and what teardown releases. Cloning a
/// handle shares the same underlying resource.
pub type ReleaseHandle = Arc<dyn Releasable>;

/// Identity of a released resource, used to skip it on later teardowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReleaseIdentity {
    /// The address of the shared handle.
    Address(usize),
    /// A spawned tokio task.
    Task(tokio::task::Id),
}

/// Returns an identity for a handle, stable for as long as the handle lives.
pub(crate) fn handle_identity(handle: &ReleaseHandle) -> ReleaseIdentity {
    handle
        .identity()
        .unwrap_or_else(|| ReleaseIdentity::Address(Arc::as_ptr(handle).cast::<()>().addr()))
}

/// Probing interface for values that may hold releasables.
///
/// Both methods default to "no", so opting a type out is an empty impl:
///
/// ```
/// use autorelease_component::MaybeReleasable;
///
/// struct Settings { verbose: bool }
/// impl MaybeReleasable for Settings {}
/// ```
///
/// Collections answer [`as_sequence`](Self::as_sequence); releasable values
/// answer [`as_releasable`](Self::as_releasable). A value should answer at
/// most one of the two; if both are answered the sequence wins.
pub trait MaybeReleasable {
    /// Returns a handle if this value is itself releasable.
    fn as_releasable(&self) -> Option<ReleaseHandle> {
        None
    }

    /// Returns the candidate items if this value is a collection.
    fn as_sequence(&self) -> Option<Vec<&dyn MaybeReleasable>> {
        None
    }
}

/// Returns `true` if the value itself is releasable.
///
/// Collections are never releasable themselves, even if every item is.
#[must_use]
pub fn is_releasable(value: &dyn MaybeReleasable) -> bool {
    value.as_releasable().is_some()
}

/// Normalizes a value into a sequence and keeps the releasable items.
///
/// See the [module documentation](self) for the normalization rules.
#[must_use]
pub fn releasables_in(value: &dyn MaybeReleasable) -> Vec<ReleaseHandle> {
    match value.as_sequence() {
        Some(items) => items
            .into_iter()
            .filter_map(MaybeReleasable::as_releasable)
            .collect(),
        None => value.as_releasable().into_iter().collect(),
    }
}

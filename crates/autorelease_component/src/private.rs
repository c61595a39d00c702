//! Support items for macro-generated code. Not public API.
//!
//! Both probes use autoref specialization: the generated code calls a method
//! on `&Probe`. If the "specific" trait holds for the probed type, its impl on
//! the probe itself is selected; otherwise method resolution autorefs once
//! more and finds the fallback impl on `&Probe`.

use core::marker::PhantomData;

use crate::releasable::MaybeReleasable;
use crate::teardown::{AutoRelease, AutoReleaseSettings};

/// Detects whether a component type is teardown-managed.
pub struct Probe<T: ?Sized>(PhantomData<T>);

impl<T: ?Sized> Probe<T> {
    /// Creates the probe.
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

/// Selected when the probed type implements [`AutoRelease`].
pub trait ManagedProbe {
    /// Returns the type's annotation settings.
    fn auto_release_settings(&self) -> Option<AutoReleaseSettings>;
}

impl<T: AutoRelease> ManagedProbe for Probe<T> {
    fn auto_release_settings(&self) -> Option<AutoReleaseSettings> {
        Some(T::SETTINGS)
    }
}

/// Fallback for types without an `#[auto_release]` block.
pub trait UnmanagedProbe {
    /// Returns `None`.
    fn auto_release_settings(&self) -> Option<AutoReleaseSettings> {
        None
    }
}

impl<T: ?Sized> UnmanagedProbe for &Probe<T> {}

/// Wraps a field or method result so that types without a
/// [`MaybeReleasable`] impl are treated as holding nothing.
pub struct Field<'a, T>(pub &'a T);

/// Selected when the field type implements [`MaybeReleasable`].
pub trait ViaMaybeReleasable {
    /// Passes the field to the visitor.
    fn visit_field(&self, name: &'static str, visit: &mut dyn FnMut(&'static str, &dyn MaybeReleasable));

    /// Returns the wrapped value for normalization.
    fn candidate(&self) -> &dyn MaybeReleasable;
}

impl<T: MaybeReleasable> ViaMaybeReleasable for Field<'_, T> {
    fn visit_field(&self, name: &'static str, visit: &mut dyn FnMut(&'static str, &dyn MaybeReleasable)) {
        visit(name, self.0);
    }

    fn candidate(&self) -> &dyn MaybeReleasable {
        self.0
    }
}

/// Fallback for field types that cannot hold releasables.
pub trait ViaOpaque {
    /// Does nothing.
    fn visit_field(&self, _name: &'static str, _visit: &mut dyn FnMut(&'static str, &dyn MaybeReleasable)) {}

    /// Returns a value that holds nothing.
    fn candidate(&self) -> &dyn MaybeReleasable {
        &()
    }
}

impl<T> ViaOpaque for &Field<'_, T> {}

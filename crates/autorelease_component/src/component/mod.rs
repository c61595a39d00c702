//! Components: types whose properties and collected results can be scanned.
//!
//! A [`Component`] exposes two things to the auto-release machinery:
//!
//! - its ordinary properties, visited in declaration order
//! - its [`InstanceState`], which holds the per-method buckets
//!
//! Implement it with `#[derive(Component)]`:
//!
//! ```
//! use autorelease_component::{Component, InstanceState, Subscription, find_all_releasable};
//!
//! #[derive(Component)]
//! struct Panel {
//!     title: String,
//!     refresh: Subscription,
//!     state: InstanceState,
//! }
//!
//! let panel = Panel {
//!     title: "cpu".into(),
//!     refresh: Subscription::new(|| {}),
//!     state: InstanceState::new(),
//! };
//!
//! assert_eq!(find_all_releasable(&panel).len(), 1);
//! ```

mod state;

pub use state::{BucketKey, InstanceState};

use crate::releasable::{MaybeReleasable, ReleaseHandle, releasables_in};

/// A type whose instances can be scanned for releasables.
///
/// Usually derived. Fields whose type does not implement
/// [`MaybeReleasable`] are visited as nothing; the state field is never
/// visited as a property.
pub trait Component {
    /// Returns the name used in bucket keys and diagnostics.
    fn component_name(&self) -> &'static str {
        core::any::type_name::<Self>()
    }

    /// Visits every property, in declaration order, with its name.
    fn visit_properties(&self, visit: &mut dyn FnMut(&'static str, &dyn MaybeReleasable));

    /// Returns the instance's bucket storage, if it has one.
    fn instance_state(&self) -> Option<&InstanceState>;
}

/// Enumerates every releasable reachable from a component without releasing
/// anything.
///
/// Properties come first, in declaration order, each normalized the same way
/// as [`releasables_in`]. Bucket contents follow, in bucket creation order.
#[must_use]
pub fn find_all_releasable<C: Component + ?Sized>(instance: &C) -> Vec<ReleaseHandle> {
    let mut found = property_releasables(instance);
    if let Some(state) = instance.instance_state() {
        found.extend(state.snapshot());
    }
    found
}

/// Normalizes and filters every property of a component.
pub(crate) fn property_releasables<C: Component + ?Sized>(instance: &C) -> Vec<ReleaseHandle> {
    let mut found = Vec::new();
    instance.visit_properties(&mut |_, value| found.extend(releasables_in(value)));
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Subscription;

    struct Manual {
        single: Subscription,
        list: Vec<Subscription>,
        count: u32,
        state: InstanceState,
    }

    impl Component for Manual {
        fn visit_properties(&self, visit: &mut dyn FnMut(&'static str, &dyn MaybeReleasable)) {
            visit("single", &self.single);
            visit("list", &self.list);
            visit("count", &self.count);
        }

        fn instance_state(&self) -> Option<&InstanceState> {
            Some(&self.state)
        }
    }

    fn manual() -> Manual {
        Manual {
            single: Subscription::new(|| {}),
            list: vec![Subscription::new(|| {}), Subscription::new(|| {})],
            count: 3,
            state: InstanceState::new(),
        }
    }

    #[test]
    fn properties_then_buckets() {
        let instance = manual();
        let collected = Subscription::new(|| {});
        instance
            .state
            .append("Manual", "connect", releasables_in(&collected));

        let found = find_all_releasable(&instance);
        assert_eq!(found.len(), 4);

        let first = Subscription::from_handle(&found[0]).unwrap();
        let last = Subscription::from_handle(&found[3]).unwrap();
        assert!(first.same_as(&instance.single));
        assert!(last.same_as(&collected));
    }

    #[test]
    fn enumeration_does_not_release() {
        let instance = manual();
        let _ = find_all_releasable(&instance);
        assert!(!instance.single.is_closed());
        assert!(instance.list.iter().all(|sub| !sub.is_closed()));
    }

    #[test]
    fn default_name_is_type_name() {
        assert!(manual().component_name().ends_with("Manual"));
    }
}

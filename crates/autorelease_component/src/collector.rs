//! The method result collector behind `#[subscribes]`.
//!
//! After every call of a decorated method, its return value is checked and
//! collected in this order:
//!
//! 1. The component type must be teardown-managed (`#[auto_release]`),
//!    checked on every call.
//! 2. The component must have an [`InstanceState`](crate::InstanceState).
//! 3. The value is normalized and filtered ([`releasables_in`]).
//! 4. An empty result is a usage error unless `ignore_missing` is set, in
//!    which case nothing is collected.
//! 5. The releasables are appended to the method's bucket.
//!
//! A failing check collects nothing. Usage errors go to the diagnostic sink
//! (`tracing::error!`) before they are returned.

use crate::component::Component;
use crate::error::UsageError;
use crate::releasable::{MaybeReleasable, releasables_in};
use crate::teardown::{AutoRelease, AutoReleaseSettings};

/// Options accepted by `#[subscribes]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubscribesSettings {
    ignore_missing: bool,
}

impl SubscribesSettings {
    /// Creates the default settings: an empty result is an error.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ignore_missing: false,
        }
    }

    /// Accept results with nothing releasable instead of failing.
    #[must_use]
    pub const fn ignore_missing(mut self) -> Self {
        self.ignore_missing = true;
        self
    }

    /// Returns `true` if empty results are accepted.
    #[must_use]
    pub const fn ignores_missing(&self) -> bool {
        self.ignore_missing
    }
}

/// Collects the results of one decorated method into per-instance buckets.
///
/// One collector exists per decorated method; `#[subscribes]` stores it in a
/// `static`.
///
/// # Example
///
/// ```
/// use autorelease_component::{
///     Component, InstanceState, MethodResultCollector, Subscription, SubscribesSettings,
///     auto_release,
/// };
///
/// #[derive(Component)]
/// struct Panel {
///     state: InstanceState,
/// }
///
/// #[auto_release]
/// impl Panel {}
///
/// static CONNECT: MethodResultCollector =
///     MethodResultCollector::new("connect", SubscribesSettings::new());
///
/// let panel = Panel { state: InstanceState::new() };
/// let collected = CONNECT.collect_managed(&panel, &Subscription::new(|| {})).unwrap();
///
/// assert_eq!(collected, 1);
/// assert_eq!(panel.state.bucket_len("connect"), 1);
/// ```
#[derive(Debug)]
pub struct MethodResultCollector {
    method: &'static str,
    settings: SubscribesSettings,
}

impl MethodResultCollector {
    /// Creates a collector for the named method.
    #[must_use]
    pub const fn new(method: &'static str, settings: SubscribesSettings) -> Self {
        Self { method, settings }
    }

    /// Returns the decorated method's name.
    #[must_use]
    pub const fn method(&self) -> &'static str {
        self.method
    }

    /// Returns the collector's settings.
    #[must_use]
    pub const fn settings(&self) -> SubscribesSettings {
        self.settings
    }

    /// Checks and collects one call result.
    ///
    /// `class` carries the component's `#[auto_release]` settings, or `None`
    /// if the type is not teardown-managed. Returns how many releasables were
    /// appended.
    ///
    /// # Errors
    ///
    /// Returns a [`UsageError`] if the type is not teardown-managed, has no
    /// instance state, or the result holds nothing releasable (unless
    /// `ignore_missing` is set).
    pub fn collect<C: Component + ?Sized>(
        &self,
        instance: &C,
        class: Option<&AutoReleaseSettings>,
        result: &dyn MaybeReleasable,
    ) -> Result<usize, UsageError> {
        let component = instance.component_name();

        if class.is_none() {
            return Err(self.report(UsageError::MissingClassAnnotation {
                component,
                method: self.method,
            }));
        }

        let Some(state) = instance.instance_state() else {
            return Err(self.report(UsageError::MissingInstanceState { component }));
        };

        let handles = releasables_in(result);
        if handles.is_empty() {
            if self.settings.ignore_missing {
                tracing::debug!(
                    component,
                    method = self.method,
                    "no releasable result, ignored"
                );
                return Ok(0);
            }
            return Err(self.report(UsageError::NoReleasableResult {
                component,
                method: self.method,
            }));
        }

        let collected = handles.len();
        state.append(component, self.method, handles);
        tracing::debug!(component, method = self.method, collected, "collected releasables");
        Ok(collected)
    }

    /// [`collect`](Self::collect) for a type known to be teardown-managed.
    ///
    /// # Errors
    ///
    /// Same as [`collect`](Self::collect), minus the missing annotation case.
    pub fn collect_managed<C: AutoRelease>(
        &self,
        instance: &C,
        result: &dyn MaybeReleasable,
    ) -> Result<usize, UsageError> {
        self.collect(instance, Some(&C::SETTINGS), result)
    }

    fn report(&self, err: UsageError) -> UsageError {
        tracing::error!(method = self.method, "{err}");
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::InstanceState;
    use crate::subscription::Subscription;

    struct Plain {
        state: Option<InstanceState>,
    }

    impl Component for Plain {
        fn component_name(&self) -> &'static str {
            "Plain"
        }

        fn visit_properties(&self, _: &mut dyn FnMut(&'static str, &dyn MaybeReleasable)) {}

        fn instance_state(&self) -> Option<&InstanceState> {
            self.state.as_ref()
        }
    }

    const MANAGED: AutoReleaseSettings = AutoReleaseSettings::new();

    fn with_state() -> Plain {
        Plain {
            state: Some(InstanceState::new()),
        }
    }

    #[test]
    fn unmanaged_class_fails_every_call() {
        let collector = MethodResultCollector::new("connect", SubscribesSettings::new());
        let instance = with_state();

        for _ in 0..2 {
            let err = collector
                .collect(&instance, None, &Subscription::new(|| {}))
                .unwrap_err();
            assert_eq!(
                err,
                UsageError::MissingClassAnnotation {
                    component: "Plain",
                    method: "connect"
                }
            );
        }
        assert!(instance.state.as_ref().unwrap().buckets().is_empty());
    }

    #[test]
    fn missing_state_is_reported() {
        let collector = MethodResultCollector::new("connect", SubscribesSettings::new());
        let instance = Plain { state: None };

        let err = collector
            .collect(&instance, Some(&MANAGED), &Subscription::new(|| {}))
            .unwrap_err();
        assert_eq!(err, UsageError::MissingInstanceState { component: "Plain" });
    }

    #[test]
    fn empty_result_fails_without_collecting() {
        let collector = MethodResultCollector::new("connect", SubscribesSettings::new());
        let instance = with_state();

        let err = collector
            .collect(&instance, Some(&MANAGED), &vec![1_u8, 2, 3])
            .unwrap_err();
        assert!(matches!(err, UsageError::NoReleasableResult { .. }));
        assert!(instance.state.as_ref().unwrap().buckets().is_empty());
    }

    #[test]
    fn ignore_missing_collects_nothing_silently() {
        let settings = SubscribesSettings::new().ignore_missing();
        let collector = MethodResultCollector::new("connect", settings);
        let instance = with_state();

        assert!(settings.ignores_missing());
        assert_eq!(collector.collect(&instance, Some(&MANAGED), &()).unwrap(), 0);
        assert!(instance.state.as_ref().unwrap().buckets().is_empty());
    }

    #[test]
    fn results_accumulate_across_calls() {
        let collector = MethodResultCollector::new("connect", SubscribesSettings::new());
        let instance = with_state();

        for _ in 0..3 {
            let pair = (Subscription::new(|| {}), Subscription::new(|| {}));
            assert_eq!(collector.collect(&instance, Some(&MANAGED), &pair).unwrap(), 2);
        }
        assert_eq!(instance.state.as_ref().unwrap().bucket_len("connect"), 6);
    }

    #[tracing_test::traced_test]
    #[test]
    fn usage_errors_reach_the_diagnostic_sink() {
        let collector = MethodResultCollector::new("connect", SubscribesSettings::new());
        let instance = with_state();

        let _ = collector.collect(&instance, None, &Subscription::new(|| {}));

        assert!(logs_contain("can only be used on a component"));
        assert!(logs_contain("connect"));
    }
}

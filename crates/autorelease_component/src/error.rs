//! Error types for the auto-release subsystem.
//!
//! Two concerns are kept apart:
//!
//! - [`UsageError`] - misuse of the annotation contract, detected when a
//!   `#[subscribes]` method runs.
//! - [`ReleaseError`] - a failure reported by a [`Releasable`](crate::Releasable)
//!   while it was being released. It propagates unchanged to whoever invoked
//!   the teardown.

/// Caller-facing validation failure signaling misuse of the annotation contract.
///
/// Usage errors are reported to the diagnostic sink (`tracing::error!`)
/// before being returned, and are never recovered internally.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UsageError {
    /// A `#[subscribes]` method ran on a component whose type carries no
    /// `#[auto_release]` block.
    #[error(
        "#[subscribes] on `{method}` can only be used on a component that has an #[auto_release] block (`{component}` has none)"
    )]
    MissingClassAnnotation {
        /// Type name of the component.
        component: &'static str,
        /// Name of the decorated method.
        method: &'static str,
    },

    /// A `#[subscribes]` method returned nothing releasable and the
    /// `ignore_missing` option was not set.
    #[error(
        "#[subscribes] requires `{component}::{method}` to return a subscription or a collection with subscriptions"
    )]
    NoReleasableResult {
        /// Type name of the component.
        component: &'static str,
        /// Name of the decorated method.
        method: &'static str,
    },

    /// The component has no [`InstanceState`](crate::InstanceState) field to
    /// hold collected subscriptions.
    #[error(
        "`{component}` has no InstanceState field; add one (or tag a field with #[component(state)]) to use #[subscribes]"
    )]
    MissingInstanceState {
        /// Type name of the component.
        component: &'static str,
    },
}

/// A failure raised while releasing a [`Releasable`](crate::Releasable).
///
/// Teardown aborts on the first release failure: the remaining items are not
/// attempted and the error surfaces to the caller unchanged.
#[derive(Debug, thiserror::Error)]
pub enum ReleaseError {
    /// The resource refused or failed to release.
    #[error("failed to release {resource}: {reason}")]
    Failed {
        /// Human-readable name of the resource.
        resource: String,
        /// Why the release failed.
        reason: String,
    },

    /// An error produced by the underlying resource.
    #[error(transparent)]
    Source(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl ReleaseError {
    /// Creates a [`ReleaseError::Failed`] for the named resource.
    pub fn failed(resource: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Failed {
            resource: resource.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_error_messages_name_the_method() {
        let err = UsageError::MissingClassAnnotation {
            component: "app::Widget",
            method: "poll",
        };
        let message = err.to_string();
        assert!(message.contains("poll"));
        assert!(message.contains("app::Widget"));
        assert!(message.contains("#[auto_release]"));

        let err = UsageError::NoReleasableResult {
            component: "app::Widget",
            method: "poll",
        };
        assert!(err.to_string().contains("app::Widget::poll"));
    }

    #[test]
    fn release_error_from_boxed_source() {
        let source: Box<dyn std::error::Error + Send + Sync> = "socket already closed".into();
        let err = ReleaseError::from(source);
        assert_eq!(err.to_string(), "socket already closed");
    }

    #[test]
    fn release_error_failed_constructor() {
        let err = ReleaseError::failed("timer", "still armed");
        assert_eq!(err.to_string(), "failed to release timer: still armed");
    }
}

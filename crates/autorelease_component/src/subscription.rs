//! A concrete cancellable subscription handle.
//!
//! [`Subscription`] wraps a teardown closure and follows the usual reactive
//! subscription contract:
//!
//! - releasing runs the teardown at most once, then marks the subscription closed
//! - child subscriptions added with [`Subscription::add`] are released after
//!   the parent's own teardown, even when that teardown fails
//! - adding a child to an already closed subscription releases the child immediately
//!
//! Clones share state, so a clone kept by a component and a clone collected
//! into a bucket are the same subscription.

use std::sync::Arc;
use core::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::error::ReleaseError;
use crate::releasable::{MaybeReleasable, Releasable, ReleaseHandle};

type TeardownFn = Box<dyn FnOnce() -> Result<(), ReleaseError> + Send>;

/// Shared state behind every clone of a [`Subscription`].
pub(crate) struct SubscriptionInner {
    closed: AtomicBool,
    teardown: Mutex<Option<TeardownFn>>,
    children: Mutex<Vec<ReleaseHandle>>,
}

impl Releasable for SubscriptionInner {
    fn release(&self) -> Result<(), ReleaseError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let teardown = self.teardown.lock().take();
        let mut outcome = teardown.map_or(Ok(()), |teardown| teardown());

        // Every child is released even after a failure; the first error wins.
        let children = core::mem::take(&mut *self.children.lock());
        for child in children {
            let released = child.release();
            if outcome.is_ok() {
                outcome = released;
            }
        }

        outcome
    }

    fn type_name(&self) -> &'static str {
        core::any::type_name::<Subscription>()
    }
}

/// A cancellable handle that runs its teardown once when released.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use autorelease_component::{Releasable, Subscription};
///
/// let released = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&released);
/// let subscription = Subscription::new(move || {
///     counter.fetch_add(1, Ordering::SeqCst);
/// });
///
/// subscription.unsubscribe().unwrap();
/// subscription.unsubscribe().unwrap();
///
/// assert!(subscription.is_closed());
/// assert_eq!(released.load(Ordering::SeqCst), 1);
/// ```
#[derive(Clone)]
pub struct Subscription {
    inner: Arc<SubscriptionInner>,
}

impl Subscription {
    /// Creates a subscription that runs `teardown` when released.
    pub fn new(teardown: impl FnOnce() + Send + 'static) -> Self {
        Self::try_new(move || {
            teardown();
            Ok(())
        })
    }

    /// Creates a subscription whose teardown may fail.
    ///
    /// A failed teardown still closes the subscription and releases its
    /// children. The first error is returned from the release call that ran it.
    pub fn try_new(teardown: impl FnOnce() -> Result<(), ReleaseError> + Send + 'static) -> Self {
        Self::from_parts(Some(Box::new(teardown)))
    }

    /// Creates an open subscription with no teardown of its own.
    ///
    /// Useful as a parent that groups children added with [`add`](Self::add).
    #[must_use]
    pub fn empty() -> Self {
        Self::from_parts(None)
    }

    fn from_parts(teardown: Option<TeardownFn>) -> Self {
        Self {
            inner: Arc::new(SubscriptionInner {
                closed: AtomicBool::new(false),
                teardown: Mutex::new(teardown),
                children: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Adds a child that is released together with this subscription.
    ///
    /// If this subscription is already closed, the child is released
    /// immediately.
    ///
    /// # Errors
    ///
    /// Returns the child's [`ReleaseError`] if it had to be released
    /// immediately and failed.
    pub fn add(&self, child: impl Into<ReleaseHandle>) -> Result<(), ReleaseError> {
        let child = child.into();
        {
            let mut children = self.inner.children.lock();
            if !self.is_closed() {
                children.push(child);
                return Ok(());
            }
        }
        child.release()
    }

    /// Returns `true` once the subscription has been released.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Releases the subscription. Equivalent to [`Releasable::release`].
    ///
    /// # Errors
    ///
    /// Returns the teardown's [`ReleaseError`], if any.
    pub fn unsubscribe(&self) -> Result<(), ReleaseError> {
        self.inner.release()
    }

    /// Returns `true` if both values are clones of the same subscription.
    #[must_use]
    pub fn same_as(&self, other: &Subscription) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Recovers a subscription from a type-erased handle, if it is one.
    #[must_use]
    pub fn from_handle(handle: &ReleaseHandle) -> Option<Self> {
        Arc::clone(handle)
            .downcast_arc::<SubscriptionInner>()
            .ok()
            .map(|inner| Self { inner })
    }
}

impl core::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Subscription")
            .field("closed", &self.is_closed())
            .field("children", &self.inner.children.lock().len())
            .finish()
    }
}

impl Releasable for Subscription {
    fn release(&self) -> Result<(), ReleaseError> {
        self.inner.release()
    }
}

impl MaybeReleasable for Subscription {
    fn as_releasable(&self) -> Option<ReleaseHandle> {
        Some(Arc::clone(&self.inner) as ReleaseHandle)
    }
}

impl From<Subscription> for ReleaseHandle {
    fn from(subscription: Subscription) -> Self {
        subscription.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::releasable::releasables_in;
    use core::sync::atomic::AtomicUsize;

    fn counting() -> (Subscription, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let sub = Subscription::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (sub, count)
    }

    #[test]
    fn release_runs_teardown_once() {
        let (sub, count) = counting();
        assert!(!sub.is_closed());

        sub.unsubscribe().unwrap();
        sub.release().unwrap();

        assert!(sub.is_closed());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn clones_share_state() {
        let (sub, count) = counting();
        let clone = sub.clone();

        clone.unsubscribe().unwrap();

        assert!(sub.is_closed());
        assert!(sub.same_as(&clone));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn children_release_after_parent() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let parent_log = Arc::clone(&order);
        let child_log = Arc::clone(&order);

        let parent = Subscription::new(move || parent_log.lock().push("parent"));
        let child = Subscription::new(move || child_log.lock().push("child"));
        parent.add(child.clone()).unwrap();

        parent.unsubscribe().unwrap();

        assert!(child.is_closed());
        assert_eq!(*order.lock(), vec!["parent", "child"]);
    }

    #[test]
    fn adding_to_closed_subscription_releases_child() {
        let parent = Subscription::empty();
        parent.unsubscribe().unwrap();

        let (child, count) = counting();
        parent.add(child.clone()).unwrap();

        assert!(child.is_closed());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failed_teardown_closes_and_reports() {
        let sub = Subscription::try_new(|| Err(ReleaseError::failed("feed", "socket gone")));

        let err = sub.unsubscribe().unwrap_err();
        assert!(err.to_string().contains("socket gone"));
        assert!(sub.is_closed());
        assert!(sub.unsubscribe().is_ok());
    }

    #[test]
    fn failed_teardown_still_releases_children() {
        let parent = Subscription::try_new(|| Err(ReleaseError::failed("feed", "socket gone")));
        let (first, first_count) = counting();
        let (second, second_count) = counting();
        parent.add(first.clone()).unwrap();
        parent.add(second.clone()).unwrap();

        let err = parent.unsubscribe().unwrap_err();

        assert!(err.to_string().contains("socket gone"));
        assert!(first.is_closed());
        assert!(second.is_closed());
        assert_eq!(first_count.load(Ordering::SeqCst), 1);
        assert_eq!(second_count.load(Ordering::SeqCst), 1);
        assert!(parent.unsubscribe().is_ok());
        assert_eq!(first_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failing_child_does_not_stop_its_siblings() {
        let parent = Subscription::empty();
        parent
            .add(Subscription::try_new(|| Err(ReleaseError::failed("poller", "stuck"))))
            .unwrap();
        let (sibling, count) = counting();
        parent.add(sibling.clone()).unwrap();

        let err = parent.unsubscribe().unwrap_err();

        assert!(err.to_string().contains("stuck"));
        assert!(sibling.is_closed());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn handle_round_trips_to_subscription() {
        let (sub, _count) = counting();
        let handle = releasables_in(&sub).remove(0);

        let recovered = Subscription::from_handle(&handle).unwrap();
        assert!(recovered.same_as(&sub));
        assert_eq!(handle.type_name(), core::any::type_name::<Subscription>());
    }
}

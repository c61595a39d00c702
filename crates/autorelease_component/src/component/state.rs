//! Per-instance bookkeeping for auto-release.
//!
//! Every managed component owns one [`InstanceState`]. It holds:
//!
//! | Part | Contents |
//! |------|----------|
//! | Buckets | collected method results, keyed by `(component, method)`, in creation order |
//! | Released set | handles released by an earlier teardown, by identity |
//! | Teardown count | how many teardowns have run on this instance |
//!
//! Buckets are private to one instance; two instances of the same component
//! never share them.

use core::fmt;

use hashbrown::HashMap;
use indexmap::IndexMap;
use parking_lot::Mutex;

use crate::releasable::{ReleaseHandle, ReleaseIdentity, handle_identity};

/// Identifies a collection bucket: the declaring component and method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BucketKey {
    /// Type name of the component the method belongs to.
    pub component: &'static str,
    /// Name of the collecting method.
    pub method: &'static str,
}

impl BucketKey {
    /// Creates a bucket key.
    #[must_use]
    pub const fn new(component: &'static str, method: &'static str) -> Self {
        Self { component, method }
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.component, self.method)
    }
}

#[derive(Default)]
struct StateInner {
    buckets: IndexMap<BucketKey, Vec<ReleaseHandle>>,
    // Keeps released handles alive so their identities cannot be reused.
    released: HashMap<ReleaseIdentity, ReleaseHandle>,
    teardowns: usize,
}

/// Hidden per-instance storage for collected releasables.
///
/// Embed one in a component struct; `#[derive(Component)]` picks it up by
/// type. Interior mutability lets `&self` methods collect results.
///
/// # Example
///
/// ```
/// use autorelease_component::{InstanceState, Subscription, releasables_in};
///
/// let state = InstanceState::new();
/// state.append("Panel", "connect", releasables_in(&Subscription::new(|| {})));
///
/// assert_eq!(state.bucket_len("connect"), 1);
/// assert_eq!(state.teardown_count(), 0);
/// ```
#[derive(Default)]
pub struct InstanceState {
    inner: Mutex<StateInner>,
}

impl InstanceState {
    /// Creates empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends handles to the bucket for `(component, method)`.
    ///
    /// The bucket is created on first use. Existing contents are kept.
    pub fn append(
        &self,
        component: &'static str,
        method: &'static str,
        handles: impl IntoIterator<Item = ReleaseHandle>,
    ) {
        self.inner
            .lock()
            .buckets
            .entry(BucketKey::new(component, method))
            .or_default()
            .extend(handles);
    }

    /// Returns the number of handles collected for `method`, or 0 if none.
    ///
    /// This sums every bucket whose method is `method`, whichever component
    /// declared it. Use [`bucket_size`](Self::bucket_size) to read one bucket.
    #[must_use]
    pub fn bucket_len(&self, method: &str) -> usize {
        self.inner
            .lock()
            .buckets
            .iter()
            .filter(|(key, _)| key.method == method)
            .map(|(_, handles)| handles.len())
            .sum()
    }

    /// Returns the size of the bucket for `key`, or `None` if it was never
    /// created.
    #[must_use]
    pub fn bucket_size(&self, key: &BucketKey) -> Option<usize> {
        self.inner.lock().buckets.get(key).map(Vec::len)
    }

    /// Returns every bucket key with its current size, in creation order.
    #[must_use]
    pub fn buckets(&self) -> Vec<(BucketKey, usize)> {
        self.inner
            .lock()
            .buckets
            .iter()
            .map(|(key, handles)| (*key, handles.len()))
            .collect()
    }

    /// Returns how many teardowns have run on this instance.
    #[must_use]
    pub fn teardown_count(&self) -> usize {
        self.inner.lock().teardowns
    }

    /// Copies out all bucket contents, in bucket creation order.
    pub(crate) fn snapshot(&self) -> Vec<ReleaseHandle> {
        self.inner
            .lock()
            .buckets
            .values()
            .flatten()
            .cloned()
            .collect()
    }

    /// Takes all bucket contents, leaving the buckets empty.
    pub(crate) fn drain_buckets(&self) -> Vec<ReleaseHandle> {
        self.inner
            .lock()
            .buckets
            .values_mut()
            .flat_map(core::mem::take)
            .collect()
    }

    /// Records the start of a teardown and returns how many ran before it.
    pub(crate) fn begin_teardown(&self) -> usize {
        let mut inner = self.inner.lock();
        let previous = inner.teardowns;
        inner.teardowns += 1;
        previous
    }

    /// Returns `true` if the handle was released by an earlier teardown.
    pub(crate) fn was_released(&self, handle: &ReleaseHandle) -> bool {
        self.inner
            .lock()
            .released
            .contains_key(&handle_identity(handle))
    }

    /// Remembers a handle as released.
    pub(crate) fn mark_released(&self, handle: &ReleaseHandle) {
        self.inner
            .lock()
            .released
            .entry(handle_identity(handle))
            .or_insert_with(|| ReleaseHandle::clone(handle));
    }
}

impl fmt::Debug for InstanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("InstanceState")
            .field(
                "buckets",
                &inner
                    .buckets
                    .iter()
                    .map(|(key, handles)| (key.to_string(), handles.len()))
                    .collect::<Vec<_>>(),
            )
            .field("released", &inner.released.len())
            .field("teardowns", &inner.teardowns)
            .finish()
    }
}

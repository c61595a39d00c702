//! Observed properties and their projected streams.
//!
//! [`Observed<T>`] wraps a component field. Every [`set`](Observed::set)
//! publishes the new value to the field's [`Observable<T>`], which behaves
//! like a behavior subject: new listeners immediately receive the current
//! value, then every later one.
//!
//! Listener registrations are [`Subscription`]s, so a `#[subscribes]` method
//! can return them and have them released on teardown.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use parking_lot::Mutex;
//! use autorelease_extras::Observed;
//!
//! let title = Observed::new(String::from("Hello"));
//! let seen = Arc::new(Mutex::new(Vec::new()));
//!
//! let sink = Arc::clone(&seen);
//! let sub = title.observe().subscribe(move |value: &String| sink.lock().push(value.clone()));
//!
//! title.set(String::from("Observable"));
//! sub.unsubscribe().unwrap();
//! title.set(String::from("ignored"));
//!
//! assert_eq!(*seen.lock(), ["Hello", "Observable"]);
//! ```

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use autorelease_component::Subscription;
use parking_lot::Mutex;
use tokio::sync::watch;

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Subject<T> {
    sender: watch::Sender<T>,
    listeners: Mutex<BTreeMap<u64, Listener<T>>>,
    next_id: AtomicU64,
}

impl<T: Clone + Send + Sync + 'static> Subject<T> {
    fn new(value: T) -> Self {
        Self {
            sender: watch::Sender::new(value),
            listeners: Mutex::new(BTreeMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    fn current(&self) -> T {
        self.sender.borrow().clone()
    }

    // Listeners run outside both locks so they may read or set the value.
    fn notify(&self, value: &T) {
        let listeners: Vec<Listener<T>> = self.listeners.lock().values().cloned().collect();
        for listener in listeners {
            listener(value);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Observed
// ─────────────────────────────────────────────────────────────────────────────

/// A property whose changes are published to an [`Observable`].
pub struct Observed<T> {
    subject: Arc<Subject<T>>,
}

impl<T: Clone + Send + Sync + 'static> Observed<T> {
    /// Creates the property with its initial value.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            subject: Arc::new(Subject::new(value)),
        }
    }

    /// Returns a copy of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.subject.current()
    }

    /// Stores `value` and publishes it.
    pub fn set(&self, value: T) {
        self.subject.sender.send_replace(value.clone());
        self.subject.notify(&value);
    }

    /// Modifies the value in place, then publishes the result.
    pub fn update(&self, modify: impl FnOnce(&mut T)) {
        self.subject.sender.send_modify(modify);
        let value = self.subject.current();
        self.subject.notify(&value);
    }

    /// Returns the projected stream of this property.
    #[must_use]
    pub fn observe(&self) -> Observable<T> {
        Observable {
            subject: Arc::clone(&self.subject),
        }
    }
}

impl<T: Clone + Default + Send + Sync + 'static> Default for Observed<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + core::fmt::Debug + Send + Sync + 'static> core::fmt::Debug for Observed<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("Observed").field(&self.get()).finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Observable
// ─────────────────────────────────────────────────────────────────────────────

/// The stream projected from an [`Observed`] property.
///
/// Clones observe the same property.
pub struct Observable<T> {
    subject: Arc<Subject<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            subject: Arc::clone(&self.subject),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Observable<T> {
    /// Returns a copy of the latest value.
    #[must_use]
    pub fn current(&self) -> T {
        self.subject.current()
    }

    /// Registers `listener`, calls it with the current value, and returns
    /// the registration.
    ///
    /// The listener is called on every later publish until the returned
    /// subscription is released.
    pub fn subscribe(&self, listener: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        let listener: Listener<T> = Arc::new(listener);
        let id = self.subject.next_id.fetch_add(1, Ordering::Relaxed);
        self.subject.listeners.lock().insert(id, Arc::clone(&listener));

        listener(&self.current());

        let subject: Weak<Subject<T>> = Arc::downgrade(&self.subject);
        Subscription::new(move || {
            if let Some(subject) = subject.upgrade() {
                subject.listeners.lock().remove(&id);
            }
        })
    }

    /// Returns how many listeners are registered.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.subject.listeners.lock().len()
    }

    /// Returns a receiver for async consumers.
    ///
    /// The receiver starts at the current value, marked as seen.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<T> {
        self.subject.sender.subscribe()
    }
}

impl<T> core::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Observable").finish_non_exhaustive()
    }
}

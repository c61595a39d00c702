//! Time sources for timed methods.
//!
//! - [`ClockProvider`] - anything that can report the current [`Instant`]
//! - [`Clock`] - a cheap, cloneable handle over a provider
//! - `MockClock` - a controllable provider for tests (`test-utils` feature)
//!
//! Timers read the time through a [`Clock`] so that tests can drive
//! durations without sleeping.

use std::sync::Arc;
use std::time::{Duration, Instant};

// ─────────────────────────────────────────────────────────────────────────────
// ClockProvider Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Trait for providing current time.
///
/// Implement this for custom time providers.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::time::Instant;
/// use autorelease_extras::{Clock, ClockProvider};
///
/// /// A clock that always returns a fixed instant.
/// struct FixedClock(Instant);
///
/// impl ClockProvider for FixedClock {
///     fn now(&self) -> Instant {
///         self.0
///     }
/// }
///
/// let start = Instant::now();
/// let clock = Clock::with_provider(Arc::new(FixedClock(start)));
/// assert_eq!(clock.now(), start);
/// ```
pub trait ClockProvider: Send + Sync + 'static {
    /// Returns the current instant.
    fn now(&self) -> Instant;
}

/// System clock provider using `std::time::Instant`.
#[derive(Debug, Clone, Copy, Default)]
struct SystemClock;

impl ClockProvider for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Clock
// ─────────────────────────────────────────────────────────────────────────────

/// Time source handle.
///
/// Uses the system clock by default, but can be built over any
/// [`ClockProvider`]. Clones share the provider.
///
/// # Methods
///
/// - [`Clock::now`] - Returns the current [`Instant`]
/// - [`Clock::elapsed_since`] - Returns duration since a given instant
#[derive(Clone)]
pub struct Clock {
    provider: Arc<dyn ClockProvider>,
}

impl Clock {
    /// Creates a Clock using the system clock.
    #[must_use]
    pub fn system() -> Self {
        Self {
            provider: Arc::new(SystemClock),
        }
    }

    /// Creates a Clock with a custom provider.
    #[must_use]
    pub fn with_provider(provider: Arc<dyn ClockProvider>) -> Self {
        Self { provider }
    }

    /// Returns the current instant.
    #[must_use]
    pub fn now(&self) -> Instant {
        self.provider.now()
    }

    /// Returns the duration elapsed since the given instant.
    ///
    /// Saturates to zero if `earlier` lies in the provider's future.
    #[must_use]
    pub fn elapsed_since(&self, earlier: Instant) -> Duration {
        self.now().saturating_duration_since(earlier)
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::system()
    }
}

impl core::fmt::Debug for Clock {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Clock").finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// MockClock for Testing
// ─────────────────────────────────────────────────────────────────────────────

/// Mock clock for testing with controllable time.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use std::time::{Duration, Instant};
/// use autorelease_extras::{Clock, MockClock};
///
/// let mock = Arc::new(MockClock::new(Instant::now()));
/// let clock = Clock::with_provider(mock.clone());
///
/// let start = clock.now();
/// mock.advance(Duration::from_secs(60));
/// assert_eq!(clock.elapsed_since(start), Duration::from_secs(60));
/// ```
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug)]
pub struct MockClock {
    current: parking_lot::RwLock<Instant>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockClock {
    /// Creates a mock clock set to the given instant.
    #[must_use]
    pub fn new(start: Instant) -> Self {
        Self {
            current: parking_lot::RwLock::new(start),
        }
    }

    /// Advances the clock by the given duration.
    pub fn advance(&self, duration: Duration) {
        *self.current.write() += duration;
    }

    /// Sets the clock to a specific instant.
    pub fn set(&self, instant: Instant) {
        *self.current.write() = instant;
    }

    /// Returns the current instant.
    #[must_use]
    pub fn current(&self) -> Instant {
        *self.current.read()
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl ClockProvider for MockClock {
    fn now(&self) -> Instant {
        self.current()
    }
}

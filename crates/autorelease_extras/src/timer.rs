//! Per-method call timing behind `#[timer]`.
//!
//! One [`Timer`] exists per decorated method and is shared by every instance
//! of the component. Each timed call bumps the method's call counter, adds its
//! duration to the running total, and hands a [`TimerLogEntry`] to the
//! configured log function.
//!
//! | Option | Attribute form | Default |
//! |--------|----------------|---------|
//! | label | `label = "text"` or `label = path` | the method name |
//! | skip | `skip = path` | never skip |
//! | log | `log = path` | [`log_entry`] (`tracing::info!`) |
//!
//! A skipped call runs the method but is neither logged nor counted.

use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::time::Clock;

/// Identifies a timed method for label functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    /// The component type's name.
    pub component: &'static str,
    /// The decorated method's name.
    pub method: &'static str,
}

impl CallSite {
    /// Creates a call site.
    #[must_use]
    pub const fn new(component: &'static str, method: &'static str) -> Self {
        Self { component, method }
    }
}

/// Computes a label from the call site and the rendered arguments.
pub type LabelFn = fn(&CallSite, &[String]) -> String;

/// Receives one entry per logged call.
pub type LogFn = fn(&TimerLogEntry);

/// One logged call of a timed method.
#[derive(Debug, Clone, PartialEq)]
pub struct TimerLogEntry {
    /// Label from the options, or the method name.
    pub label: String,
    /// The decorated method's name.
    pub method: &'static str,
    /// 1-based number of this call among the method's logged calls.
    pub call: u64,
    /// Duration of this call.
    pub duration: Duration,
    /// When the call started.
    pub start: Instant,
    /// When the call returned.
    pub end: Instant,
    /// Sum of all logged durations so far, this call included.
    pub total_duration: Duration,
    /// `total_duration / call`.
    pub avg_duration: Duration,
    /// Rendered arguments, as `[a, b]`.
    pub args: String,
}

/// Where a timer's label comes from.
#[derive(Debug, Clone, Copy, Default)]
pub enum Label {
    /// The method name.
    #[default]
    Method,
    /// A fixed string.
    Literal(&'static str),
    /// Computed per call.
    With(LabelFn),
}

/// Options accepted by `#[timer]`, minus the instance-typed `skip`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimerOptions {
    label: Label,
    log: Option<LogFn>,
}

impl TimerOptions {
    /// Creates the default options: method-name label, `tracing` log.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            label: Label::Method,
            log: None,
        }
    }

    /// Uses a fixed label.
    #[must_use]
    pub const fn with_label(mut self, label: &'static str) -> Self {
        self.label = Label::Literal(label);
        self
    }

    /// Computes the label per call.
    #[must_use]
    pub const fn with_label_fn(mut self, label: LabelFn) -> Self {
        self.label = Label::With(label);
        self
    }

    /// Sends entries to `log` instead of [`log_entry`].
    #[must_use]
    pub const fn with_log(mut self, log: LogFn) -> Self {
        self.log = Some(log);
        self
    }

    /// Returns the label source.
    #[must_use]
    pub const fn label(&self) -> Label {
        self.label
    }
}

#[derive(Debug, Default)]
struct TimerStats {
    calls: u64,
    total: Duration,
}

/// Call statistics for one timed method.
///
/// # Example
///
/// ```
/// use autorelease_extras::{Timer, TimerOptions};
///
/// fn discard(_: &autorelease_extras::TimerLogEntry) {}
///
/// let timer = Timer::new("render", TimerOptions::new().with_log(discard));
/// let rows = timer.time("Table", &["3".to_string()], || vec![1, 2, 3]);
///
/// assert_eq!(rows.len(), 3);
/// assert_eq!(timer.calls(), 1);
/// ```
#[derive(Debug)]
pub struct Timer {
    method: &'static str,
    options: TimerOptions,
    clock: Clock,
    stats: Mutex<TimerStats>,
}

impl Timer {
    /// Creates a timer for the named method, reading the system clock.
    #[must_use]
    pub fn new(method: &'static str, options: TimerOptions) -> Self {
        Self {
            method,
            options,
            clock: Clock::system(),
            stats: Mutex::new(TimerStats::default()),
        }
    }

    /// Replaces the time source.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Returns the decorated method's name.
    #[must_use]
    pub const fn method(&self) -> &'static str {
        self.method
    }

    /// Returns how many calls were logged.
    #[must_use]
    pub fn calls(&self) -> u64 {
        self.stats.lock().calls
    }

    /// Returns the sum of all logged durations.
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        self.stats.lock().total
    }

    /// Runs `call`, records its duration and logs the entry.
    ///
    /// The result is returned unchanged. If `call` panics nothing is recorded.
    pub fn time<R>(&self, component: &'static str, args: &[String], call: impl FnOnce() -> R) -> R {
        let site = CallSite::new(component, self.method);
        let label = match self.options.label {
            Label::Method => self.method.to_owned(),
            Label::Literal(label) => label.to_owned(),
            Label::With(label) => label(&site, args),
        };

        let start = self.clock.now();
        let result = call();
        let end = self.clock.now();
        let duration = end.saturating_duration_since(start);

        let (call, total_duration) = {
            let mut stats = self.stats.lock();
            stats.calls += 1;
            stats.total += duration;
            (stats.calls, stats.total)
        };

        let entry = TimerLogEntry {
            label,
            method: self.method,
            call,
            duration,
            start,
            end,
            total_duration,
            avg_duration: average(total_duration, call),
            args: format!("[{}]", args.join(", ")),
        };
        (self.options.log.unwrap_or(log_entry))(&entry);

        result
    }
}

fn average(total: Duration, calls: u64) -> Duration {
    match u32::try_from(calls) {
        Ok(calls) if calls > 0 => total / calls,
        Ok(_) => Duration::ZERO,
        Err(_) => Duration::from_secs_f64(total.as_secs_f64() / calls as f64),
    }
}

/// The default log function: one structured `tracing::info!` record per call.
pub fn log_entry(entry: &TimerLogEntry) {
    tracing::info!(
        label = %entry.label,
        method = entry.method,
        call = entry.call,
        duration = ?entry.duration,
        total_duration = ?entry.total_duration,
        avg_duration = ?entry.avg_duration,
        args = %entry.args,
        "timed call"
    );
}

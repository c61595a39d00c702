//! A metrics panel that polls a simulated CPU gauge.
//!
//! The panel spawns a polling task and registers listeners on its observed
//! reading. None of them are tracked by hand: `#[subscribes]` collects the
//! task and the listener registrations, and the generated `on_destroy`
//! releases them all.

use std::sync::Arc;
use std::time::Duration;

use autorelease_component::prelude::*;
use autorelease_extras::{Observed, timer};
use parking_lot::Mutex;
use tokio::task::JoinHandle;

/// Deterministic stand-in for a CPU load reading, in percent.
#[must_use]
pub fn simulated_load(tick: u64) -> u32 {
    ((tick * 37 + 11) % 100) as u32
}

/// A dashboard panel showing one gauge.
#[derive(Component)]
pub struct MetricsPanel {
    title: String,
    cpu: Arc<Observed<u32>>,
    #[component(skip)]
    history: Arc<Mutex<Vec<u32>>>,
    alerts: Subscription,
    state: InstanceState,
}

#[auto_release]
impl MetricsPanel {
    /// Creates a panel with an empty history.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            cpu: Arc::new(Observed::new(0)),
            history: Arc::new(Mutex::new(Vec::new())),
            alerts: Subscription::empty(),
            state: InstanceState::new(),
        }
    }

    /// Spawns a task that samples the gauge every `period`.
    ///
    /// Must be called inside a tokio runtime.
    #[subscribes]
    pub fn start_polling(&self, period: Duration) -> JoinHandle<()> {
        let cpu = Arc::clone(&self.cpu);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            let mut tick = 0;
            loop {
                interval.tick().await;
                cpu.set(simulated_load(tick));
                tick += 1;
            }
        })
    }

    /// Records every reading into the panel history.
    #[subscribes]
    pub fn follow_cpu(&self) -> Subscription {
        let history = Arc::clone(&self.history);
        self.cpu
            .observe()
            .subscribe(move |load: &u32| history.lock().push(*load))
    }

    /// Warns about readings above `threshold`.
    ///
    /// The listener hangs off the `alerts` property, so it is released with
    /// the properties rather than through a bucket.
    pub fn watch_threshold(&self, threshold: u32) -> Result<(), ReleaseError> {
        let title = self.title.clone();
        self.alerts.add(self.cpu.observe().subscribe(move |load: &u32| {
            if *load > threshold {
                tracing::warn!(panel = %title, load, threshold, "load above threshold");
            }
        }))
    }

    /// Renders the collected history as a one-line summary.
    #[timer(label = "MetricsPanel.render")]
    pub fn render(&self) -> String {
        let history = self.history.lock();
        let peak = history.iter().max().copied().unwrap_or_default();
        format!("{}: {} samples, peak {}%", self.title, history.len(), peak)
    }

    /// Returns the readings seen so far.
    #[must_use]
    pub fn history(&self) -> Vec<u32> {
        self.history.lock().clone()
    }

    /// Returns the observed gauge.
    #[must_use]
    pub fn cpu(&self) -> &Observed<u32> {
        &self.cpu
    }

    /// Logs the panel's final sample count and returns it.
    pub fn on_destroy(&mut self) -> usize {
        let samples = self.history.lock().len();
        tracing::info!(panel = %self.title, samples, "panel closed");
        samples
    }
}

//! Background tick driver.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, info, warn};

use roomwatch_core::{ReadingSource, SimulatedSource};

use crate::state::AppState;

/// Background collector that ticks the monitor on a fixed period.
pub struct Collector<S = SimulatedSource> {
    state: Arc<AppState<S>>,
    period: Duration,
}

impl<S> Collector<S>
where
    S: ReadingSource + Send + 'static,
{
    /// Create a collector using the configured tick interval.
    pub fn new(state: Arc<AppState<S>>) -> Self {
        let period = Duration::from_secs(state.config.monitor.tick_interval);
        Self { state, period }
    }

    /// Override the tick period.
    #[must_use]
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Start ticking in a background task.
    ///
    /// The first tick runs immediately. The task ends when the stop signal
    /// fires.
    pub fn start(&self) -> JoinHandle<()> {
        let state = Arc::clone(&self.state);
        let period = self.period;
        info!("Starting collector (interval: {}s)", period.as_secs());
        tokio::spawn(async move {
            collect(state, period).await;
        })
    }
}

async fn collect<S: ReadingSource>(state: Arc<AppState<S>>, period: Duration) {
    let mut stop_rx = state.collector.subscribe_stop();
    let mut timer = interval(period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut consecutive_failures = 0u32;

    state.collector.set_running(true);

    loop {
        if *stop_rx.borrow() {
            break;
        }

        tokio::select! {
            _ = timer.tick() => {}
            changed = stop_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                continue;
            }
        }

        match state.refresh().await {
            Ok(report) => {
                consecutive_failures = 0;
                state.collector.record(true);
                debug!(
                    "Tick for {} recorded ({} new alert(s))",
                    report.room,
                    report.new_alerts.len()
                );
            }
            Err(e) => {
                consecutive_failures += 1;
                state.collector.record(false);
                if consecutive_failures <= 3 {
                    warn!("Tick failed: {} (attempt {})", e, consecutive_failures);
                } else if consecutive_failures == 4 {
                    error!(
                        "Tick failed {} times in a row, will continue trying silently",
                        consecutive_failures
                    );
                }
                // The source may recover; keep the timer running.
            }
        }
    }

    state.collector.set_running(false);
    info!("Collector stopped");
}

//! Alert generation and deduplication.
//!
//! Out-of-bounds quantities become human-readable [`Alert`]s in a single
//! process-wide [`AlertLog`], newest first.
//!
//! # Rules
//!
//! - An alert is suppressed if the log already holds an alert with an
//!   identical message created less than [`DEDUP_WINDOW`] before `now`.
//!   Only the rendered message is compared, so two rooms never collide, while
//!   a value that re-triggers the same rounded text inside the window is
//!   suppressed.
//! - New alerts are prepended. Past [`ALERT_CAPACITY`] the oldest is dropped.
//! - Alerts are notifications, not level state: nothing is updated or
//!   cleared when a quantity returns to normal.
//!
//! `now` is always an explicit parameter so the window can be tested with a
//! simulated clock.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tracing::debug;

use roomwatch_types::{Quantity, Reading, ThresholdSet};

use crate::thresholds::Check;

/// Maximum number of alerts retained.
pub const ALERT_CAPACITY: usize = 20;

/// Window within which an identical message is suppressed.
pub const DEDUP_WINDOW: Duration = Duration::minutes(5);

/// A notification that a quantity was out of bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Rendered message, e.g. `[Sala 101] Temperatura powyżej normy: 25.0°C`.
    pub message: String,
    /// Quantity that triggered the alert.
    pub quantity: Quantity,
    /// Which bound was violated.
    pub check: Check,
    /// Creation instant used for the dedup window.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Render the alert message for an out-of-bounds value.
///
/// Returns `None` when `check` is [`Check::Within`].
///
/// ```
/// use roomwatch_core::alerts::alert_message;
/// use roomwatch_core::thresholds::Check;
/// use roomwatch_types::Quantity;
///
/// assert_eq!(
///     alert_message("Sala 101", Quantity::Temperature, Check::Above, 25.0).as_deref(),
///     Some("[Sala 101] Temperatura powyżej normy: 25.0°C"),
/// );
/// assert_eq!(
///     alert_message("Sala 102", Quantity::Co2, Check::Above, 1200.4).as_deref(),
///     Some("[Sala 102] CO₂ powyżej normy: 1200 ppm"),
/// );
/// ```
#[must_use]
pub fn alert_message(room_name: &str, quantity: Quantity, check: Check, value: f64) -> Option<String> {
    let phrase = match check {
        Check::Within => return None,
        Check::Below => "poniżej normy",
        Check::Above => "powyżej normy",
    };
    let label = quantity.label();
    let unit = quantity.unit();
    let shown = quantity.round(value);
    let message = if quantity.is_fractional() {
        format!("[{room_name}] {label} {phrase}: {shown:.1}{unit}")
    } else {
        format!("[{room_name}] {label} {phrase}: {} {unit}", shown as i64)
    };
    Some(message)
}

/// Bounded, newest-first list of alerts with time-windowed deduplication.
#[derive(Debug, Clone)]
pub struct AlertLog {
    alerts: VecDeque<Alert>,
    capacity: usize,
    window: Duration,
}

impl Default for AlertLog {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertLog {
    /// Create an empty log with the default capacity and dedup window.
    pub fn new() -> Self {
        Self::with_limits(ALERT_CAPACITY, DEDUP_WINDOW)
    }

    /// Create an empty log with custom limits.
    pub fn with_limits(capacity: usize, window: Duration) -> Self {
        Self {
            alerts: VecDeque::with_capacity(capacity + 1),
            capacity: capacity.max(1),
            window,
        }
    }

    /// Whether `message` would be suppressed at `now`.
    ///
    /// An alert created after `now` (clock stepped backwards) counts as
    /// inside the window.
    #[must_use]
    pub fn is_duplicate(&self, message: &str, now: OffsetDateTime) -> bool {
        self.alerts
            .iter()
            .any(|a| a.message == message && now - a.created_at < self.window)
    }

    /// Record an alert for one quantity if it is out of bounds and not a
    /// duplicate.
    ///
    /// Returns the alert that was added, or `None` if the quantity is within
    /// bounds or the message was suppressed.
    pub fn record(
        &mut self,
        room_name: &str,
        quantity: Quantity,
        reading: &Reading,
        thresholds: &ThresholdSet,
        now: OffsetDateTime,
    ) -> Option<Alert> {
        let value = reading.value(quantity);
        let check = Check::classify(value, thresholds.bounds(quantity));
        let message = alert_message(room_name, quantity, check, value)?;
        self.push(Alert {
            message,
            quantity,
            check,
            created_at: now,
        })
    }

    /// Record alerts for every out-of-bounds quantity of a reading.
    ///
    /// Each quantity is an independent attempt, so a single reading yields
    /// between zero and five new alerts.
    pub fn record_all(
        &mut self,
        room_name: &str,
        reading: &Reading,
        thresholds: &ThresholdSet,
        now: OffsetDateTime,
    ) -> Vec<Alert> {
        Quantity::ALL
            .into_iter()
            .filter_map(|q| self.record(room_name, q, reading, thresholds, now))
            .collect()
    }

    /// Insert a prepared alert, applying dedup and the capacity limit.
    pub fn push(&mut self, alert: Alert) -> Option<Alert> {
        if self.is_duplicate(&alert.message, alert.created_at) {
            debug!("Suppressed duplicate alert: {}", alert.message);
            return None;
        }
        self.alerts.push_front(alert.clone());
        if self.alerts.len() > self.capacity {
            self.alerts.pop_back();
        }
        Some(alert)
    }

    /// Alerts newest first.
    pub fn iter(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.iter()
    }

    /// Snapshot of the alerts, newest first.
    pub fn to_vec(&self) -> Vec<Alert> {
        self.alerts.iter().cloned().collect()
    }

    /// Number of alerts held.
    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    /// Maximum number of alerts held.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// The log never holds more than its capacity.
        #[test]
        fn length_never_exceeds_capacity(
            messages in proptest::collection::vec("[a-e]{1,2}", 0..200),
            step_secs in 0i64..120,
        ) {
            let mut log = AlertLog::new();
            let start = OffsetDateTime::UNIX_EPOCH;
            for (i, message) in messages.into_iter().enumerate() {
                log.push(Alert {
                    message,
                    quantity: Quantity::Temperature,
                    check: Check::Above,
                    created_at: start + Duration::seconds(i as i64 * step_secs),
                });
                prop_assert!(log.len() <= ALERT_CAPACITY);
            }
        }

        /// No two alerts with the same message are ever inside one window.
        #[test]
        fn no_duplicates_inside_window(
            messages in proptest::collection::vec("[a-c]", 1..100),
            step_secs in 0i64..400,
        ) {
            let mut log = AlertLog::new();
            let start = OffsetDateTime::UNIX_EPOCH;
            for (i, message) in messages.into_iter().enumerate() {
                log.push(Alert {
                    message,
                    quantity: Quantity::Temperature,
                    check: Check::Above,
                    created_at: start + Duration::seconds(i as i64 * step_secs),
                });
            }
            let alerts = log.to_vec();
            for (i, a) in alerts.iter().enumerate() {
                for b in &alerts[i + 1..] {
                    if a.message == b.message {
                        prop_assert!(a.created_at - b.created_at >= DEDUP_WINDOW);
                    }
                }
            }
        }
    }
}

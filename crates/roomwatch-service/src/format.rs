//! Output formatting for text, JSON, and CSV output.
//!
//! All user-facing labels are Polish, matching the room signage the monitor
//! was built for. Timestamps are shown in the local UTC offset when it can
//! be determined, UTC otherwise.

use anyhow::Result;
use owo_colors::OwoColorize;
use serde::Serialize;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

use roomwatch_core::{Alert, Metric};
use roomwatch_types::{Quantity, Room, RoomId};

use crate::state::Snapshot;

/// `dd.MM, HH:mm`, used for history points.
const CHART_LABEL: &[BorrowedFormatItem<'static>] =
    format_description!("[day].[month], [hour]:[minute]");

/// `dd.MM.yyyy, HH:mm:ss`, used for alerts and the last refresh.
const FULL_TIME: &[BorrowedFormatItem<'static>] =
    format_description!("[day].[month].[year], [hour]:[minute]:[second]");

/// Shown instead of an empty alert list.
pub const NO_ALERTS: &str = "✓ Brak aktywnych ostrzeżeń";

/// Formatting options for output.
#[derive(Debug, Clone, Copy)]
pub struct FormatOptions {
    /// Disable colored output.
    pub no_color: bool,
    /// Use compact JSON output (no pretty-printing).
    pub compact: bool,
    /// Offset used for displayed times.
    pub offset: UtcOffset,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            no_color: false,
            compact: false,
            offset: UtcOffset::UTC,
        }
    }
}

impl FormatOptions {
    /// Options for the local terminal.
    pub fn new(no_color: bool) -> Self {
        Self {
            no_color,
            compact: false,
            offset: local_offset(),
        }
    }

    /// Create with compact JSON option.
    #[must_use]
    pub fn with_compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    /// Serialize value to JSON string, respecting compact option.
    pub fn as_json<T: Serialize>(&self, value: &T) -> Result<String> {
        let json = if self.compact {
            serde_json::to_string(value)?
        } else {
            serde_json::to_string_pretty(value)?
        };
        Ok(json + "\n")
    }

    /// History point label, e.g. `19.10, 14:00`.
    #[must_use]
    pub fn chart_label(&self, ts: OffsetDateTime) -> String {
        ts.to_offset(self.offset)
            .format(CHART_LABEL)
            .unwrap_or_else(|_| "?".to_string())
    }

    /// Full timestamp, e.g. `19.10.2026, 14:00:05`.
    #[must_use]
    pub fn full_time(&self, ts: OffsetDateTime) -> String {
        ts.to_offset(self.offset)
            .format(FULL_TIME)
            .unwrap_or_else(|_| "?".to_string())
    }

    fn bold(&self, s: &str) -> String {
        if self.no_color {
            s.to_string()
        } else {
            s.bold().to_string()
        }
    }

    fn dimmed(&self, s: &str) -> String {
        if self.no_color {
            s.to_string()
        } else {
            s.dimmed().to_string()
        }
    }
}

/// The local UTC offset, or UTC when it cannot be determined.
pub fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

/// Format a value with its unit.
///
/// Temperature and humidity keep one decimal; the rest are whole numbers.
#[must_use]
pub fn format_value(quantity: Quantity, value: f64) -> String {
    let shown = quantity.round(value);
    if quantity.is_fractional() {
        format!("{:.1}{}", shown, quantity.unit())
    } else {
        format!("{} {}", shown as i64, quantity.unit())
    }
}

/// Bare value for CSV output, without unit.
#[must_use]
pub fn csv_value(quantity: Quantity, value: f64) -> String {
    let shown = quantity.round(value);
    if quantity.is_fractional() {
        format!("{:.1}", shown)
    } else {
        format!("{}", shown as i64)
    }
}

/// Status text of one metric.
#[must_use]
pub fn status_text(metric: &Metric) -> &'static str {
    if metric.in_bounds {
        "✓ W normie"
    } else if metric.quantity == Quantity::Illuminance {
        "⚠ Za ciemno"
    } else {
        "⚠ Poza normą"
    }
}

/// Status text with color.
#[must_use]
pub fn format_status(metric: &Metric, no_color: bool) -> String {
    let text = status_text(metric);
    if no_color {
        text.to_string()
    } else if metric.in_bounds {
        text.green().to_string()
    } else {
        text.red().to_string()
    }
}

/// Escape a string for CSV output.
/// Wraps the value in quotes if it contains commas, quotes, or newlines.
#[must_use]
pub fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

// ============================================================================
// Dashboard
// ============================================================================

#[must_use]
pub fn format_snapshot_text(snapshot: &Snapshot, opts: &FormatOptions) -> String {
    let mut output = format!("{}\n", opts.bold(&snapshot.room.name));

    let updated = snapshot
        .last_refresh
        .map(|ts| opts.full_time(ts))
        .unwrap_or_else(|| "-".to_string());
    output.push_str(&opts.dimmed(&format!("Ostatnia aktualizacja: {}", updated)));
    output.push('\n');

    if !snapshot.room.sensors.is_empty() {
        output.push_str(&opts.dimmed(&format!(
            "Czujniki: {}",
            snapshot.room.sensors.join(", ")
        )));
        output.push('\n');
    }
    output.push('\n');

    if snapshot.metrics.is_empty() {
        output.push_str("Brak pomiarów\n");
    }
    for metric in &snapshot.metrics {
        output.push_str(&format!(
            "  {:<12} {:>9}  {:<13} {}\n",
            metric.quantity.label(),
            format_value(metric.quantity, metric.value),
            format_status(metric, opts.no_color),
            opts.dimmed(&metric.threshold),
        ));
    }

    output.push('\n');
    output.push_str(&format_alerts_text(&snapshot.alerts, opts));
    output
}

#[must_use]
pub fn format_metrics_csv(snapshot: &Snapshot) -> String {
    let mut output = "room,quantity,value,unit,in_bounds,threshold\n".to_string();
    for metric in &snapshot.metrics {
        output.push_str(&format!(
            "{},{},{},{},{},{}\n",
            csv_escape(snapshot.room.id.as_str()),
            metric.quantity.key(),
            csv_value(metric.quantity, metric.value),
            metric.quantity.unit(),
            metric.in_bounds,
            csv_escape(&metric.threshold)
        ));
    }
    output
}

#[must_use]
pub fn format_alerts_text(alerts: &[Alert], opts: &FormatOptions) -> String {
    let mut output = format!("{}\n", opts.bold("Ostrzeżenia:"));
    if alerts.is_empty() {
        let line = if opts.no_color {
            NO_ALERTS.to_string()
        } else {
            NO_ALERTS.green().to_string()
        };
        output.push_str(&format!("  {}\n", line));
        return output;
    }
    for alert in alerts {
        output.push_str(&format!(
            "  {}  {}\n",
            opts.dimmed(&opts.full_time(alert.created_at)),
            alert.message
        ));
    }
    output
}

// ============================================================================
// Rooms
// ============================================================================

#[must_use]
pub fn format_rooms_text(rooms: &[Room], current: Option<&RoomId>, opts: &FormatOptions) -> String {
    let mut output = String::new();
    for room in rooms {
        let marker = if current == Some(&room.id) { "*" } else { " " };
        output.push_str(&format!(
            "{} {:<10} {}\n",
            marker,
            room.id.as_str(),
            opts.bold(&room.name)
        ));
        for sensor in &room.sensors {
            output.push_str(&format!("      {}\n", opts.dimmed(sensor)));
        }
    }
    output
}

#[must_use]
pub fn format_rooms_csv(rooms: &[Room]) -> String {
    let mut output = "id,name,sensors\n".to_string();
    for room in rooms {
        output.push_str(&format!(
            "{},{},{}\n",
            csv_escape(room.id.as_str()),
            csv_escape(&room.name),
            csv_escape(&room.sensors.join("; "))
        ));
    }
    output
}

// ============================================================================
// History
// ============================================================================

/// One history point for JSON output.
#[derive(Debug, Serialize)]
pub struct HistoryPoint {
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub label: String,
    pub value: f64,
}

/// History series for JSON output.
#[derive(Debug, Serialize)]
pub struct HistoryOutput<'a> {
    pub room: &'a RoomId,
    pub quantity: Quantity,
    pub unit: &'static str,
    pub points: Vec<HistoryPoint>,
}

#[must_use]
pub fn format_history_text(
    room: &Room,
    quantity: Quantity,
    series: &[(OffsetDateTime, f64)],
    opts: &FormatOptions,
) -> String {
    let mut output = format!(
        "{}\n",
        opts.bold(&format!(
            "{}: {} ({} pomiarów)",
            room.name,
            quantity.label(),
            series.len()
        ))
    );
    for (ts, value) in series {
        output.push_str(&format!(
            "  {}  {:>9}\n",
            opts.dimmed(&opts.chart_label(*ts)),
            format_value(quantity, *value)
        ));
    }
    output
}

#[must_use]
pub fn format_history_csv(quantity: Quantity, series: &[(OffsetDateTime, f64)]) -> String {
    let mut output = format!("timestamp,{}\n", quantity.key());
    for (ts, value) in series {
        let ts = ts
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_default();
        output.push_str(&format!("{},{}\n", ts, csv_value(quantity, *value)));
    }
    output
}

pub fn format_history_json(
    room: &RoomId,
    quantity: Quantity,
    series: &[(OffsetDateTime, f64)],
    opts: &FormatOptions,
) -> Result<String> {
    let output = HistoryOutput {
        room,
        quantity,
        unit: quantity.unit(),
        points: series
            .iter()
            .map(|(ts, value)| HistoryPoint {
                timestamp: *ts,
                label: opts.chart_label(*ts),
                value: *value,
            })
            .collect(),
    };
    opts.as_json(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomwatch_core::Check;
    use time::macros::datetime;

    fn plain() -> FormatOptions {
        FormatOptions {
            no_color: true,
            ..FormatOptions::default()
        }
    }

    fn metric(quantity: Quantity, value: f64, in_bounds: bool) -> Metric {
        Metric {
            quantity,
            value,
            in_bounds,
            check: if in_bounds { Check::Within } else { Check::Below },
            threshold: "Norma: 20–24°C".to_string(),
        }
    }

    fn room() -> Room {
        Room {
            id: RoomId::from("sala-101"),
            name: "Sala 101".to_string(),
            sensors: vec!["Czujnik CO₂ C-01".to_string()],
        }
    }

    #[test]
    fn test_time_labels() {
        let opts = plain();
        let ts = datetime!(2026-03-07 09:05:03 UTC);
        assert_eq!(opts.chart_label(ts), "07.03, 09:05");
        assert_eq!(opts.full_time(ts), "07.03.2026, 09:05:03");
    }

    #[test]
    fn test_time_labels_use_offset() {
        let opts = FormatOptions {
            offset: UtcOffset::from_hms(2, 0, 0).unwrap(),
            ..plain()
        };
        let ts = datetime!(2026-03-07 23:30:00 UTC);
        assert_eq!(opts.chart_label(ts), "08.03, 01:30");
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(Quantity::Temperature, 22.449), "22.4°C");
        assert_eq!(format_value(Quantity::Humidity, 50.0), "50.0%");
        assert_eq!(format_value(Quantity::Co2, 812.6), "813 ppm");
        assert_eq!(format_value(Quantity::Voc, 301.2), "301 ppb");
        assert_eq!(format_value(Quantity::Illuminance, 420.0), "420 lx");
        assert_eq!(format_value(Quantity::Temperature, 24.25), "24.3°C");
        assert_eq!(csv_value(Quantity::Humidity, 40.75), "40.8");
    }

    #[test]
    fn test_status_text() {
        assert_eq!(status_text(&metric(Quantity::Co2, 800.0, true)), "✓ W normie");
        assert_eq!(status_text(&metric(Quantity::Co2, 1200.0, false)), "⚠ Poza normą");
        assert_eq!(
            status_text(&metric(Quantity::Illuminance, 100.0, false)),
            "⚠ Za ciemno"
        );
        assert_eq!(
            status_text(&metric(Quantity::Illuminance, 400.0, true)),
            "✓ W normie"
        );
    }

    #[test]
    fn test_format_status_no_color() {
        let m = metric(Quantity::Temperature, 25.0, false);
        assert_eq!(format_status(&m, true), "⚠ Poza normą");
        assert!(format_status(&m, false).contains("\x1b["));
    }

    #[test]
    fn test_empty_alerts() {
        let text = format_alerts_text(&[], &plain());
        assert!(text.contains(NO_ALERTS));
    }

    #[test]
    fn test_alerts_text_newest_first() {
        let alerts = vec![
            Alert {
                message: "[Sala 101] CO₂ powyżej normy: 1200 ppm".to_string(),
                quantity: Quantity::Co2,
                check: Check::Above,
                created_at: datetime!(2026-03-07 10:00:10 UTC),
            },
            Alert {
                message: "[Sala 101] Temperatura powyżej normy: 25.0°C".to_string(),
                quantity: Quantity::Temperature,
                check: Check::Above,
                created_at: datetime!(2026-03-07 10:00:00 UTC),
            },
        ];
        let text = format_alerts_text(&alerts, &plain());
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[1],
            "  07.03.2026, 10:00:10  [Sala 101] CO₂ powyżej normy: 1200 ppm"
        );
        assert!(!text.contains(NO_ALERTS));
    }

    #[test]
    fn test_snapshot_text() {
        let snapshot = Snapshot {
            room: room(),
            rooms: vec![room()],
            thresholds: roomwatch_types::ThresholdSet::default(),
            metrics: vec![metric(Quantity::Temperature, 21.5, true)],
            alerts: Vec::new(),
            last_refresh: Some(datetime!(2026-03-07 10:00:00 UTC)),
        };
        let text = format_snapshot_text(&snapshot, &plain());
        assert!(text.starts_with("Sala 101\n"));
        assert!(text.contains("Ostatnia aktualizacja: 07.03.2026, 10:00:00"));
        assert!(text.contains("Czujniki: Czujnik CO₂ C-01"));
        assert!(text.contains("21.5°C"));
        assert!(text.contains("✓ W normie"));
        assert!(text.contains("Norma: 20–24°C"));
        assert!(text.contains(NO_ALERTS));
    }

    #[test]
    fn test_metrics_csv() {
        let snapshot = Snapshot {
            room: room(),
            rooms: Vec::new(),
            thresholds: roomwatch_types::ThresholdSet::default(),
            metrics: vec![
                metric(Quantity::Temperature, 21.46, true),
                metric(Quantity::Co2, 1200.4, false),
            ],
            alerts: Vec::new(),
            last_refresh: None,
        };
        let csv = format_metrics_csv(&snapshot);
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines[0], "room,quantity,value,unit,in_bounds,threshold");
        assert_eq!(lines[1], "sala-101,temperature,21.5,°C,true,Norma: 20–24°C");
        assert_eq!(lines[2], "sala-101,co2,1200,ppm,false,Norma: 20–24°C");
    }

    #[test]
    fn test_rooms_text_marks_current() {
        let rooms = vec![
            room(),
            Room {
                id: RoomId::from("sala-102"),
                name: "Sala 102".to_string(),
                sensors: Vec::new(),
            },
        ];
        let text = format_rooms_text(&rooms, Some(&RoomId::from("sala-102")), &plain());
        assert!(text.contains("  sala-101   Sala 101"));
        assert!(text.contains("* sala-102   Sala 102"));
    }

    #[test]
    fn test_rooms_csv() {
        let csv = format_rooms_csv(&[Room {
            id: RoomId::from("lab"),
            name: "Lab, parter".to_string(),
            sensors: vec!["A".to_string(), "B".to_string()],
        }]);
        assert_eq!(csv, "id,name,sensors\nlab,\"Lab, parter\",A; B\n");
    }

    #[test]
    fn test_history_csv() {
        let series = vec![
            (datetime!(2026-03-07 09:00:00 UTC), 812.4),
            (datetime!(2026-03-07 10:00:00 UTC), 799.6),
        ];
        let csv = format_history_csv(Quantity::Co2, &series);
        assert_eq!(
            csv,
            "timestamp,co2\n2026-03-07T09:00:00Z,812\n2026-03-07T10:00:00Z,800\n"
        );
    }

    #[test]
    fn test_history_text() {
        let series = vec![(datetime!(2026-03-07 09:00:00 UTC), 21.34)];
        let text = format_history_text(&room(), Quantity::Temperature, &series, &plain());
        assert!(text.starts_with("Sala 101: Temperatura (1 pomiarów)\n"));
        assert!(text.contains("07.03, 09:00"));
        assert!(text.contains("21.3°C"));
    }

    #[test]
    fn test_history_json() {
        let series = vec![(datetime!(2026-03-07 09:00:00 UTC), 45.5)];
        let json = format_history_json(
            &RoomId::from("sala-101"),
            Quantity::Humidity,
            &series,
            &plain().with_compact(true),
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["room"], "sala-101");
        assert_eq!(value["quantity"], "humidity");
        assert_eq!(value["unit"], "%");
        assert_eq!(value["points"][0]["label"], "07.03, 09:00");
        assert_eq!(value["points"][0]["timestamp"], "2026-03-07T09:00:00Z");
        assert_eq!(value["points"][0]["value"], 45.5);
        assert!(!json.trim_end().contains('\n'));
    }
}

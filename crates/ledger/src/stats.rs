#![forbid(unsafe_code)]

use crate::status::DeviceStatus;
use serde::{Deserialize, Serialize};

/// Seconds accumulated per state, used both for all-time totals and for
/// per-day buckets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct StateDurations {
    pub running: f64,
    pub online: f64,
    pub offline: f64,
}

impl StateDurations {
    pub fn add(&mut self, status: DeviceStatus, seconds: f64) {
        match status {
            DeviceStatus::Running => self.running += seconds,
            DeviceStatus::Reachable => self.online += seconds,
            DeviceStatus::Offline => self.offline += seconds,
        }
    }

    pub fn merge(&mut self, other: &StateDurations) {
        self.running += other.running;
        self.online += other.online;
        self.offline += other.offline;
    }
}

/// Read-only snapshot of one device's time accounting.
///
/// The formatted fields include the unrealized duration of the open
/// transition; the ledger's accumulators are never mutated by producing one
/// of these.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DeviceStats {
    pub running: String,
    pub online: String,
    pub offline: String,
    pub running_seconds: f64,
    pub online_seconds: f64,
    pub offline_seconds: f64,
    pub current_status: DeviceStatus,
    pub current_duration: String,
}

/// Format seconds as `HH:MM:SS` with unbounded, zero-padded hours.
pub fn format_hms(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Format seconds as decimal hours with two places, for BI-style exports.
pub fn format_hours(seconds: f64) -> String {
    format!("{:.2}", seconds / 3600.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn hms_zero_pads() {
        assert_eq!(format_hms(0.0), "00:00:00");
        assert_eq!(format_hms(5.0), "00:00:05");
        assert_eq!(format_hms(65.0), "00:01:05");
        assert_eq!(format_hms(3661.0), "01:01:01");
    }

    #[test]
    fn hms_hours_are_unbounded() {
        assert_eq!(format_hms(400.0 * 3600.0), "400:00:00");
    }

    #[test]
    fn hms_truncates_fractional_seconds_and_clamps_negatives() {
        assert_eq!(format_hms(59.9), "00:00:59");
        assert_eq!(format_hms(-10.0), "00:00:00");
    }

    #[test]
    fn hours_round_to_two_places() {
        assert_eq!(format_hours(3600.0), "1.00");
        assert_eq!(format_hours(5400.0), "1.50");
        assert_eq!(format_hours(10.0), "0.00");
    }
}

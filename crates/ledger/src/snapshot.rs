#![forbid(unsafe_code)]

use crate::stats::StateDurations;
use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

/// Persisted form of the ledger.
///
/// The live transition table is intentionally absent: after a restart every
/// device is freshly unknown and only the accounted history survives.
///
/// On-disk layout (interop contract, shared with external tooling):
/// `{ "start_time": ISO-8601, "last_save": ISO-8601,
///    "history": device -> state -> seconds,
///    "daily_records": date -> device -> state -> seconds }`
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct LedgerSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Local>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_save: Option<DateTime<Local>>,
    pub history: HashMap<String, StateDurations>,
    pub daily_records: BTreeMap<String, HashMap<String, StateDurations>>,
}

impl LedgerSnapshot {
    /// Decode a snapshot tolerantly: each section, and each entry within the
    /// `history` and `daily_records` sections, is parsed independently, so a
    /// malformed fragment costs only the entries it covers.
    pub fn from_value(value: &Value) -> Self {
        let mut snapshot = LedgerSnapshot {
            start_time: parse_timestamp(value.get("start_time"), "start_time"),
            last_save: parse_timestamp(value.get("last_save"), "last_save"),
            ..Default::default()
        };

        if let Some(history) = value.get("history") {
            match history.as_object() {
                Some(devices) => {
                    for (device, durations) in devices {
                        match serde_json::from_value(durations.clone()) {
                            Ok(durations) => {
                                snapshot.history.insert(device.clone(), durations);
                            }
                            Err(err) => {
                                warn!(device, error = %err, "skipping malformed history entry");
                            }
                        }
                    }
                }
                None => warn!("history section is not an object; skipping"),
            }
        }

        if let Some(daily) = value.get("daily_records") {
            match daily.as_object() {
                Some(dates) => {
                    for (date, devices) in dates {
                        let Some(devices) = devices.as_object() else {
                            warn!(date, "skipping malformed daily record");
                            continue;
                        };
                        let day = snapshot.daily_records.entry(date.clone()).or_default();
                        for (device, durations) in devices {
                            match serde_json::from_value(durations.clone()) {
                                Ok(durations) => {
                                    day.insert(device.clone(), durations);
                                }
                                Err(err) => {
                                    warn!(
                                        date,
                                        device,
                                        error = %err,
                                        "skipping malformed daily record entry"
                                    );
                                }
                            }
                        }
                    }
                }
                None => warn!("daily_records section is not an object; skipping"),
            }
        }

        snapshot
    }
}

fn parse_timestamp(value: Option<&Value>, field: &str) -> Option<DateTime<Local>> {
    let value = value?;
    match serde_json::from_value(value.clone()) {
        Ok(timestamp) => Some(timestamp),
        Err(err) => {
            warn!(field, error = %err, "ignoring unparseable timestamp");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn corrupt_daily_entry_does_not_poison_history() {
        let value = json!({
            "start_time": "2026-08-01T08:00:00+08:00",
            "history": {
                "PI-65": { "running": 120.0, "online": 30.0, "offline": 10.0 },
                "PI-66": { "running": 5.0, "online": 0.0, "offline": 0.0 }
            },
            "daily_records": {
                "2026-08-01": {
                    "PI-65": "not an object",
                    "PI-66": { "running": 5.0, "online": 0.0, "offline": 0.0 }
                }
            }
        });

        let snapshot = LedgerSnapshot::from_value(&value);
        assert_eq!(snapshot.history.len(), 2);
        assert_eq!(snapshot.history["PI-65"].running, 120.0);

        let day = &snapshot.daily_records["2026-08-01"];
        assert!(!day.contains_key("PI-65"));
        assert_eq!(day["PI-66"].running, 5.0);
    }

    #[test]
    fn bad_start_time_is_ignored() {
        let value = json!({
            "start_time": "yesterday-ish",
            "history": {},
            "daily_records": {}
        });
        let snapshot = LedgerSnapshot::from_value(&value);
        assert_eq!(snapshot.start_time, None);
    }

    #[test]
    fn missing_sections_yield_an_empty_snapshot() {
        let snapshot = LedgerSnapshot::from_value(&json!({}));
        assert_eq!(snapshot, LedgerSnapshot::default());
    }
}

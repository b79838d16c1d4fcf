#![forbid(unsafe_code)]

use crate::snapshot::LedgerSnapshot;
use crate::stats::{DeviceStats, StateDurations, format_hms};
use crate::status::DeviceStatus;
use chrono::{DateTime, Datelike, Days, Local, NaiveDate};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A device's current, not-yet-closed interval in a given state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Transition {
    pub status: DeviceStatus,
    pub since: DateTime<Local>,
}

/// All ledger tables. Methods never lock; `StatusLedger` owns the mutex and
/// every public entry point takes it exactly once.
#[derive(Debug)]
pub(crate) struct LedgerInner {
    pub start_time: DateTime<Local>,
    current: HashMap<String, Transition>,
    history: HashMap<String, StateDurations>,
    daily: BTreeMap<String, HashMap<String, StateDurations>>,
}

impl LedgerInner {
    pub fn new(now: DateTime<Local>) -> Self {
        Self {
            start_time: now,
            current: HashMap::new(),
            history: HashMap::new(),
            daily: BTreeMap::new(),
        }
    }

    /// Close the device's open transition (if any), attributing its elapsed
    /// time to the old state, then open a new transition at `now`.
    ///
    /// Runs on every poll, including when the status is unchanged: the open
    /// transition is flushed into the accumulators each call, so at most one
    /// poll interval of duration is ever unrealized.
    pub fn record(&mut self, device: &str, status: DeviceStatus, now: DateTime<Local>) {
        if let Some(transition) = self.current.get(device) {
            let elapsed = elapsed_seconds(transition.since, now);
            let old_status = transition.status;

            self.history
                .entry(device.to_owned())
                .or_default()
                .add(old_status, elapsed);
            self.daily
                .entry(day_key(now))
                .or_default()
                .entry(device.to_owned())
                .or_default()
                .add(old_status, elapsed);
        }

        self.current.insert(
            device.to_owned(),
            Transition { status, since: now },
        );
    }

    /// Pure query: cumulative totals plus the unrealized time of the open
    /// transition as of `now`. Never mutates the accumulators.
    pub fn device_stats(&self, device: &str, now: DateTime<Local>) -> DeviceStats {
        let mut totals = self.history.get(device).copied().unwrap_or_default();
        let mut current_status = DeviceStatus::Offline;
        let mut current_seconds = 0.0;

        if let Some(transition) = self.current.get(device) {
            current_status = transition.status;
            current_seconds = elapsed_seconds(transition.since, now);
            totals.add(current_status, current_seconds);
        }

        DeviceStats {
            running: format_hms(totals.running),
            online: format_hms(totals.online),
            offline: format_hms(totals.offline),
            running_seconds: totals.running,
            online_seconds: totals.online,
            offline_seconds: totals.offline,
            current_status,
            current_duration: format_hms(current_seconds),
        }
    }

    /// Devices known to either the live table or the history.
    pub fn known_devices(&self) -> BTreeSet<String> {
        self.current
            .keys()
            .chain(self.history.keys())
            .cloned()
            .collect()
    }

    pub fn daily_records(&self) -> &BTreeMap<String, HashMap<String, StateDurations>> {
        &self.daily
    }

    pub fn daily_stats(&self, date: &str) -> HashMap<String, StateDurations> {
        self.daily.get(date).cloned().unwrap_or_default()
    }

    /// Sum daily buckets over the Monday-through-Sunday week containing `now`.
    pub fn weekly_stats(&self, now: DateTime<Local>) -> HashMap<String, StateDurations> {
        let today = now.date_naive();
        let week_start = today
            .checked_sub_days(Days::new(today.weekday().num_days_from_monday() as u64))
            .unwrap_or(today);

        let mut weekly: HashMap<String, StateDurations> = HashMap::new();
        for offset in 0..7 {
            let Some(date) = week_start.checked_add_days(Days::new(offset)) else {
                continue;
            };
            if let Some(devices) = self.daily.get(&date.format(DATE_FORMAT).to_string()) {
                for (device, durations) in devices {
                    weekly.entry(device.clone()).or_default().merge(durations);
                }
            }
        }
        weekly
    }

    /// Sum daily buckets over one calendar month. Date keys that fail to
    /// parse are skipped.
    pub fn monthly_stats(&self, year: i32, month: u32) -> HashMap<String, StateDurations> {
        let Some(month_start) = NaiveDate::from_ymd_opt(year, month, 1) else {
            return HashMap::new();
        };
        let month_end = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        };
        let Some(month_end) = month_end else {
            return HashMap::new();
        };

        let mut monthly: HashMap<String, StateDurations> = HashMap::new();
        for (key, devices) in &self.daily {
            let Ok(date) = NaiveDate::parse_from_str(key, DATE_FORMAT) else {
                debug!(key, "skipping unparseable daily record key");
                continue;
            };
            if date >= month_start && date < month_end {
                for (device, durations) in devices {
                    monthly.entry(device.clone()).or_default().merge(durations);
                }
            }
        }
        monthly
    }

    /// Zero one device's cumulative totals and drop its live transition.
    /// Daily history for the device is left untouched.
    pub fn reset_device(&mut self, device: &str) {
        if let Some(totals) = self.history.get_mut(device) {
            *totals = StateDurations::default();
        }
        self.current.remove(device);
    }

    /// Clear every table and restart the uptime clock.
    pub fn reset_all(&mut self, now: DateTime<Local>) {
        self.current.clear();
        self.history.clear();
        self.daily.clear();
        self.start_time = now;
    }

    pub fn snapshot(&self, now: DateTime<Local>) -> LedgerSnapshot {
        LedgerSnapshot {
            start_time: Some(self.start_time),
            last_save: Some(now),
            history: self.history.clone(),
            daily_records: self.daily.clone(),
        }
    }

    /// Restore durable state. The live transition table is intentionally not
    /// part of a snapshot; devices are freshly unknown after a restart.
    pub fn apply_snapshot(&mut self, snapshot: LedgerSnapshot) {
        if let Some(start_time) = snapshot.start_time {
            self.start_time = start_time;
        }
        self.history = snapshot.history;
        self.daily = snapshot.daily_records;
    }
}

fn day_key(now: DateTime<Local>) -> String {
    now.format(DATE_FORMAT).to_string()
}

/// Elapsed seconds between two timestamps, clamped at zero so a clock
/// regression can never feed a negative duration into an accumulator.
fn elapsed_seconds(since: DateTime<Local>, now: DateTime<Local>) -> f64 {
    (now - since).num_milliseconds().max(0) as f64 / 1000.0
}

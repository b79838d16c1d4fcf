#![forbid(unsafe_code)]

mod inner;

use crate::error::Error;
use crate::stats::{DeviceStats, StateDurations, format_hms};
use crate::status::DeviceStatus;
use crate::store::{NoopStore, SnapshotStore};
use chrono::{DateTime, Datelike, Local};
use inner::LedgerInner;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Concurrency-safe time-accounting ledger for a fleet of devices.
///
/// Cheap to clone; all clones share the same tables behind one mutex. The
/// mutex is not re-entrant, so aggregate queries take it once and work
/// through [`LedgerInner`] helpers, and it is never held across the snapshot
/// file write.
#[derive(Clone)]
pub struct StatusLedger {
    inner: Arc<Mutex<LedgerInner>>,
    store: Arc<dyn SnapshotStore>,
}

impl StatusLedger {
    /// Construct a ledger backed by `store`, restoring any durable state.
    ///
    /// A missing snapshot starts the ledger empty; a snapshot that fails to
    /// load is logged and otherwise ignored.
    pub fn open(store: Arc<dyn SnapshotStore>) -> Self {
        Self::open_at(store, Local::now())
    }

    pub fn open_at(store: Arc<dyn SnapshotStore>, now: DateTime<Local>) -> Self {
        let mut inner = LedgerInner::new(now);
        match store.load() {
            Ok(Some(snapshot)) => {
                inner.apply_snapshot(snapshot);
                info!(devices = inner.known_devices().len(), "restored ledger history");
            }
            Ok(None) => debug!("no durable ledger state; starting empty"),
            Err(err) => warn!(error = %err, "failed to load ledger snapshot; starting empty"),
        }
        Self {
            inner: Arc::new(Mutex::new(inner)),
            store,
        }
    }

    /// A ledger with no durable backing, for callers that only need the
    /// in-memory tables.
    pub fn in_memory() -> Self {
        Self::open_at(Arc::new(NoopStore), Local::now())
    }

    /// Report a device's observed status.
    ///
    /// Every call closes and reopens the device's transition, even when the
    /// status is unchanged; `current_duration` in [`DeviceStats`] therefore
    /// measures time since the last report, not since the state was entered.
    pub fn record(&self, device: &str, status: DeviceStatus) {
        self.record_at(device, status, Local::now());
    }

    pub fn record_at(&self, device: &str, status: DeviceStatus, now: DateTime<Local>) {
        self.inner.lock().record(device, status, now);
    }

    pub fn stats(&self, device: &str) -> DeviceStats {
        self.stats_at(device, Local::now())
    }

    pub fn stats_at(&self, device: &str, now: DateTime<Local>) -> DeviceStats {
        self.inner.lock().device_stats(device, now)
    }

    /// Stats for every device known to the live table or the history.
    pub fn all_devices_stats(&self) -> BTreeMap<String, DeviceStats> {
        self.all_devices_stats_at(Local::now())
    }

    pub fn all_devices_stats_at(&self, now: DateTime<Local>) -> BTreeMap<String, DeviceStats> {
        let inner = self.inner.lock();
        inner
            .known_devices()
            .into_iter()
            .map(|device| {
                let stats = inner.device_stats(&device, now);
                (device, stats)
            })
            .collect()
    }

    /// Deep copy of the per-day buckets; callers may mutate the result
    /// freely.
    pub fn all_daily_records(&self) -> BTreeMap<String, HashMap<String, StateDurations>> {
        self.inner.lock().daily_records().clone()
    }

    /// One date's per-device subtotals (`YYYY-MM-DD`). Unknown dates yield
    /// an empty table.
    pub fn daily_stats(&self, date: &str) -> HashMap<String, StateDurations> {
        self.inner.lock().daily_stats(date)
    }

    /// Per-device totals for the Monday-through-Sunday week containing now.
    pub fn weekly_stats(&self) -> HashMap<String, StateDurations> {
        self.weekly_stats_at(Local::now())
    }

    pub fn weekly_stats_at(&self, now: DateTime<Local>) -> HashMap<String, StateDurations> {
        self.inner.lock().weekly_stats(now)
    }

    /// Per-device totals for one calendar month; defaults to the current
    /// month.
    pub fn monthly_stats(
        &self,
        year: Option<i32>,
        month: Option<u32>,
    ) -> HashMap<String, StateDurations> {
        self.monthly_stats_at(year, month, Local::now())
    }

    pub fn monthly_stats_at(
        &self,
        year: Option<i32>,
        month: Option<u32>,
        now: DateTime<Local>,
    ) -> HashMap<String, StateDurations> {
        let year = year.unwrap_or_else(|| now.year());
        let month = month.unwrap_or_else(|| now.month());
        self.inner.lock().monthly_stats(year, month)
    }

    pub fn uptime(&self) -> String {
        self.uptime_at(Local::now())
    }

    pub fn uptime_at(&self, now: DateTime<Local>) -> String {
        let start = self.inner.lock().start_time;
        format_hms((now - start).num_milliseconds().max(0) as f64 / 1000.0)
    }

    pub fn start_time(&self) -> DateTime<Local> {
        self.inner.lock().start_time
    }

    pub fn start_time_string(&self) -> String {
        self.start_time().format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// Write the durable snapshot: the tables are cloned under the lock and
    /// the file write happens after it is released.
    pub fn persist(&self) -> Result<(), Error> {
        self.persist_at(Local::now())
    }

    pub fn persist_at(&self, now: DateTime<Local>) -> Result<(), Error> {
        let snapshot = self.inner.lock().snapshot(now);
        self.store.save(&snapshot)?;
        debug!("ledger snapshot persisted");
        Ok(())
    }

    /// Zero one device's cumulative totals (daily history stays), or with
    /// `None` clear everything and restart the uptime clock. Either way the
    /// result is persisted immediately.
    pub fn reset_stats(&self, device: Option<&str>) -> Result<(), Error> {
        self.reset_stats_at(device, Local::now())
    }

    pub fn reset_stats_at(
        &self,
        device: Option<&str>,
        now: DateTime<Local>,
    ) -> Result<(), Error> {
        {
            let mut inner = self.inner.lock();
            match device {
                Some(device) => inner.reset_device(device),
                None => inner.reset_all(now),
            }
        }
        self.persist_at(now)
    }
}

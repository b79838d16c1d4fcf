#![forbid(unsafe_code)]

use crate::clock::Clock;
use crate::probe::StatusProbe;
use config::{Device, Poll};
use ledger::{DeviceStats, DeviceStatus, StatusLedger};
use serde::Serialize;
use std::net::IpAddr;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Outcome of one device probe within a poll cycle, for dashboard-style
/// consumers.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceReport {
    pub name: String,
    pub ip: IpAddr,
    pub script_path: Option<String>,
    pub status: DeviceStatus,
    pub stats: DeviceStats,
}

/// Probe every device once, concurrently (bounded by `poll.max_in_flight`),
/// and record each observed status in the ledger.
///
/// A probe that outruns its deadline is abandoned and records nothing; the
/// device keeps its open transition until the next cycle reaches it.
pub async fn poll_once(
    devices: &[Device],
    poll: &Poll,
    probe: Arc<dyn StatusProbe>,
    clock: Arc<dyn Clock>,
    ledger: &StatusLedger,
) -> Vec<DeviceReport> {
    let semaphore = Arc::new(Semaphore::new(poll.max_in_flight.max(1)));
    // Leave the probe its own timeout plus slack before abandoning it.
    let deadline = poll.probe_timeout * 2;

    let mut tasks = JoinSet::new();
    for device in devices.iter().cloned() {
        let probe = probe.clone();
        let semaphore = semaphore.clone();
        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok()?;
            match tokio::time::timeout(deadline, probe.probe(&device)).await {
                Ok(status) => Some((device, status)),
                Err(_) => {
                    warn!(device = %device.name, "probe abandoned after deadline");
                    None
                }
            }
        });
    }

    let mut reports = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Some((device, status))) => {
                let now = clock.now();
                ledger.record_at(&device.name, status, now);
                reports.push(DeviceReport {
                    stats: ledger.stats_at(&device.name, now),
                    name: device.name,
                    ip: device.ip,
                    script_path: device.script_path,
                    status,
                });
            }
            Ok(None) => {}
            Err(err) => warn!(error = %err, "probe task failed"),
        }
    }

    reports.sort_by(|a, b| a.name.cmp(&b.name));
    debug!(polled = devices.len(), recorded = reports.len(), "poll cycle complete");
    reports
}

#![forbid(unsafe_code)]

use crate::stats::{StateDurations, format_hours};
use config::Device;
use itertools::Itertools;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Write;

const HEADER: &str = "date,device,ip,script,running_hours,online_hours,offline_hours";
const UNKNOWN: &str = "N/A";

/// One flattened (date, device) row of the daily report, hours rounded to
/// two decimals.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub date: String,
    pub device: String,
    pub ip: String,
    pub script: String,
    pub running_hours: String,
    pub online_hours: String,
    pub offline_hours: String,
}

/// Join the per-day buckets against the device directory, newest date
/// first. Devices absent from the directory still get a row, with their
/// ip/script columns marked `N/A`.
pub fn daily_rows(
    devices: &[Device],
    records: &BTreeMap<String, HashMap<String, StateDurations>>,
) -> Vec<ReportRow> {
    let directory: HashMap<&str, &Device> =
        devices.iter().map(|d| (d.name.as_str(), d)).collect();

    let mut rows = Vec::new();
    for (date, day) in records.iter().rev() {
        for (device, durations) in day.iter().sorted_by(|a, b| a.0.cmp(b.0)) {
            let entry = directory.get(device.as_str());
            rows.push(ReportRow {
                date: date.clone(),
                device: device.clone(),
                ip: entry
                    .map(|d| d.ip.to_string())
                    .unwrap_or_else(|| UNKNOWN.to_owned()),
                script: entry
                    .and_then(|d| d.script_path.clone())
                    .unwrap_or_else(|| UNKNOWN.to_owned()),
                running_hours: format_hours(durations.running),
                online_hours: format_hours(durations.online),
                offline_hours: format_hours(durations.offline),
            });
        }
    }
    rows
}

/// Render the daily report as comma-delimited text with a header row.
pub fn render_csv(
    devices: &[Device],
    records: &BTreeMap<String, HashMap<String, StateDurations>>,
) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');
    for row in daily_rows(devices, records) {
        let _ = writeln!(
            out,
            "{},{},{},{},{},{},{}",
            row.date,
            row.device,
            row.ip,
            row.script,
            row.running_hours,
            row.online_hours,
            row.offline_hours
        );
    }
    out
}

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use std::fmt;

/// Observed operational state of a device.
///
/// `Reachable` means the device answers a liveness probe but the target
/// application is not confirmed active. The wire and on-disk name for it is
/// `online`, inherited from the durable snapshot format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    #[default]
    Offline,
    #[serde(rename = "online")]
    Reachable,
    Running,
}

impl DeviceStatus {
    pub const ALL: [DeviceStatus; 3] = [
        DeviceStatus::Offline,
        DeviceStatus::Reachable,
        DeviceStatus::Running,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DeviceStatus::Offline => "offline",
            DeviceStatus::Reachable => "online",
            DeviceStatus::Running => "running",
        }
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

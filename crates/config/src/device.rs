#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use std::net::IpAddr;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Device {
    /// Display name; also the key the status ledger tracks the device under.
    pub name: String,

    pub ip: IpAddr,

    /// Launch script on the device, reported in exports.
    #[serde(default)]
    pub script_path: Option<String>,

    /// TCP port probed to confirm the target application is up.
    ///
    /// When absent the probe can only distinguish offline from reachable.
    #[serde(default)]
    pub app_port: Option<u16>,
}

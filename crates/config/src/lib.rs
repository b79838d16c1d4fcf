#![forbid(unsafe_code)]

mod device;
mod error;
mod persistence;
mod poll;

pub use device::Device;
pub use error::Error;
pub use persistence::Persistence;
pub use poll::Poll;

use figment::{
    Figment,
    providers::{Format, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    /// Fleet directory: every device the poller probes.
    pub devices: Vec<Device>,

    pub poll: Poll,

    pub persistence: Persistence,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and validate a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let config: Config = Figment::new().merge(Toml::file(path.as_ref())).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, Error> {
        Ok(toml_edit::ser::to_string_pretty(self)?)
    }

    /// Look up a device entry by its ledger name.
    pub fn device(&self, name: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.name == name)
    }

    fn validate(&self) -> Result<(), Error> {
        for device in &self.devices {
            if device.name.is_empty() {
                return Err(Error::UnnamedDevice(device.ip.to_string()));
            }
        }
        Ok(())
    }
}

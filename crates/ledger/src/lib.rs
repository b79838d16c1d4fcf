mod error;
pub mod ledger;
pub mod report;
pub mod snapshot;
pub mod stats;
pub mod status;
pub mod store;

pub use error::Error;
pub use ledger::StatusLedger;
pub use stats::{DeviceStats, StateDurations};
pub use status::DeviceStatus;
pub use store::{JsonFileStore, NoopStore, SnapshotStore};

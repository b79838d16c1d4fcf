pub mod clock;
pub mod engine;
mod error;
pub mod poller;
pub mod probe;

pub use clock::{Clock, SystemClock};
pub use engine::{ControlEvent, MonitorEngine, Services};
pub use error::Error;
pub use poller::{DeviceReport, poll_once};
pub use probe::{PingProbe, StatusProbe};

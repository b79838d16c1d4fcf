#![forbid(unsafe_code)]

use config::Device;
use ledger::DeviceStatus;
use std::net::IpAddr;
use std::process::Stdio;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::process::Command;
use tracing::debug;

/// Determines a device's observed status.
///
/// Implementations own their per-operation timeouts; the poller additionally
/// bounds the whole probe and abandons it (recording nothing) if it stalls.
#[async_trait::async_trait]
pub trait StatusProbe: Send + Sync {
    async fn probe(&self, device: &Device) -> DeviceStatus;
}

/// Liveness via one ICMP echo (system `ping`), application state via a TCP
/// connect to the device's `app_port` when it has one.
///
/// Without an `app_port` the probe cannot tell Reachable from Running and
/// reports Reachable at best.
#[derive(Debug, Clone)]
pub struct PingProbe {
    timeout: Duration,
}

impl PingProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn ping(&self, ip: IpAddr) -> bool {
        // ping -W takes whole seconds.
        let wait = self.timeout.as_secs().max(1).to_string();
        let status = Command::new("ping")
            .args(["-c", "1", "-W", wait.as_str()])
            .arg(ip.to_string())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match status {
            Ok(status) => status.success(),
            Err(err) => {
                debug!(%ip, error = %err, "ping invocation failed");
                false
            }
        }
    }

    async fn app_is_up(&self, ip: IpAddr, port: u16) -> bool {
        matches!(
            tokio::time::timeout(self.timeout, TcpStream::connect((ip, port))).await,
            Ok(Ok(_))
        )
    }
}

#[async_trait::async_trait]
impl StatusProbe for PingProbe {
    async fn probe(&self, device: &Device) -> DeviceStatus {
        if !self.ping(device.ip).await {
            return DeviceStatus::Offline;
        }
        match device.app_port {
            Some(port) if self.app_is_up(device.ip, port).await => DeviceStatus::Running,
            _ => DeviceStatus::Reachable,
        }
    }
}

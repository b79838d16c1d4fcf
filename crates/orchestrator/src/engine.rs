#![forbid(unsafe_code)]

use crate::clock::Clock;
use crate::error::Error;
use crate::poller::{DeviceReport, poll_once};
use crate::probe::StatusProbe;
use config::Config;
use ledger::StatusLedger;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub struct Services {
    pub probe: Arc<dyn StatusProbe>,
    pub clock: Arc<dyn Clock>,
}

pub enum ControlEvent {
    /// Swap in a freshly loaded configuration.
    Reload(Config),
    /// Persist the ledger now, outside the autosave cadence.
    SaveNow,
    /// Log uptime and the all-devices table.
    DumpStats,
}

/// The polling driver: probes the fleet once per cycle, feeds the status
/// ledger, and autosaves it on the configured interval.
pub struct MonitorEngine {
    config: Config,
    services: Services,
    ledger: StatusLedger,
    cycle_id: u64,
    last_save: Instant,
}

impl MonitorEngine {
    pub fn new(config: Config, services: Services, ledger: StatusLedger) -> Self {
        Self {
            config,
            services,
            ledger,
            cycle_id: 0,
            last_save: Instant::now(),
        }
    }

    /// Execute a single poll cycle without sleeping.
    pub async fn tick(&mut self) -> Vec<DeviceReport> {
        self.cycle_id = self.cycle_id.saturating_add(1);
        poll_once(
            &self.config.devices,
            &self.config.poll,
            self.services.probe.clone(),
            self.services.clock.clone(),
            &self.ledger,
        )
        .await
    }

    /// Run poll cycles until the cancellation token fires. Handles autosave,
    /// control events, and the shutdown save.
    pub async fn run_until(
        &mut self,
        cancel: CancellationToken,
        mut control_rx: mpsc::UnboundedReceiver<ControlEvent>,
    ) -> Result<(), Error> {
        'main: loop {
            let tick_start = Instant::now();
            let mut did_tick = false;
            tokio::select! {
                _ = cancel.cancelled() => break 'main,
                Some(event) = control_rx.recv() => {
                    self.handle_control(event);
                }
                _ = self.tick() => {
                    did_tick = true;
                }
            }

            self.autosave_if_due();

            if did_tick {
                let elapsed = tick_start.elapsed();
                if elapsed < self.config.poll.interval {
                    let sleep = self.services.clock.sleep(self.config.poll.interval - elapsed);
                    tokio::select! {
                        _ = cancel.cancelled() => break 'main,
                        Some(event) = control_rx.recv() => {
                            // Handle and start the next cycle early.
                            self.handle_control(event);
                        }
                        _ = sleep => {}
                    }
                }
            }
        }

        if self.config.persistence.save_on_shutdown {
            self.ledger.persist()?;
        }
        info!("monitor engine stopped");
        Ok(())
    }

    /// Read-only access to the effective configuration (useful for tests).
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn autosave_if_due(&mut self) {
        let Some(autosave) = self.config.persistence.autosave_interval else {
            return;
        };
        if autosave.is_zero() || self.last_save.elapsed() < autosave {
            return;
        }
        match self.ledger.persist() {
            Ok(()) => {
                self.last_save = Instant::now();
                info!("autosave complete");
            }
            // In-memory state is intact; the next due autosave retries.
            Err(err) => warn!(error = %err, "autosave failed"),
        }
    }

    fn handle_control(&mut self, event: ControlEvent) {
        match event {
            ControlEvent::Reload(mut config) => {
                if config.persistence.state_path != self.config.persistence.state_path {
                    warn!(
                        current = ?self.config.persistence.state_path,
                        requested = ?config.persistence.state_path,
                        "ignoring state_path change during reload"
                    );
                    config.persistence.state_path = self.config.persistence.state_path.clone();
                }
                info!(devices = config.devices.len(), "config reloaded");
                self.config = config;
            }
            ControlEvent::SaveNow => match self.ledger.persist() {
                Ok(()) => {
                    self.last_save = Instant::now();
                    info!("ledger saved on request");
                }
                Err(err) => warn!(error = %err, "requested save failed"),
            },
            ControlEvent::DumpStats => {
                info!(
                    uptime = %self.ledger.uptime(),
                    start_time = %self.ledger.start_time_string(),
                    "status dump"
                );
                for (device, stats) in self.ledger.all_devices_stats() {
                    info!(
                        device,
                        status = %stats.current_status,
                        running = %stats.running,
                        online = %stats.online,
                        offline = %stats.offline,
                        "device totals"
                    );
                }
            }
        }
    }
}

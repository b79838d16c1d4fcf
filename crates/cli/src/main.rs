mod cli;
mod error;
mod signals;

use crate::cli::Cli;
use crate::signals::{SignalEvent, wait_for_signal};
use clap::Parser;
use config::Config;
use flume::bounded;
use ledger::{JsonFileStore, NoopStore, SnapshotStore, StatusLedger, report};
use orchestrator::{ControlEvent, MonitorEngine, PingProbe, Services, SystemClock};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity.tracing_level_filter())
        .with_level(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    debug!(config = ?cli);

    let mut config = match &cli.conffile {
        Some(path) => Config::load(path)?,
        None => Config::new(),
    };
    if let Some(statefile) = &cli.statefile {
        config.persistence.state_path = Some(statefile.clone());
    }

    if cli.dump_config {
        std::io::stdout().write_all(config.to_toml()?.as_bytes())?;
        return Ok(());
    }

    let store: Arc<dyn SnapshotStore> = match &config.persistence.state_path {
        Some(path) => Arc::new(JsonFileStore::new(path.clone())),
        None => Arc::new(NoopStore),
    };
    let ledger = StatusLedger::open(store);

    if cli.export_csv {
        let csv = report::render_csv(&config.devices, &ledger.all_daily_records());
        std::io::stdout().write_all(csv.as_bytes())?;
        return Ok(());
    }

    info!(
        devices = config.devices.len(),
        interval = ?config.poll.interval,
        "starting monitor"
    );

    let services = Services {
        probe: Arc::new(PingProbe::new(config.poll.probe_timeout)),
        clock: Arc::new(SystemClock),
    };
    let conffile = cli.conffile.clone();
    let mut engine = MonitorEngine::new(config, services, ledger);

    let cancel = CancellationToken::new();
    let (control_tx, control_rx) = mpsc::unbounded_channel();
    let (signals_tx, signals_rx) = bounded(8);

    tokio::spawn(async move {
        if let Err(err) = wait_for_signal(&signals_tx).await {
            error!(error = ?err, "signal listener failed");
        }
    });

    let router = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        info!("shutdown requested");
                        cancel.cancel();
                        break;
                    }
                    res = signals_rx.recv_async() => {
                        let Ok(event) = res else { break };
                        debug!(?event, "received signal event");
                        route_signal(event, &control_tx, conffile.as_deref());
                    }
                }
            }
        })
    };

    engine.run_until(cancel, control_rx).await?;
    router.abort();
    Ok(())
}

fn route_signal(
    event: SignalEvent,
    control_tx: &mpsc::UnboundedSender<ControlEvent>,
    conffile: Option<&Path>,
) {
    let event = match event {
        SignalEvent::SaveNow => ControlEvent::SaveNow,
        SignalEvent::DumpStats => ControlEvent::DumpStats,
        SignalEvent::ReloadConfig => {
            let Some(path) = conffile else {
                warn!("reload requested but no config file was given");
                return;
            };
            match Config::load(path) {
                Ok(config) => ControlEvent::Reload(config),
                Err(err) => {
                    warn!(error = %err, "config reload failed; keeping current config");
                    return;
                }
            }
        }
    };
    if control_tx.send(event).is_err() {
        debug!("engine control channel closed");
    }
}

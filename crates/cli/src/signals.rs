use crate::error::Error;
use flume::Sender;
use tokio::signal::unix::{SignalKind, signal};

/// Indefinitely listens to signals and sends signal events to the provided
/// channel.
///
/// SIGUSR1 saves the ledger now, SIGUSR2 dumps the all-devices table to the
/// log, SIGHUP reloads the configuration file.
pub async fn wait_for_signal(signal_event: &Sender<SignalEvent>) -> Result<(), Error> {
    let mut sigusr1 = signal(SignalKind::user_defined1()).map_err(Error::SignalHandler)?;
    let mut sigusr2 = signal(SignalKind::user_defined2()).map_err(Error::SignalHandler)?;
    let mut sighup = signal(SignalKind::hangup()).map_err(Error::SignalHandler)?;

    loop {
        tokio::select! {
            _ = sigusr1.recv() => {
                signal_event.send_async(SignalEvent::SaveNow).await?;
            }
            _ = sigusr2.recv() => {
                signal_event.send_async(SignalEvent::DumpStats).await?;
            }
            _ = sighup.recv() => {
                signal_event.send_async(SignalEvent::ReloadConfig).await?;
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum SignalEvent {
    SaveNow,
    DumpStats,
    ReloadConfig,
}

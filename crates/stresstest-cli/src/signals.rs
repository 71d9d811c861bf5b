use std::process;

use stresstest_core::CancellationToken;
use tokio::task::JoinHandle;

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

/// Exit status used when a second interrupt aborts the process.
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Watch for Ctrl+C / SIGTERM for the lifetime of a run.
///
/// The first signal cancels `cancel`, which stops new requests while
/// in-flight ones finish and the report is still printed. A second signal
/// exits the process immediately.
pub fn spawn_signal_watcher(cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(err) = wait_for_signal().await {
            tracing::error!("failed to listen for interrupt signals: {err}");
            return;
        }
        tracing::warn!("interrupt received, finishing in-flight requests (interrupt again to abort)");
        cancel.cancel();

        if wait_for_signal().await.is_ok() {
            tracing::error!("second interrupt received, aborting");
            process::exit(INTERRUPTED_EXIT_CODE);
        }
    })
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<()> {
    let mut term_signal = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result,
        _ = term_signal.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

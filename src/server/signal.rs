// Signal handling module
//
// Supported signals:
// - SIGTERM: Graceful shutdown
// - SIGINT:  Graceful shutdown (Ctrl+C)

use crate::logger;

/// Resolve when the process is asked to stop
///
/// If no signal handler can be registered this never resolves, so the server
/// keeps running instead of exiting at once.
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    result = tokio::signal::ctrl_c() => {
                        if let Err(e) = result {
                            logger::log_error(&format!("Failed to listen for SIGINT: {e}"));
                            sigterm.recv().await;
                        }
                    }
                    _ = sigterm.recv() => {}
                }
                return;
            }
            Err(e) => {
                logger::log_warning(&format!("Failed to register SIGTERM handler: {e}"));
            }
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        logger::log_error(&format!("Failed to listen for Ctrl+C: {e}"));
        std::future::pending::<()>().await;
    }
}

//! Graceful shutdown on OS termination signals.
//!
//! Produces a future for `axum::serve(..).with_graceful_shutdown()` that
//! resolves on SIGINT or SIGTERM, so in-flight generations finish before
//! the listener closes.

/// Resolves when the process receives a shutdown signal.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install SIGINT handler: {e}");
        }
    };

    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(sig) => sig,
                Err(e) => {
                    tracing::error!("failed to install SIGTERM handler: {e}");
                    ctrl_c.await;
                    tracing::info!("SIGINT received, shutting down");
                    return;
                }
            };
        tokio::select! {
            () = ctrl_c => tracing::info!("SIGINT received, shutting down"),
            _ = sigterm.recv() => tracing::info!("SIGTERM received, shutting down"),
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await;
        tracing::info!("Ctrl+C received, shutting down");
    }
}

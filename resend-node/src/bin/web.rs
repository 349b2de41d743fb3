//! Resend Webhook Server.
//!
//! Serves `POST /webhooks/resend` and `/health`. Signed callbacks are checked,
//! filtered against `RESEND_WEBHOOK_EVENTS`, and queued on `resend_events`.

use std::net::Ipv4Addr;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use resend_node::webhook::{is_signature_verification_enabled, router};
use resend_node::{AppState, Config, Publisher};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = Config::from_env();
    let verification_enabled = is_signature_verification_enabled(&config.webhook_signing_secret);
    if !verification_enabled {
        warn!("webhook_verification_disabled_no_secret");
    }
    info!(
        port = config.port,
        verification_enabled,
        events = ?config.webhook_events,
        "config_loaded"
    );

    let publisher = Publisher::new(config.cloudamqp_url.clone());
    let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;
    info!(address = %listener.local_addr()?, "webhook_server_listening");

    let app = router(AppState::new(config, publisher.clone()));
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(stop_requested())
        .await;

    // Release the broker link whether or not the server exited cleanly.
    publisher.close().await;
    served.context("Webhook server failed")?;

    info!("webhook_server_stopped");
    Ok(())
}

/// Resolves on SIGINT, or SIGTERM on unix.
async fn stop_requested() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal as unix_signal, SignalKind};

        match unix_signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = signal::ctrl_c() => info!(signal = "SIGINT", "shutdown_requested"),
                    _ = sigterm.recv() => info!(signal = "SIGTERM", "shutdown_requested"),
                }
                return;
            }
            Err(e) => warn!(error = %e, "sigterm_listener_unavailable"),
        }
    }

    match signal::ctrl_c().await {
        Ok(()) => info!(signal = "SIGINT", "shutdown_requested"),
        Err(e) => {
            warn!(error = %e, "sigint_listener_unavailable");
            std::future::pending::<()>().await;
        }
    }
}

//! HaLow Link Manager - Main Entry Point

use std::sync::Arc;

use clap::Parser;
use halow_link_manager::{
    config::{CliArgs, Settings},
    core::service::LinkManager,
    driver::SimulatedRadio,
    store::JsonFileStore,
    transport::unix_socket::UnixSocketServer,
};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,halow_link_manager=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse CLI arguments
    let args = CliArgs::parse();
    info!(?args, "Starting HaLow link manager");

    let settings = Settings::try_from(args).inspect_err(|e| error!("{}", e))?;

    let radio = match &settings.sim_networks {
        Some(path) => {
            let json = tokio::fs::read_to_string(path).await?;
            let radio = SimulatedRadio::from_json(&json)?;
            info!("Simulated radio loaded from {}", path.display());
            radio
        }
        None => {
            warn!("No access points configured for the simulated radio");
            SimulatedRadio::default()
        }
    };

    let store = Arc::new(JsonFileStore::new(settings.store_path.clone()));
    info!("Credential store at {}", store.path().display());

    let manager = Arc::new(LinkManager::new(
        Arc::new(radio),
        store,
        settings.link.clone(),
    ));

    match manager.start().await {
        Ok(outcome) => info!(?outcome, "Link manager started"),
        Err(e) => {
            error!("Failed to start HaLow: {}", e);
            return Err(e.into());
        }
    }

    let mut tasks = Vec::new();

    if settings.enable_unix_socket {
        info!("Starting Unix socket transport on {}", settings.socket_path);

        let server = UnixSocketServer::new(
            settings.socket_path.clone(),
            settings.socket_mode,
            manager.clone(),
        );

        tasks.push(tokio::spawn(async move {
            if let Err(e) = server.start().await {
                error!("Unix socket server error: {}", e);
            }
        }));
    }

    notify_ready();
    info!("Service started successfully");

    // Wait for shutdown signal
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received SIGINT (Ctrl+C), shutting down gracefully");
        }
        _ = shutdown_signal() => {
            info!("Received SIGTERM, shutting down gracefully");
        }
        _ = async {
            for task in tasks {
                let _ = task.await;
            }
            if !settings.enable_unix_socket {
                std::future::pending::<()>().await;
            }
        } => {
            info!("All tasks completed");
        }
    }

    info!("Shutting down...");
    manager.stop().await;
    Ok(())
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            error!("Failed to register SIGTERM handler: {}", e);
            std::future::pending::<()>().await
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    // On non-Unix platforms, just wait forever
    std::future::pending::<()>().await
}

#[cfg(feature = "systemd")]
fn notify_ready() {
    if let Err(e) = sd_notify::notify(false, &[sd_notify::NotifyState::Ready]) {
        warn!("Failed to notify systemd: {}", e);
    }
}

#[cfg(not(feature = "systemd"))]
fn notify_ready() {}

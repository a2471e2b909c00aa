//! Sidecar that keeps one service instance registered for as long as it runs.

mod config;

use std::process::ExitCode;
use std::sync::Arc;

use lodestar_client::{AuthClient, Registrar, ReqwestTransport, ServiceLocator, Transport};
use lodestar_core::HeartbeatStatus;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AgentConfig;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("agent exiting: {}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AgentConfig::from_env()?;
    let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::with_timeout(config.http_timeout)?);

    // fail fast on bad credentials rather than on the first inbound token
    if let Some(auth) = &config.auth {
        let key = AuthClient::new(transport.clone())
            .fetch_public_key(&auth.url, &auth.client_id, &auth.secret)
            .await?;
        info!(key_len = key.as_str().len(), "auth service reachable");
    }

    let locator = ServiceLocator::new(transport.clone());
    for service in &config.lookup {
        match locator.lookup(service, &config.discovery_url).await {
            Ok(addrs) => info!(%service, ?addrs, "resolved service"),
            Err(err) => warn!(%service, "lookup failed: {}", err),
        }
    }

    let registrar = Registrar::new(transport, config.center_url.clone());
    let handle = registrar.register(config.instance.clone()).await?;
    let watcher = handle.clone();

    tokio::select! {
        _ = shutdown_signal() => {
            let status = handle.stop().await;
            info!(?status, "heartbeat stopped, leaving the registry to expire the instance");
            Ok(())
        }
        status = watcher.wait() => match status {
            HeartbeatStatus::Failed(err) => Err(format!("heartbeat died: {err}").into()),
            other => Err(format!("heartbeat ended unexpectedly: {other:?}").into()),
        },
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!("failed to install signal handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("signal received, starting graceful shutdown");
}

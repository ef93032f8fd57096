use std::net::{IpAddr, SocketAddr};

use anyhow::Context;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::app::{AppContext, create_router};
use crate::configs::Settings;

pub mod app;
pub mod configs;
pub mod errors;
pub mod handles;
pub mod models;
pub mod repositories;
pub mod services;

pub async fn run(settings: &Settings) -> anyhow::Result<()> {
    let context = AppContext::new(settings).await?;
    let app = create_router(&context);

    let cancel = CancellationToken::new();
    let poller = context.poller.clone().spawn(cancel.clone());

    let ip_addr = settings
        .server
        .host
        .parse::<IpAddr>()
        .with_context(|| format!("invalid server host {}", settings.server.host))?;

    let address = SocketAddr::from((ip_addr, settings.server.port));

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

    tracing::info!("listening on {:?}, polling {}", address, settings.device.base_url);

    let shutdown = cancel.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => tracing::info!("shutdown requested"),
                _ = shutdown.cancelled() => {}
            }
        })
        .await?;

    cancel.cancel();
    poller.await?;

    Ok(())
}

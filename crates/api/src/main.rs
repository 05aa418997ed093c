use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;

use innkeep_api::app::{build_rooms_app, build_sales_app, services};
use innkeep_api::config::AppConfig;
use innkeep_observability::{OperationEvents, TracingOperationEvents};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    innkeep_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    tracing::info!(role = ?config.role, policy = ?config.transition_policy, "starting");

    let services = services::build_services(&config).await?;
    let events: Arc<dyn OperationEvents> = Arc::new(TracingOperationEvents);

    let rooms = config
        .serves_rooms()
        .then(|| build_rooms_app(services.rooms.clone(), events.clone()));
    let sales = config
        .serves_sales()
        .then(|| build_sales_app(services.sales.clone(), events.clone()));

    tokio::try_join!(
        serve_optional("rooms", config.rooms_addr, rooms),
        serve_optional("sales", config.sales_addr, sales),
    )?;

    Ok(())
}

async fn serve_optional(name: &str, addr: SocketAddr, app: Option<Router>) -> anyhow::Result<()> {
    let Some(app) = app else {
        return Ok(());
    };

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr} for the {name} service"))?;
    tracing::info!(service = name, addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .with_context(|| format!("{name} service stopped unexpectedly"))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

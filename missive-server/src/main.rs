use anyhow::Context;
use axum::{extract::Request, ServiceExt};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// ri-utilizziamo le funzioni e strutture definite in lib.rs
use missive_server::{config::Config, connect_store, routes, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env è opzionale
    dotenvy::dotenv().ok();
    let config = Config::from_env().context("read configuration")?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.rust_log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Connessione allo store, una sola volta per tutto il processo
    let store = connect_store(&config).await.context("connect to message store")?;
    let state = Arc::new(AppState::new(store));
    let app = routes::app(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("bind tcp listener on {}", config.bind_addr()))?;
    tracing::info!("Server is running on http://localhost:{}", config.port);

    // NormalizePath avvolge il Router, quindi serve la conversione esplicita
    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .await
        .context("server shutdown")?;

    Ok(())
}

pub mod handlers;
pub mod store;

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::AppState;
use crate::store::TopologyStore;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/save-topology", post(handlers::save_topology))
        .route("/get-topologies", get(handlers::get_topologies))
        .route("/get-topology/:index", get(handlers::get_topology))
        .with_state(state)
}

pub async fn run(addr: SocketAddr, file: PathBuf) -> Result<()> {
    let store = TopologyStore::new(&file);
    // Fail at startup rather than on the first request if the file is bad.
    let existing = store
        .load()
        .with_context(|| format!("cannot use topology file {}", file.display()))?;
    tracing::info!(
        path = %file.display(),
        topologies = existing.len(),
        "topology store ready"
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, router(AppState::new(store)))
        .await
        .context("server error")?;
    Ok(())
}

use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::task;

use crate::store::TopologyStore;

// ─── State ───────────────────────────────────────────────────────────────────

/// Shared handle to the store. The mutex serialises read-modify-write cycles
/// within this process.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<TopologyStore>>,
}

impl AppState {
    pub fn new(store: TopologyStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }
}

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Topology not found")]
    NotFound,
    #[error("storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Storage(ref e) => {
                tracing::error!("topology store failed: {e:#}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

// ─── DTO types ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SaveResult {
    pub message: String,
}

// ─── Handlers ────────────────────────────────────────────────────────────────

pub async fn save_topology(
    State(state): State<AppState>,
    Json(topology): Json<Value>,
) -> Result<Json<SaveResult>, ApiError> {
    let index = with_store(state, move |store| store.append(topology)).await?;
    tracing::info!(index, "topology saved");
    Ok(Json(SaveResult {
        message: "Topology saved successfully".into(),
    }))
}

pub async fn get_topologies(State(state): State<AppState>) -> Result<Json<Vec<Value>>, ApiError> {
    let all = with_store(state, |store| store.load()).await?;
    Ok(Json(all))
}

/// Any index that is not a list position (negative, non-numeric, past the
/// end) is a 404.
pub async fn get_topology(
    State(state): State<AppState>,
    Path(index): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let index: usize = index.parse().map_err(|_| ApiError::NotFound)?;
    with_store(state, move |store| store.get(index))
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

// ─── Blocking bridge ─────────────────────────────────────────────────────────

/// Run a store operation on the blocking pool while holding the store lock.
async fn with_store<T, F>(state: AppState, op: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&TopologyStore) -> anyhow::Result<T> + Send + 'static,
{
    let store = Arc::clone(&state.store);
    task::spawn_blocking(move || {
        let guard = store
            .lock()
            .map_err(|_| anyhow::anyhow!("topology store lock poisoned"))?;
        op(&guard)
    })
    .await
    .map_err(|e| anyhow::anyhow!("store task failed: {e}"))?
    .map_err(ApiError::from)
}

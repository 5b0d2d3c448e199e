use std::{
    env,
    net::SocketAddr,
    sync::{Arc, Mutex, MutexGuard},
};

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use engine::editor::{
    EditorManifest, EditorSnapshot, EditorTimeline, FramesRequest, SeekRequest, StepRequest,
};
use flowgrid::editor_api::{EditorApiError, EditorSession};
use flowgrid::logging;
use flowgrid::settings::SettingsStore;

#[derive(Clone)]
struct AppState {
    session: Arc<Mutex<EditorSession>>,
}

impl AppState {
    fn new(session: EditorSession) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
        }
    }

    /// Recovers the session from a poisoned lock.
    fn lock(&self) -> MutexGuard<'_, EditorSession> {
        self.session.lock().unwrap_or_else(|poisoned| {
            warn!("editor session lock was poisoned");
            poisoned.into_inner()
        })
    }
}

fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health))
        .route("/api/manifest", get(manifest))
        .route("/api/agent/state", get(agent_state))
        .route("/api/agent/timeline", get(agent_timeline))
        .route("/api/agent/step", post(agent_step))
        .route("/api/agent/rewind", post(agent_rewind))
        .route("/api/agent/forward", post(agent_forward))
        .route("/api/agent/seek", post(agent_seek))
        .route("/api/agent/reset", post(agent_reset))
        .with_state(state)
        .layer(cors)
}

fn resolve_editor_api_addr<F>(mut get_env: F) -> SocketAddr
where
    F: FnMut(&str) -> Option<String>,
{
    if let Some(addr) = get_env("FLOWGRID_EDITOR_API_ADDR").and_then(|v| v.parse().ok()) {
        return addr;
    }

    if let Some(port) = get_env("FLOWGRID_EDITOR_API_PORT").and_then(|v| v.parse::<u16>().ok()) {
        return SocketAddr::from(([127, 0, 0, 1], port));
    }

    SocketAddr::from(([127, 0, 0, 1], 4000))
}

async fn health() -> &'static str {
    "ok"
}

async fn manifest(State(state): State<AppState>) -> Json<EditorManifest> {
    Json(state.lock().manifest())
}

async fn agent_state(State(state): State<AppState>) -> Json<EditorSnapshot> {
    let snapshot = state.lock().state();
    Json(snapshot)
}

async fn agent_timeline(State(state): State<AppState>) -> Json<EditorTimeline> {
    let timeline = state.lock().timeline();
    Json(timeline)
}

async fn agent_step(
    State(state): State<AppState>,
    Json(payload): Json<StepRequest>,
) -> Result<Json<EditorSnapshot>, (StatusCode, String)> {
    let snapshot = state
        .lock()
        .step(&payload.action_id, payload.x, payload.y);

    snapshot.map(Json).map_err(|err| {
        match &err {
            EditorApiError::UnknownActionId(id) => warn!(action_id = %id, "unknown editor action"),
            EditorApiError::MissingCell(id) => warn!(action_id = %id, "editor action missing cell"),
        }
        (StatusCode::BAD_REQUEST, err.to_string())
    })
}

async fn agent_rewind(
    State(state): State<AppState>,
    Json(payload): Json<FramesRequest>,
) -> Json<EditorSnapshot> {
    let snapshot = state.lock().rewind(payload.frames);
    Json(snapshot)
}

async fn agent_forward(
    State(state): State<AppState>,
    Json(payload): Json<FramesRequest>,
) -> Json<EditorSnapshot> {
    let snapshot = state.lock().forward(payload.frames);
    Json(snapshot)
}

async fn agent_seek(
    State(state): State<AppState>,
    Json(payload): Json<SeekRequest>,
) -> Json<EditorSnapshot> {
    let snapshot = state.lock().seek(payload.frame);
    Json(snapshot)
}

async fn agent_reset(State(state): State<AppState>) -> Json<EditorSnapshot> {
    let snapshot = state.lock().reset();
    Json(snapshot)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = SettingsStore::from_env().load();
    logging::init(settings.logging.debug);

    let state = AppState::new(EditorSession::from_settings(&settings)?);
    let app = router(state);

    let addr = resolve_editor_api_addr(|k| env::var(k).ok());
    info!(%addr, "editor api listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use box_packer::Error;
use box_packer::engine::PackingConfig;
use box_packer::presets::{BoxPreset, ItemBoxPreset, Preset, PresetStore};
use box_packer::request::{PackOutput, PackRequest};
use box_packer::worker::Worker;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

struct AppState {
    // Serializes pack requests internally
    worker: Worker,
    box_presets: Mutex<PresetStore<BoxPreset>>,
    item_box_presets: Mutex<PresetStore<ItemBoxPreset>>,
}

type SharedState = Arc<AppState>;

struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::InvalidInput(_) | Error::Json(_) => StatusCode::BAD_REQUEST,
            Error::PresetNotFound(_) => StatusCode::NOT_FOUND,
            Error::DuplicatePreset(_) => StatusCode::CONFLICT,
            Error::WorkerUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Error::Io(_) | Error::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
            sentry::capture_message(&self.0.to_string(), sentry::Level::Error);
        }
        let body = Envelope::<()> {
            success: false,
            data: None,
            message: None,
            error: Some(self.0.to_string()),
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Serialize)]
struct Envelope<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> Envelope<T> {
    fn data(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
        })
    }

    fn message(message: &str) -> Json<Self> {
        Json(Self {
            success: true,
            data: None,
            message: Some(message.to_string()),
            error: None,
        })
    }
}

#[derive(Deserialize)]
struct ReplaceAll<T> {
    data: Vec<T>,
}

#[derive(Serialize)]
struct PackResponse {
    /// Milliseconds spent in the engine.
    timing: f64,
    #[serde(flatten)]
    result: PackOutput,
}

async fn pack(
    State(state): State<SharedState>,
    Json(req): Json<PackRequest>,
) -> Result<Json<PackResponse>, ApiError> {
    tracing::info!(
        items = req.items.len(),
        containers = req.containers.len(),
        units = req.total_units(),
        "POST /pack"
    );

    // Reject bad input before queueing behind the worker
    req.validate()?;

    let outcome = state.worker.pack(req).await?;
    tracing::info!(
        timing_ms = outcome.elapsed_ms,
        containers = outcome.output.containers.len(),
        unpacked = outcome.output.unpacked_items.len(),
        "packed"
    );

    Ok(Json(PackResponse {
        timing: outcome.elapsed_ms,
        result: outcome.output,
    }))
}

async fn list_presets<T: Preset>(store: &Mutex<PresetStore<T>>) -> Json<Envelope<Vec<T>>> {
    Envelope::data(store.lock().await.list().to_vec())
}

async fn replace_presets<T: Preset>(
    store: &Mutex<PresetStore<T>>,
    entries: Vec<T>,
) -> Result<Json<Envelope<()>>, ApiError> {
    store.lock().await.replace_all(entries)?;
    Ok(Envelope::message("presets saved"))
}

async fn get_box_presets(State(state): State<SharedState>) -> Json<Envelope<Vec<BoxPreset>>> {
    list_presets(&state.box_presets).await
}

async fn save_box_presets(
    State(state): State<SharedState>,
    Json(body): Json<ReplaceAll<BoxPreset>>,
) -> Result<Json<Envelope<()>>, ApiError> {
    replace_presets(&state.box_presets, body.data).await
}

async fn add_box_preset(
    State(state): State<SharedState>,
    Json(preset): Json<BoxPreset>,
) -> Result<Json<Envelope<BoxPreset>>, ApiError> {
    let mut store = state.box_presets.lock().await;
    let added = store.add(preset)?.clone();
    Ok(Envelope::data(added))
}

async fn update_box_preset(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(preset): Json<BoxPreset>,
) -> Result<Json<Envelope<BoxPreset>>, ApiError> {
    let mut store = state.box_presets.lock().await;
    let updated = store.update(&id, preset)?.clone();
    Ok(Envelope::data(updated))
}

async fn delete_box_preset(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<BoxPreset>>, ApiError> {
    let removed = state.box_presets.lock().await.delete(&id)?;
    Ok(Envelope::data(removed))
}

async fn get_item_box_presets(State(state): State<SharedState>) -> Json<Envelope<Vec<ItemBoxPreset>>> {
    list_presets(&state.item_box_presets).await
}

async fn save_item_box_presets(
    State(state): State<SharedState>,
    Json(body): Json<ReplaceAll<ItemBoxPreset>>,
) -> Result<Json<Envelope<()>>, ApiError> {
    replace_presets(&state.item_box_presets, body.data).await
}

async fn health() -> Json<Envelope<()>> {
    Envelope::message("ok")
}

fn init_state() -> Result<AppState, Error> {
    let dir = PathBuf::from(std::env::var("PRESET_DIR").unwrap_or_else(|_| "data".to_string()));
    Ok(AppState {
        worker: Worker::spawn(PackingConfig::default()),
        box_presets: Mutex::new(PresetStore::load(dir.join("boxPresets.json"))?),
        item_box_presets: Mutex::new(PresetStore::load(dir.join("itemBoxPresets.json"))?),
    })
}

fn main() {
    let _sentry = sentry::init((
        std::env::var("SENTRY_DSN").ok(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    ));

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
        .block_on(serve());
}

async fn serve() {
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("development.log")
        .expect("failed to open development.log");

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_max_level(Level::INFO)
        .init();

    let state = init_state().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let addr = format!("0.0.0.0:{port}");

    let app = Router::new()
        .route("/up", get(|| async { "ok" }))
        .route("/pack", post(pack))
        .route("/api/health", get(health))
        .route("/api/box-presets", get(get_box_presets).post(save_box_presets))
        .route("/api/box-presets/add", post(add_box_preset))
        .route("/api/box-presets/{id}", put(update_box_preset).delete(delete_box_preset))
        .route(
            "/api/item-box-presets",
            get(get_item_box_presets).post(save_item_box_presets),
        )
        .with_state(Arc::new(state))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    eprintln!("Listening on {addr}");
    axum::serve(listener, app).await.unwrap();
}

//! HTTP server and live heatmap publishing.
//!
//! - `GET /` - embedded single-page client
//! - `GET /events` - SSE stream of heatmap snapshots
//! - `GET /api/heatmap` - one-shot snapshot for polling clients
//! - `GET /api/health` - health check for dev tooling
//! - `GET /static/*` - optional external assets (e.g. a keyboard SVG)

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    response::{Html, Json},
    routing::get,
    Router,
};
use futures::Stream;
use serde::Serialize;
use tokio_stream::{wrappers::IntervalStream, StreamExt};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::heatmap::{build_snapshot, ColorMapper, HeatCell, Normalizer};
use crate::store::{CountSource, KeyCount};

/// Default snapshot push cadence.
pub const DEFAULT_PUSH_INTERVAL: Duration = Duration::from_millis(500);

/// Application state shared across handlers.
///
/// The strategy pair is fixed at startup; only the ratio closure derived from
/// it is rebuilt per tick.
pub struct AppState {
    pub source: Arc<dyn CountSource>,
    pub normalizer: Box<dyn Normalizer>,
    pub palette: Box<dyn ColorMapper>,
    pub push_interval: Duration,
}

/// Server configuration.
pub struct ServerConfig {
    pub port: u16,
    pub open_browser: bool,
    pub push_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            open_browser: true,
            push_interval: DEFAULT_PUSH_INTERVAL,
        }
    }
}

/// Start the HTTP server.
pub async fn run_server(
    source: Arc<dyn CountSource>,
    normalizer: Box<dyn Normalizer>,
    palette: Box<dyn ColorMapper>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    let state = Arc::new(AppState {
        source,
        normalizer,
        palette,
        push_interval: config.push_interval,
    });

    let static_dir = find_static_dir();

    let app = Router::new()
        .route("/", get(index_handler))
        .route("/events", get(events_handler))
        .route("/api/heatmap", get(heatmap_handler))
        .route("/api/health", get(health_handler))
        .nest_service("/static", ServeDir::new(&static_dir))
        .layer(CorsLayer::permissive())
        .with_state(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    if config.open_browser {
        // Use localhost for the browser URL even though we bind to 0.0.0.0
        let url = format!("http://127.0.0.1:{}", config.port);
        #[cfg(target_os = "macos")]
        let _ = std::process::Command::new("open").arg(&url).spawn();
        #[cfg(target_os = "linux")]
        let _ = std::process::Command::new("xdg-open").arg(&url).spawn();
    }

    tracing::info!(
        port = config.port,
        push_interval_ms = config.push_interval.as_millis() as u64,
        normalizer = state.normalizer.id(),
        palette = state.palette.id(),
        "heatmap viewer listening"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Helpers ---

/// Find the external static assets directory.
/// Checks the deploy path first, then the local dev path.
fn find_static_dir() -> String {
    let candidates = ["static", "src/viewer/static"];

    for path in candidates {
        if std::path::Path::new(path).exists() {
            return path.to_string();
        }
    }

    // ServeDir handles a missing directory gracefully
    "static".to_string()
}

/// Read the current batch off the blocking pool (rusqlite is synchronous).
/// Returns None when the read fails; the caller skips that tick.
async fn fetch_batch(state: &Arc<AppState>) -> Option<Vec<KeyCount>> {
    let source = Arc::clone(&state.source);
    match tokio::task::spawn_blocking(move || source.fetch_counts()).await {
        Ok(Ok(batch)) => Some(batch),
        Ok(Err(e)) => {
            tracing::debug!(error = %e, "counter read failed, skipping tick");
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, "counter read task failed, skipping tick");
            None
        }
    }
}

/// One tick of the publish loop: read the current counts and render them into
/// a single SSE event. Any failure skips the tick so the feed stays alive.
async fn publish_tick(state: Arc<AppState>) -> Option<Event> {
    let batch = fetch_batch(&state).await?;
    let cells = build_snapshot(&batch, state.normalizer.as_ref(), state.palette.as_ref());
    match Event::default().json_data(&cells) {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::warn!(error = %e, "snapshot serialization failed, skipping tick");
            None
        }
    }
}

// --- Handlers ---

/// Default embedded HTML (fallback if external file not found).
const EMBEDDED_INDEX_HTML: &str = include_str!("static/index.html");

/// Serve the main HTML page.
///
/// Checks for an external file first (for fast iteration), falls back to the
/// embedded copy.
async fn index_handler() -> Html<String> {
    let external_paths = ["static/index.html", "src/viewer/static/index.html"];

    for path in external_paths {
        if let Ok(content) = std::fs::read_to_string(path) {
            return Html(content);
        }
    }

    Html(EMBEDDED_INDEX_HTML.to_string())
}

/// GET /events - SSE stream of heatmap snapshots.
///
/// Each subscription runs its own interval-driven publish loop; ticks are
/// strictly sequential within a subscription because the next interval fire
/// is not consumed until the previous tick future completes. Dropping the
/// stream on client disconnect stops the loop and releases the timer.
async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    tracing::info!("heatmap client subscribed");

    let ticks = IntervalStream::new(tokio::time::interval(state.push_interval));
    let stream = ticks
        .then(move |_| {
            let state = Arc::clone(&state);
            async move { publish_tick(state).await }
        })
        .filter_map(|event| event)
        .map(Ok::<Event, Infallible>);

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// GET /api/heatmap - one-shot snapshot.
/// Returns an empty array when the counter store is unavailable.
async fn heatmap_handler(State(state): State<Arc<AppState>>) -> Json<Vec<HeatCell>> {
    match fetch_batch(&state).await {
        Some(batch) => Json(build_snapshot(
            &batch,
            state.normalizer.as_ref(),
            state.palette.as_ref(),
        )),
        None => Json(Vec::new()),
    }
}

/// GET /api/health - health check endpoint for dev tooling.
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

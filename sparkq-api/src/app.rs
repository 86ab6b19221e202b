/// Application state and router builder
///
/// Defines the shared application state and builds the Axum router with
/// all routes and middleware.
use crate::{lockfile::Lockfile, middleware::security::SecurityHeadersLayer, routes};
use axum::{
    routing::{get, post, put},
    Router,
};
use sparkq_core::{config::FileConfig, scheduler::Scheduler, store::Store};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::CorsLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

const REQUEST_TIMEOUT_SECONDS: u64 = 30;
const STATIC_ASSET_DIR: &str = "sparkq-api/static";

/// Shared application state, cloned per request via Axum's `State`
/// extractor. Everything inside is itself cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub scheduler: Arc<Scheduler>,
    pub config: Arc<FileConfig>,
    pub lockfile: Arc<Lockfile>,
}

impl AppState {
    pub fn new(store: Store, config: FileConfig, lockfile: Lockfile) -> Self {
        let scheduler = Scheduler::new(store.clone());
        Self {
            store: Arc::new(store),
            scheduler: Arc::new(scheduler),
            config: Arc::new(config),
            lockfile: Arc::new(lockfile),
        }
    }
}

/// Builds the complete Axum router: the `/health`, `/api/*` JSON surface,
/// and a static-asset fallback under `/ui`.
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                       # liveness + DB check
/// ├── /api/version
/// ├── /api/stats
/// ├── /api/sessions[...]
/// ├── /api/queues[...]
/// ├── /api/tasks[...]
/// └── /ui/...                       # static dashboard assets
/// ```
///
/// Middleware stack, bottom to top: `TraceLayer` (request logging),
/// `TimeoutLayer` (per-request deadline), `CorsLayer`, the request-id
/// stamper, then `SecurityHeadersLayer`.
pub fn build_router(state: AppState) -> Router {
    let session_routes = Router::new()
        .route("/", get(routes::sessions::list).post(routes::sessions::create))
        .route(
            "/:id",
            get(routes::sessions::get)
                .put(routes::sessions::update)
                .delete(routes::sessions::delete),
        )
        .route("/:id/end", put(routes::sessions::end));

    let queue_routes = Router::new()
        .route("/", get(routes::queues::list).post(routes::queues::create))
        .route(
            "/:id",
            get(routes::queues::get)
                .put(routes::queues::update)
                .delete(routes::queues::delete),
        )
        .route("/:id/end", put(routes::queues::end))
        .route("/:id/archive", put(routes::queues::archive))
        .route("/:id/unarchive", put(routes::queues::unarchive))
        .route("/:id/claim", post(routes::tasks::claim_by_queue));

    let task_routes = Router::new()
        .route("/", get(routes::tasks::list).post(routes::tasks::enqueue))
        .route("/:id", get(routes::tasks::get).delete(routes::tasks::delete))
        .route("/:id/claim", post(routes::tasks::claim_by_task))
        .route("/:id/complete", post(routes::tasks::complete))
        .route("/:id/fail", post(routes::tasks::fail))
        .route("/:id/requeue", post(routes::tasks::requeue));

    let config_routes = Router::new()
        .route("/", get(routes::config::list))
        .route("/:namespace/:key", get(routes::config::get).put(routes::config::set));

    let api_routes = Router::new()
        .route("/version", get(routes::health::version))
        .route("/stats", get(routes::stats::stats))
        .nest("/sessions", session_routes)
        .nest("/queues", queue_routes)
        .nest("/tasks", task_routes)
        .nest("/config", config_routes);

    let cors = CorsLayer::permissive();

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api_routes)
        .nest("/ui", crate::static_assets::router(STATIC_ASSET_DIR))
        .route("/", get(redirect_to_ui))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(TimeoutLayer::new(Duration::from_secs(REQUEST_TIMEOUT_SECONDS)))
        .layer(cors)
        .layer(axum::middleware::from_fn(
            crate::middleware::request_id::request_id_layer,
        ))
        .layer(SecurityHeadersLayer::new(false))
        .with_state(state)
}

async fn redirect_to_ui() -> axum::response::Redirect {
    axum::response::Redirect::temporary("/ui/")
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_compiles() {
        // AppState construction requires a live Store; exercised in
        // sparkq-api's integration tests against a real SQLite pool.
    }
}

/// Static dashboard asset serving
///
/// Any path outside `/api` and `/health` is served from a bundled asset
/// directory. The dashboard itself is out of core scope; this module only
/// wires up the fallback file service.
use axum::{routing::get_service, Router};
use tower_http::services::ServeDir;

pub fn router(asset_dir: &str) -> Router {
    Router::new().nest_service("/", get_service(ServeDir::new(asset_dir)))
}

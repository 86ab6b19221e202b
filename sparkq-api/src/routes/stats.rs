/// Summary counts for the dashboard
use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use sparkq_core::store::Stats;

pub async fn stats(State(state): State<AppState>) -> ApiResult<Json<Stats>> {
    Ok(Json(state.store.stats().await?))
}

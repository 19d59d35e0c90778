use axum::extract::State;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app::AppState;
use crate::errors::AppResult;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub db_ok: bool,
    pub db_error: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses((status = 200, description = "Service and database status", body = HealthResponse))
)]
pub async fn health(State(state): State<AppState>) -> AppResult<Json<HealthResponse>> {
    let db_check = sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(&state.pool).await;

    let (db_ok, db_error) = match db_check {
        Ok(_) => (true, None),
        Err(err) => {
            tracing::warn!(error = %err, "health check could not reach the database");
            (false, Some(err.to_string()))
        }
    };

    Ok(Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        db_ok,
        db_error,
    }))
}

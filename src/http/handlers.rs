//! HTTP handlers for the API mount point.
//!
//! The domain route table lives in its own layer; this module provides the
//! handlers this composition shell owns itself.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::error::AppError;
use super::state::AppState;
use crate::db::StoreError;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Health check response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
}

/// GET /api/health
///
/// Verifies the service is running and the persistent store is reachable.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let database = match state.db.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
    }))
}

/// Flow summary row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowInfo {
    pub id: i64,
    pub name: String,
}

/// GET /api/flows
///
/// List stored flows. Store failures surface as a JSON error response.
pub async fn list_flows(State(state): State<AppState>) -> HandlerResult<Vec<FlowInfo>> {
    let rows: Vec<(i64, String)> = state
        .db
        .with_connection(|mut conn| async move {
            sqlx::query_as("SELECT id, name FROM hedge_fund_flows ORDER BY id")
                .fetch_all(&mut *conn)
                .await
                .map_err(StoreError::Query)
        })
        .await?;

    Ok(Json(
        rows.into_iter()
            .map(|(id, name)| FlowInfo { id, name })
            .collect(),
    ))
}

/// GET /api/flows/{flow_id}
pub async fn get_flow(
    State(state): State<AppState>,
    Path(flow_id): Path<i64>,
) -> HandlerResult<FlowInfo> {
    let row: Option<(i64, String)> = state
        .db
        .with_connection(|mut conn| async move {
            sqlx::query_as("SELECT id, name FROM hedge_fund_flows WHERE id = ?1")
                .bind(flow_id)
                .fetch_optional(&mut *conn)
                .await
                .map_err(StoreError::Query)
        })
        .await?;

    let (id, name) = row.ok_or_else(|| AppError::NotFound(format!("flow {flow_id} not found")))?;
    Ok(Json(FlowInfo { id, name }))
}

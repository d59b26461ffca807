//! HTTP route handlers.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::domain::{AirportId, CodeKind};
use crate::service::{AirportView, LookupError};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/airports/by_iata", get(by_iata))
        .route("/api/airports/by_icao", get(by_icao))
        .route("/api/airports/:id", get(by_id))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Look up an airport by IATA code.
async fn by_iata(
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> Result<Json<Arc<AirportView>>, AppError> {
    lookup(&state, &query, CodeKind::Iata).await
}

/// Look up an airport by ICAO code / ident.
async fn by_icao(
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> Result<Json<Arc<AirportView>>, AppError> {
    lookup(&state, &query, CodeKind::Icao).await
}

async fn lookup(
    state: &AppState,
    query: &LookupQuery,
    kind: CodeKind,
) -> Result<Json<Arc<AirportView>>, AppError> {
    let view = state
        .lookup
        .lookup(query.code(), kind, query.include_timezone())
        .await?;
    Ok(Json(view))
}

/// Fetch an airport by primary id. Never refreshes.
async fn by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AirportView>, AppError> {
    let view = state.lookup.get_by_id(&AirportId::new(id)).await?;
    Ok(Json(view))
}

// Error handling

#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl From<LookupError> for AppError {
    fn from(e: LookupError) -> Self {
        match e {
            LookupError::BadRequest(_) => AppError::BadRequest {
                message: e.to_string(),
            },
            LookupError::NotFound(message) => AppError::NotFound { message },
            LookupError::Store(_) => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => {
                warn!(%message, "bad request");
                (StatusCode::BAD_REQUEST, message)
            }
            AppError::NotFound { message } => {
                info!(%message, "not found");
                (StatusCode::NOT_FOUND, message)
            }
            AppError::Internal { message } => {
                error!(%message, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

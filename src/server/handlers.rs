//! HTTP handlers for the session endpoints

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use uuid::Uuid;
use validator::Validate;

use super::dto::{
    AverageDurationResponse, AverageParams, ListParams, PagedSessionsResponse, SessionRequest,
    SessionResponse,
};
use super::error::ApiError;
use crate::core::{SessionFilter, SessionRepository, StoreError};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn SessionRepository>,
}

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "sessions-api"
    }))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let session = state
        .repository
        .get(&id)
        .await?
        .ok_or(StoreError::NotFound { id })?;

    Ok((
        [(header::ETAG, session.etag.clone())],
        Json(SessionResponse::from(session)),
    )
        .into_response())
}

pub async fn list_sessions(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<PagedSessionsResponse>, ApiError> {
    let filter = SessionFilter {
        name: params.name.clone(),
        tag: params.tag.clone(),
    };
    let list = state.repository.list(params.page_request(), filter).await?;

    Ok(Json(PagedSessionsResponse::from_page(list, &params)))
}

pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<SessionRequest>,
) -> Result<Response, ApiError> {
    request.validate()?;
    if state.repository.get_by_name(&request.name).await?.is_some() {
        return Err(ApiError::NameTaken { name: request.name });
    }

    let session = state.repository.add(request.into_draft()).await?;
    tracing::info!(id = %session.id, name = %session.name, "session created");

    Ok((
        StatusCode::CREATED,
        [
            (header::ETAG, session.etag.clone()),
            (header::LOCATION, format!("/sessions/{}", session.id)),
        ],
        Json(SessionResponse::from(session)),
    )
        .into_response())
}

pub async fn update_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(request): Json<SessionRequest>,
) -> Result<Response, ApiError> {
    request.validate()?;
    let etag = if_match(&headers)?;

    // The name must stay unique, but a session may keep its own
    if let Some(existing) = state.repository.get_by_name(&request.name).await? {
        if existing.id != id {
            return Err(ApiError::NameTaken { name: request.name });
        }
    }

    let session = state
        .repository
        .update(&id, request.into_draft(), etag)
        .await?;

    Ok((
        [(header::ETAG, session.etag.clone())],
        Json(SessionResponse::from(session)),
    )
        .into_response())
}

pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let etag = if_match(&headers)?;
    state.repository.delete(&id, etag).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn average_duration(
    State(state): State<AppState>,
    Query(params): Query<AverageParams>,
) -> Result<Json<AverageDurationResponse>, ApiError> {
    let average = state
        .repository
        .average_duration(params.from, params.to)
        .await?;

    Ok(Json(AverageDurationResponse {
        average_duration_seconds: average,
    }))
}

fn if_match(headers: &HeaderMap) -> Result<&str, ApiError> {
    headers
        .get(header::IF_MATCH)
        .and_then(|value| value.to_str().ok())
        .ok_or(ApiError::MissingPrecondition)
}

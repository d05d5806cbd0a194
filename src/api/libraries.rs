//! Catalogue handlers (`/api/libraries`)

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use crate::domain::{DomainError, LibraryItemInput};
use crate::infrastructure::AppState;
use crate::infrastructure::auth::Claims;
use crate::services::library_service;

pub async fn create_item(
    State(state): State<AppState>,
    claims: Claims,
    Json(payload): Json<LibraryItemInput>,
) -> Result<impl IntoResponse, DomainError> {
    let item = library_service::create_item(&state, &claims.sub, payload).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn list_items(
    State(state): State<AppState>,
    _claims: Claims,
) -> Result<impl IntoResponse, DomainError> {
    Ok(Json(library_service::list_items(&state).await?))
}

pub async fn get_item(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, DomainError> {
    let item = library_service::get_item(&state, &claims.sub, id).await?;
    Ok(Json(item))
}

pub async fn update_item(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
    Json(payload): Json<LibraryItemInput>,
) -> Result<impl IntoResponse, DomainError> {
    let item = library_service::update_item(&state, &claims.sub, id, payload).await?;
    Ok(Json(item))
}

pub async fn delete_item(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, DomainError> {
    library_service::delete_item(&state, &claims.sub, id).await?;
    Ok(Json(json!({ "status": "library deleted" })))
}

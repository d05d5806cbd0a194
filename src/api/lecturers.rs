use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use crate::domain::{DomainError, LecturerInput};
use crate::infrastructure::AppState;
use crate::infrastructure::auth::Claims;
use crate::services::lecturer_service;

pub async fn create_lecturer(
    State(state): State<AppState>,
    claims: Claims,
    Json(payload): Json<LecturerInput>,
) -> Result<impl IntoResponse, DomainError> {
    let lecturer = lecturer_service::create_lecturer(&state, &claims.sub, payload).await?;
    Ok((StatusCode::CREATED, Json(lecturer)))
}

pub async fn list_lecturers(
    State(state): State<AppState>,
    _claims: Claims,
) -> Result<impl IntoResponse, DomainError> {
    Ok(Json(lecturer_service::list_lecturers(&state).await?))
}

pub async fn get_lecturer(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, DomainError> {
    let lecturer = lecturer_service::get_lecturer(&state, &claims.sub, id).await?;
    Ok(Json(lecturer))
}

pub async fn update_lecturer(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
    Json(payload): Json<LecturerInput>,
) -> Result<impl IntoResponse, DomainError> {
    let lecturer = lecturer_service::update_lecturer(&state, &claims.sub, id, payload).await?;
    Ok(Json(lecturer))
}

pub async fn delete_lecturer(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, DomainError> {
    lecturer_service::delete_lecturer(&state, &claims.sub, id).await?;
    Ok(Json(json!({ "status": "lecturer deleted" })))
}

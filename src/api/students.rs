use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use crate::domain::{DomainError, StudentInput};
use crate::infrastructure::AppState;
use crate::infrastructure::auth::Claims;
use crate::services::student_service;

pub async fn create_student(
    State(state): State<AppState>,
    claims: Claims,
    Json(payload): Json<StudentInput>,
) -> Result<impl IntoResponse, DomainError> {
    let student = student_service::create_student(&state, &claims.sub, payload).await?;
    Ok((StatusCode::CREATED, Json(student)))
}

pub async fn list_students(
    State(state): State<AppState>,
    _claims: Claims,
) -> Result<impl IntoResponse, DomainError> {
    let students = student_service::list_students(&state).await?;
    Ok(Json(students))
}

pub async fn get_student(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, DomainError> {
    let student = student_service::get_student(&state, &claims.sub, id).await?;
    Ok(Json(student))
}

pub async fn update_student(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
    Json(payload): Json<StudentInput>,
) -> Result<impl IntoResponse, DomainError> {
    let student = student_service::update_student(&state, &claims.sub, id, payload).await?;
    Ok(Json(student))
}

pub async fn delete_student(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, DomainError> {
    student_service::delete_student(&state, &claims.sub, id).await?;
    Ok(Json(json!({ "status": "student deleted" })))
}

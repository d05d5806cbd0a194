//! Borrow/return handlers (`/api/borrow`, `/api/return`)

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::domain::{DomainError, LoanRequest};
use crate::infrastructure::AppState;
use crate::infrastructure::auth::Claims;
use crate::services::library_service;

pub async fn borrow_book(
    State(state): State<AppState>,
    claims: Claims,
    Json(payload): Json<LoanRequest>,
) -> Result<impl IntoResponse, DomainError> {
    let loan = library_service::borrow_book(&state, &claims.sub, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "status": "Book borrowed!", "loan": loan })),
    ))
}

pub async fn return_book(
    State(state): State<AppState>,
    claims: Claims,
    Json(payload): Json<LoanRequest>,
) -> Result<impl IntoResponse, DomainError> {
    let loan = library_service::return_book(&state, &claims.sub, payload).await?;
    Ok(Json(json!({ "status": "Book returned!", "loan": loan })))
}

pub async fn loan_history(
    State(state): State<AppState>,
    _claims: Claims,
) -> Result<impl IntoResponse, DomainError> {
    Ok(Json(library_service::loan_history(&state).await?))
}

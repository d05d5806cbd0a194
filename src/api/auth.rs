use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::*;
use serde::Deserialize;
use serde_json::json;

use crate::domain::DomainError;
use crate::infrastructure::AppState;
use crate::infrastructure::auth::{Claims, hash_password, verify_password};
use crate::models::user::{self, Entity as User};

#[derive(Deserialize)]
pub struct LoginRequest {
    username: String,
    password: String,
}

fn invalid_credentials() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "Invalid credentials" })),
    )
        .into_response()
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, DomainError> {
    tracing::info!("Login attempt for user: {}", payload.username);

    let Some(user) = User::find()
        .filter(user::Column::Username.eq(&payload.username))
        .one(state.db())
        .await?
    else {
        tracing::warn!("User not found: {}", payload.username);
        return Ok(invalid_credentials());
    };

    if !matches!(verify_password(&payload.password, &user.password_hash), Ok(true)) {
        tracing::warn!("Password verification failed for user: {}", user.username);
        return Ok(invalid_credentials());
    }

    let token = state
        .auth
        .create_jwt(&user.username, &user.role)
        .map_err(DomainError::Internal)?;
    Ok((StatusCode::OK, Json(json!({ "token": token }))).into_response())
}

/// Re-issue a token for a caller whose token is still valid
pub async fn refresh(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<impl IntoResponse, DomainError> {
    let token = state
        .auth
        .create_jwt(&claims.sub, &claims.role)
        .map_err(DomainError::Internal)?;
    Ok(Json(json!({ "token": token })))
}

/// Tokens are stateless; the client discards its copy.
pub async fn logout(claims: Claims) -> impl IntoResponse {
    tracing::info!("User logged out: {}", claims.sub);
    (StatusCode::OK, Json(json!({ "message": "Logged out" })))
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    username: String,
    password: String,
    #[serde(default)]
    role: Option<String>,
}

fn admins_only() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({ "error": "Only admins can register users" })),
    )
        .into_response()
}

/// Insert the first account as `admin`, only while `users` is empty.
///
/// The emptiness check and the insert are one statement, so of several
/// concurrent bootstrap attempts exactly one gets a row. `None` means the
/// table already had users.
async fn bootstrap_admin(
    db: &DatabaseConnection,
    username: &str,
    password_hash: &str,
    now: &str,
) -> Result<Option<user::Model>, DbErr> {
    let result = db
        .execute(Statement::from_sql_and_values(
            db.get_database_backend(),
            r#"
            INSERT INTO users (username, password_hash, role, created_at, updated_at)
            SELECT ?, ?, 'admin', ?, ?
            WHERE NOT EXISTS (SELECT 1 FROM users)
            "#,
            [
                Value::from(username),
                Value::from(password_hash),
                Value::from(now),
                Value::from(now),
            ],
        ))
        .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    User::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await
}

/// First call bootstraps an admin; after that only admins may add users.
pub async fn register(
    State(state): State<AppState>,
    claims: Option<Claims>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Response, DomainError> {
    if payload.username.trim().is_empty() || payload.password.is_empty() {
        return Err(DomainError::validation("username and password are required"));
    }

    let is_admin = matches!(&claims, Some(c) if c.role == "admin");

    // Cheap early refusal; the bootstrap insert below makes the real decision.
    if !is_admin && User::find().count(state.db()).await? > 0 {
        return Ok(admins_only());
    }

    let password_hash = hash_password(&payload.password).map_err(DomainError::Internal)?;
    let now = chrono::Utc::now().to_rfc3339();

    let created = if is_admin {
        let new_user = user::ActiveModel {
            username: Set(payload.username),
            password_hash: Set(password_hash),
            role: Set(payload.role.unwrap_or_else(|| "staff".to_string())),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };
        new_user
            .insert(state.db())
            .await
            .map_err(|e| DomainError::Conflict(format!("Failed to create user: {}", e)))?
    } else {
        match bootstrap_admin(state.db(), &payload.username, &password_hash, &now).await? {
            Some(admin) => {
                tracing::info!("Bootstrapped admin account: {}", admin.username);
                admin
            }
            None => return Ok(admins_only()),
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User created", "user": created })),
    )
        .into_response())
}

use axum::{Json, extract::State, http::StatusCode};
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};

pub async fn health_check(State(db): State<DatabaseConnection>) -> (StatusCode, Json<Value>) {
    let database = match db.ping().await {
        Ok(()) => "ok",
        Err(e) => {
            tracing::error!("Health check ping failed: {}", e);
            "unreachable"
        }
    };
    let status = if database == "ok" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": database,
            "service": "college-records",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

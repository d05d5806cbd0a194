pub mod auth;
pub mod borrow;
pub mod error;
pub mod health;
pub mod lecturers;
pub mod libraries;
pub mod students;

use axum::{
    Router,
    routing::{get, post},
};

use crate::infrastructure::AppState;

/// Every route. Handlers under `/api` require a bearer token.
pub fn api_router(state: AppState) -> Router {
    let protected = Router::new()
        // Students
        .route(
            "/students",
            get(students::list_students).post(students::create_student),
        )
        .route(
            "/students/:id",
            get(students::get_student)
                .put(students::update_student)
                .delete(students::delete_student),
        )
        // Lecturers
        .route(
            "/lecturers",
            get(lecturers::list_lecturers).post(lecturers::create_lecturer),
        )
        .route(
            "/lecturers/:id",
            get(lecturers::get_lecturer)
                .put(lecturers::update_lecturer)
                .delete(lecturers::delete_lecturer),
        )
        // Library catalogue
        .route(
            "/libraries",
            get(libraries::list_items).post(libraries::create_item),
        )
        .route(
            "/libraries/:id",
            get(libraries::get_item)
                .put(libraries::update_item)
                .delete(libraries::delete_item),
        )
        // Loans
        .route(
            "/borrow",
            get(borrow::loan_history).post(borrow::borrow_book),
        )
        .route("/return", post(borrow::return_book));

    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Auth
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
        .route("/register", post(auth::register))
        .nest("/api", protected)
        .with_state(state)
}

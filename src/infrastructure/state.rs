//! Application state containing repositories and shared resources

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::domain::{
    LecturerRepository, LibraryItemRepository, LoanRepository, StudentRepository,
};
use crate::infrastructure::audit::AuditSink;
use crate::infrastructure::auth::AuthKeys;
use crate::infrastructure::cache::{CachePolicy, FingerprintCache, Fingerprints};
use crate::infrastructure::{
    SeaOrmLecturerRepository, SeaOrmLibraryItemRepository, SeaOrmLoanRepository,
    SeaOrmStudentRepository,
};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection (users table and health checks)
    db: DatabaseConnection,
    pub student_repo: Arc<dyn StudentRepository>,
    pub lecturer_repo: Arc<dyn LecturerRepository>,
    pub library_repo: Arc<dyn LibraryItemRepository>,
    pub loan_repo: Arc<dyn LoanRepository>,
    /// Read-through/write-through mirror of entity rows
    pub cache: Fingerprints,
    /// Fire-and-forget activity/audit trail
    pub audit: AuditSink,
    /// Session token keys
    pub auth: AuthKeys,
}

impl AppState {
    /// Create a new AppState with all repositories initialized
    pub fn new(
        db: DatabaseConnection,
        cache_backend: Arc<dyn FingerprintCache>,
        cache_policy: CachePolicy,
        audit: AuditSink,
        auth: AuthKeys,
    ) -> Self {
        Self {
            student_repo: Arc::new(SeaOrmStudentRepository::new(db.clone())),
            lecturer_repo: Arc::new(SeaOrmLecturerRepository::new(db.clone())),
            library_repo: Arc::new(SeaOrmLibraryItemRepository::new(db.clone())),
            loan_repo: Arc::new(SeaOrmLoanRepository::new(db.clone())),
            cache: Fingerprints::new(cache_backend, cache_policy),
            audit,
            auth,
            db,
        }
    }

    /// Get the database connection
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

// Implement FromRef to allow extracting DatabaseConnection from AppState
impl axum::extract::FromRef<AppState> for DatabaseConnection {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

// Lets the `Claims` extractor find the signing keys
impl axum::extract::FromRef<AppState> for AuthKeys {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

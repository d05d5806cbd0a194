//! Infrastructure layer - Framework implementations
//!
//! This layer contains:
//! - Database connection and migrations (db)
//! - HTTP server setup (server)
//! - Configuration loading (config)
//! - Authentication (auth)
//! - Fingerprint cache backends (cache)
//! - Activity/audit trail (audit)
//! - Repository implementations (repositories)
//! - Application state (state)

pub mod audit;
pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod repositories;
pub mod server;
pub mod state;

pub use repositories::*;
pub use state::AppState;

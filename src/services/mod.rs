//! Services Layer
//!
//! This module contains the business workflows behind the HTTP handlers:
//! validate, write to the store, mirror into the cache, emit audit events.

pub mod lecturer_service;
pub mod library_service;
pub mod student_service;

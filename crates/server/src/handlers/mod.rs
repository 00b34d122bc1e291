//! # API Route Handlers
//!
//! This module organizes all the Axum route handlers for the
//! `explore-assistant-server`.

pub mod explore;
pub mod general;

// Re-export all handlers to make them accessible to the router under a single
// `handlers::` path.
pub use explore::*;
pub use general::*;

// Shared items used by multiple handler modules.
use super::{errors::AppError, state::AppState, types::ReturnObject};

//! # Application State
//!
//! This module defines the shared application state (`AppState`) and the logic
//! for building it at startup. The state holds the configuration loaded once per
//! process and the pooled HTTP client used for every Looker session.

use crate::config::AppConfig;
use std::sync::Arc;
use tracing::{info, warn};

/// The shared application state, accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration, loaded at startup.
    pub config: Arc<AppConfig>,
    /// The HTTP client shared by all Looker sessions.
    pub http_client: reqwest::Client,
}

/// Builds the shared application state from the configuration.
///
/// The deployment constants are validated per request; an incomplete set is only
/// logged here so the server can still start and report the problem to callers.
pub async fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let http_client = config.looker.build_http_client()?;
    info!(looker = ?config.looker, "Initialized Looker HTTP client.");

    let missing = config.explore_assistant.missing_fields();
    if !missing.is_empty() {
        warn!("Explore assistant deployment config is incomplete: {missing:?}");
    }

    Ok(AppState {
        config: Arc::new(config),
        http_client,
    })
}

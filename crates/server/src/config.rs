//! # Application Configuration
//!
//! This module defines the configuration structure for the `explore-assistant-server`
//! and the logic for loading it once at startup from programmatic defaults, an
//! optional `config.yml` file and environment variables.

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use explore_assistant::{AssistantConfig, LookerSettings};
use regex::Regex;
use serde::Deserialize;
use std::env;
use std::fs;
use tracing::info;

/// A custom error type for configuration issues.
#[derive(Debug)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    General(String),
    /// Indicates an explicitly requested configuration file was not found.
    NotFound(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::General(msg) => write!(f, "Configuration error: {msg}"),
            ConfigError::NotFound(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

// --- Deployment constants ---

pub const DEFAULT_CONNECTION_NAME: &str = "looker-private-demo";
pub const DEFAULT_DATASET: &str = "explore_assistant";
pub const DEFAULT_EXAMPLES_TABLE: &str = "explore_assistant_examples";
pub const DEFAULT_REFINEMENTS_TABLE: &str = "explore_assistant_refinement_examples";
pub const DEFAULT_MODEL_ID: &str = "jc-looker.cortex_pso_explore_assistant.explore_assistant_llm";

/// The root configuration structure, mapping directly to `config.yml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// The port for the server to listen on. Loaded from `PORT` env var.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Looker API credentials and transport options.
    #[serde(default)]
    pub looker: LookerSettings,
    /// The warehouse and model identifiers shared by every request.
    pub explore_assistant: DeploymentConfig,
    /// Options for how requests are read and answered.
    #[serde(default)]
    pub request: RequestConfig,
}

/// Provides a default value for the `port` field if not set in the environment.
fn default_port() -> u16 {
    8080
}

/// Process-wide constants identifying the examples tables and the model.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct DeploymentConfig {
    pub connection_name: Option<String>,
    pub dataset: Option<String>,
    pub examples_table: Option<String>,
    pub refinements_table: Option<String>,
    pub model_id: Option<String>,
}

impl DeploymentConfig {
    /// Names of the deployment constants that are still unset.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("connection_name", &self.connection_name),
            ("dataset", &self.dataset),
            ("examples_table", &self.examples_table),
            ("refinements_table", &self.refinements_table),
            ("model_id", &self.model_id),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| name)
        .collect()
    }

    /// Combines the deployment constants with the caller's model and explore.
    pub fn assistant_config(&self, model: &str, explore: &str) -> AssistantConfig {
        AssistantConfig {
            connection_name: self.connection_name.clone(),
            dataset: self.dataset.clone(),
            examples_table: self.examples_table.clone(),
            refinements_table: self.refinements_table.clone(),
            model_id: self.model_id.clone(),
            lookml_model_name: Some(model.to_string()),
            looker_explore_id: Some(explore.to_string()),
        }
    }
}

/// How the handler reads the result format and reports timing.
#[derive(Debug, Deserialize, Clone)]
pub struct RequestConfig {
    /// The request field holding the result format (`result_format` or `return_format`).
    #[serde(default = "default_result_format_field")]
    pub result_format_field: String,
    /// Whether responses carry `processing_seconds`.
    #[serde(default = "default_include_processing_seconds")]
    pub include_processing_seconds: bool,
}

fn default_result_format_field() -> String {
    "result_format".to_string()
}

fn default_include_processing_seconds() -> bool {
    true
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            result_format_field: default_result_format_field(),
            include_processing_seconds: default_include_processing_seconds(),
        }
    }
}

// Helper to read a file, substitute env vars, and return its content.
// Returns Ok(None) if the file does not exist, or an error if it fails to read.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !std::path::Path::new(path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::General(format!("Failed to read config file '{path}': {e}")))?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}")
        .map_err(|e| ConfigError::General(e.to_string()))?;
    let expanded_content = re.replace_all(&content, |caps: &regex::Captures| {
        let var_name = &caps["var"];
        env::var(var_name).unwrap_or_default()
    });

    Ok(Some(expanded_content.to_string()))
}

/// Fills an unset or empty value from an environment variable.
fn fill_from_env(value: &mut Option<String>, var: &str) {
    if value.as_deref().is_some_and(|v| !v.is_empty()) {
        return;
    }
    if let Ok(found) = env::var(var) {
        if !found.is_empty() {
            *value = Some(found);
        }
    }
}

/// Loads the application configuration.
///
/// Layers, from lowest to highest precedence:
/// - Programmatic defaults for the deployment constants.
/// - `config.yml` next to the crate manifest, or `config_path_override`. `${VAR}`
///   references in the file are substituted from the environment.
/// - Top-level environment variables such as `PORT`.
/// - Prefixed variables for nested keys, e.g. `EXPLORE_ASSISTANT_LOOKER__BASE_URL`.
///
/// Looker credentials left unset fall back to `LOOKER_BASE_URL`,
/// `LOOKER_ADMIN_CLIENT_ID` and `LOOKER_ADMIN_CLIENT_SECRET`.
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = ConfigBuilder::builder()
        // Layer 1: Programmatic defaults.
        .set_default("explore_assistant.connection_name", DEFAULT_CONNECTION_NAME)?
        .set_default("explore_assistant.dataset", DEFAULT_DATASET)?
        .set_default("explore_assistant.examples_table", DEFAULT_EXAMPLES_TABLE)?
        .set_default("explore_assistant.refinements_table", DEFAULT_REFINEMENTS_TABLE)?
        .set_default("explore_assistant.model_id", DEFAULT_MODEL_ID)?;

    // Layer 2: Config file. A missing default file is fine; a missing override is not.
    let config_path = match config_path_override {
        Some(path) => {
            let content = read_and_substitute(path)?.ok_or_else(|| {
                ConfigError::NotFound(format!("Config file not found at '{path}'."))
            })?;
            builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
            path.to_string()
        }
        None => {
            let path = format!("{}/config.yml", env!("CARGO_MANIFEST_DIR"));
            if let Some(content) = read_and_substitute(&path)? {
                builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
            }
            path
        }
    };
    info!("Loading configuration from '{config_path}' and the environment.");

    let settings = builder
        // Layer 3: Load environment variables for top-level keys like PORT.
        .add_source(Environment::default())
        // Layer 4: Load prefixed environment variables for deeper overrides.
        .add_source(
            Environment::with_prefix("EXPLORE_ASSISTANT")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    let mut config: AppConfig = settings.try_deserialize()?;

    fill_from_env(&mut config.looker.base_url, "LOOKER_BASE_URL");
    fill_from_env(&mut config.looker.client_id, "LOOKER_ADMIN_CLIENT_ID");
    fill_from_env(&mut config.looker.client_secret, "LOOKER_ADMIN_CLIENT_SECRET");

    Ok(config)
}

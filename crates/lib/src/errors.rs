use thiserror::Error;

/// Custom error types for the explore assistant pipeline.
#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("Invalid config: missing required values {0:?}")]
    InvalidConfig(Vec<&'static str>),
    #[error("Looker setting is missing: {0}")]
    MissingLookerSetting(&'static str),
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Failed to send request to Looker API: {0}")]
    LookerRequest(reqwest::Error),
    #[error("Invalid Looker API URL: {0}")]
    InvalidLookerUrl(String),
    #[error("Looker authentication failed: {0}")]
    LookerAuth(String),
    #[error("Looker API returned {status}: {body}")]
    LookerApi { status: u16, body: String },
    #[error("Explore {model}:{explore} was not found")]
    ExploreNotFound { model: String, explore: String },
    #[error("Looker did not return a slug for the SQL Runner query")]
    MissingSqlSlug,
    #[error("No examples found for explore_key {explore_key} in {table}")]
    NoExamples { explore_key: String, table: String },
    #[error("Malformed inference response: {0}")]
    MalformedInference(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

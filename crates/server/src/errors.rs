use crate::types::ReturnObject;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use explore_assistant::AssistantError;
use tracing::{error, warn};

/// A custom error type for the server application.
///
/// Every variant is reported to the caller inside the `ReturnObject` envelope;
/// only the status code differs.
#[derive(Debug)]
pub enum AppError {
    /// Missing or invalid request input. Reported as 400.
    BadRequest(String),
    /// Errors originating from the `explore_assistant` pipeline.
    Assistant(AssistantError),
    /// Generic internal server errors.
    Internal(anyhow::Error),
}

/// Conversion from `AssistantError` to `AppError`.
impl From<AssistantError> for AppError {
    fn from(err: AssistantError) -> Self {
        AppError::Assistant(err)
    }
}

/// Conversion from `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Assistant(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message placed in `error_message`.
    pub fn message(&self) -> String {
        match self {
            AppError::BadRequest(msg) => msg.clone(),
            AppError::Assistant(err) => err.to_string(),
            AppError::Internal(err) => err.to_string(),
        }
    }

    /// Writes the error into the envelope and turns it into a response.
    pub fn into_envelope_response(self, mut envelope: ReturnObject) -> Response {
        match &self {
            AppError::BadRequest(msg) => warn!("Rejected request: {msg}"),
            AppError::Assistant(err) => error!("AssistantError: {:?}", err),
            AppError::Internal(err) => error!("Internal server error: {:?}", err),
        }
        envelope.error_message = self.message();
        (self.status_code(), Json(envelope)).into_response()
    }
}

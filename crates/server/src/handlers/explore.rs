//! # Explore Handler
//!
//! The main endpoint: validates the request, runs the explore assistant for the
//! requested model and explore, and answers with the `ReturnObject` envelope.

use super::{AppError, AppState, ReturnObject};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use explore_assistant::{ExploreAssistant, ResultFormat};
use serde_json::Value;
use std::time::Instant;
use tracing::info;

/// A validated explore request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExploreRequest {
    pub lookml_model_name: String,
    pub looker_explore_id: String,
    pub user_prompt: String,
    pub result_format: ResultFormat,
}

/// Both spellings of the result format field seen in deployed clients.
const FORMAT_FIELD_NAMES: [&str; 2] = ["result_format", "return_format"];

fn required_str<'a>(body: &'a Value, field: &str) -> Result<&'a str, AppError> {
    body.get(field)
        .and_then(Value::as_str)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("{field} is required")))
}

/// Validates the request body.
///
/// The result format is read from `format_field` first and from the other known
/// spelling second; error messages always use `format_field`.
pub fn parse_explore_request(body: &Value, format_field: &str) -> Result<ExploreRequest, AppError> {
    if !body.is_object() {
        return Err(AppError::BadRequest(
            "request body must be a JSON object".to_string(),
        ));
    }

    let lookml_model_name = required_str(body, "lookml_model_name")?;
    let looker_explore_id = required_str(body, "looker_explore_id")?;
    let user_prompt = required_str(body, "user_prompt")?;

    let raw_format = std::iter::once(format_field)
        .chain(FORMAT_FIELD_NAMES.into_iter().filter(|name| *name != format_field))
        .find_map(|name| required_str(body, name).ok())
        .ok_or_else(|| AppError::BadRequest(format!("{format_field} is required")))?;
    let result_format: ResultFormat = raw_format.parse().map_err(|_| {
        AppError::BadRequest(format!(
            "{format_field} must be one of {}",
            ResultFormat::allowed_list()
        ))
    })?;

    Ok(ExploreRequest {
        lookml_model_name: lookml_model_name.to_string(),
        looker_explore_id: looker_explore_id.to_string(),
        user_prompt: user_prompt.to_string(),
        result_format,
    })
}

async fn process(
    app_state: &AppState,
    body: &[u8],
    envelope: &mut ReturnObject,
) -> Result<(), AppError> {
    let payload: Value = serde_json::from_slice(body)
        .map_err(|_| AppError::BadRequest("request body must be a JSON object".to_string()))?;
    envelope.request_object = payload.clone();

    let request = parse_explore_request(&payload, &app_state.config.request.result_format_field)?;
    envelope.return_data.content_type = request.result_format.to_string();

    let config = app_state
        .config
        .explore_assistant
        .assistant_config(&request.lookml_model_name, &request.looker_explore_id);
    let assistant = ExploreAssistant::connect(
        &config,
        app_state.http_client.clone(),
        &app_state.config.looker,
    )
    .await?;

    let result = assistant
        .get_looker_return(&request.user_prompt, request.result_format)
        .await?;
    info!(
        generated_query = %result.generated_query,
        "Executed generated query for {}",
        assistant.config().explore_key()
    );
    envelope.return_data.data = result.payload.into();

    Ok(())
}

/// The handler for the explore endpoint.
///
/// Always answers with a `ReturnObject`: 400 for invalid input, 500 for
/// configuration or downstream failures, 200 on success.
pub async fn explore_handler(State(app_state): State<AppState>, body: Bytes) -> Response {
    let started = Instant::now();
    let mut envelope = ReturnObject::default();

    let outcome = process(&app_state, &body, &mut envelope).await;

    if app_state.config.request.include_processing_seconds {
        envelope.processing_seconds = Some(started.elapsed().as_secs_f64());
    }

    match outcome {
        Ok(()) => (StatusCode::OK, Json(envelope)).into_response(),
        Err(err) => err.into_envelope_response(envelope),
    }
}

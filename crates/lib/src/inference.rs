//! # Model Inference
//!
//! Runs the prompt through a warehouse-hosted text generation model. The prompt is
//! embedded in an `ML.GENERATE_TEXT` statement that is executed through the Looker
//! SQL Runner, and the single generated value is read back from the raw result.

use crate::{errors::AssistantError, providers::looker::LookerApi};
use serde_json::Value;
use tracing::debug;

// --- Generation parameters ---

pub const TEMPERATURE: f64 = 0.05;
pub const MAX_OUTPUT_TOKENS: u32 = 1024;
pub const TOP_P: f64 = 0.98;
pub const TOP_K: u32 = 1;

/// The column the generated text is aliased to.
const GENERATED_COLUMN: &str = "generated_content";

/// Escapes a value for a single-quoted SQL string literal.
///
/// Backslashes are escaped first so a caller-supplied `\'` cannot close the literal.
pub fn escape_string_literal(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace('\'', "\\'")
}

/// Escapes the prompt so it fits in a SQL string literal.
pub fn escape_prompt(prompt: &str) -> String {
    escape_string_literal(prompt)
}

/// Wraps the prompt in a model invocation statement against `model_id`.
pub fn build_inference_sql(model_id: &str, prompt: &str) -> String {
    let subselect = format!("SELECT '{}' AS prompt", escape_prompt(prompt));
    format!(
        "SELECT ml_generate_text_llm_result AS {GENERATED_COLUMN}
FROM
ML.GENERATE_TEXT(
    MODEL `{model_id}`, ({subselect}),
    STRUCT(
    {TEMPERATURE} AS temperature,
    {MAX_OUTPUT_TOKENS} AS max_output_tokens,
    {TOP_P} AS top_p,
    TRUE AS flatten_json_output,
    {TOP_K} AS top_k
    )
)"
    )
}

/// Extracts the single generated string from the raw SQL Runner output.
pub fn parse_generated_content(raw: &str) -> Result<String, AssistantError> {
    let rows: Value = serde_json::from_str(raw)?;
    let rows = rows
        .as_array()
        .ok_or_else(|| AssistantError::MalformedInference("expected a list of rows".to_string()))?;

    if rows.len() != 1 {
        return Err(AssistantError::MalformedInference(format!(
            "expected exactly one row, got {}",
            rows.len()
        )));
    }

    rows[0]
        .get(GENERATED_COLUMN)
        .and_then(Value::as_str)
        .map(|text| text.trim().to_string())
        .ok_or_else(|| {
            AssistantError::MalformedInference(format!("missing string column `{GENERATED_COLUMN}`"))
        })
}

/// Runs the prompt against the model and returns the trimmed generated text.
pub async fn generate(
    looker: &dyn LookerApi,
    connection: &str,
    model_id: &str,
    prompt: &str,
) -> Result<String, AssistantError> {
    let sql = build_inference_sql(model_id, prompt);
    let raw = looker.run_sql(connection, &sql).await?;
    let generated = parse_generated_content(&raw)?;
    debug!("<-- Generated query string: {generated}");
    Ok(generated)
}

//! # Curated Examples
//!
//! Loads the natural-language to query-string examples stored for an explore
//! and renders them as few-shot guidance lines.

use crate::{
    config::ResolvedConfig, errors::AssistantError, inference::escape_string_literal,
    providers::looker::LookerApi, types::ExamplePair,
};
use serde::Deserialize;
use tracing::{debug, warn};

#[derive(Deserialize)]
struct ExampleRow {
    examples: String,
}

/// The SQL that selects the examples row for the configured explore.
///
/// The explore key is caller-supplied and is escaped into the string literal.
pub fn examples_sql(config: &ResolvedConfig) -> String {
    format!(
        "SELECT explore_id, examples FROM {} WHERE explore_id = '{}'",
        config.examples_table_path(),
        escape_string_literal(&config.explore_key())
    )
}

/// Fetches the example pairs stored for the configured explore key.
pub async fn fetch_examples(
    looker: &dyn LookerApi,
    config: &ResolvedConfig,
) -> Result<Vec<ExamplePair>, AssistantError> {
    let raw = looker
        .run_sql(&config.connection_name, &examples_sql(config))
        .await?;
    let rows: Vec<ExampleRow> = serde_json::from_str(&raw)?;

    let row = rows.first().ok_or_else(|| AssistantError::NoExamples {
        explore_key: config.explore_key(),
        table: config.examples_table_path(),
    })?;
    if rows.len() > 1 {
        warn!(
            "Found {} example rows for {}, using the first",
            rows.len(),
            config.explore_key()
        );
    }

    let examples: Vec<ExamplePair> = serde_json::from_str(&row.examples)?;
    debug!("<-- Loaded {} examples", examples.len());
    Ok(examples)
}

/// Renders each pair as `input: "<input>" ; output: <output>`, one per line.
pub fn render_examples(examples: &[ExamplePair]) -> String {
    examples
        .iter()
        .map(|e| format!("input: \"{}\" ; output: {}", e.input, e.output))
        .collect::<Vec<_>>()
        .join("\n")
}

//! # Explore Metadata
//!
//! Fetches the LookML field definitions of an explore and renders them into the
//! compact, line-per-field text the prompt embeds.

use crate::{
    errors::AssistantError,
    providers::looker::LookerApi,
    types::{ExploreFields, LookmlField},
};
use tracing::debug;

/// The rendered dimension and measure listings of an explore.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SemanticModel {
    pub dimensions: String,
    pub measures: String,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Renders a field as `name: …, type: …, label: …, description: …, tags: …`,
/// leaving out any attribute that is absent or empty.
pub fn render_field(field: &LookmlField) -> String {
    let mut pieces = Vec::new();
    if let Some(name) = present(&field.name) {
        pieces.push(format!("name: {name}"));
    }
    if let Some(field_type) = present(&field.field_type) {
        pieces.push(format!("type: {field_type}"));
    }
    if let Some(label) = present(&field.label) {
        pieces.push(format!("label: {label}"));
    }
    if let Some(description) = present(&field.description) {
        pieces.push(format!("description: {description}"));
    }
    if let Some(tags) = field.tags.as_ref().filter(|t| !t.is_empty()) {
        pieces.push(format!("tags: {}", tags.join(" ,")));
    }
    pieces.join(", ")
}

fn render_fields(fields: &[LookmlField]) -> String {
    fields
        .iter()
        .map(render_field)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders dimensions and measures independently, preserving source order.
pub fn render_semantic_model(fields: &ExploreFields) -> SemanticModel {
    SemanticModel {
        dimensions: render_fields(&fields.dimensions),
        measures: render_fields(&fields.measures),
    }
}

/// Fetches and renders the semantic model of `model:explore`.
pub async fn fetch_semantic_model(
    looker: &dyn LookerApi,
    model: &str,
    explore: &str,
) -> Result<SemanticModel, AssistantError> {
    let fields = looker.explore_fields(model, explore).await?;
    debug!(
        dimensions = fields.dimensions.len(),
        measures = fields.measures.len(),
        "<-- Fetched explore fields"
    );
    Ok(render_semantic_model(&fields))
}

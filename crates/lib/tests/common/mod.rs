#![allow(dead_code)]
//! # Common Test Utilities
//!
//! This module provides shared utilities for testing, such as an in-memory
//! Looker provider, to ensure tests are isolated and repeatable.

use async_trait::async_trait;
use dotenvy::dotenv;
use explore_assistant::{
    types::{ExploreFields, LookmlField, ResultFormat, WriteQuery},
    AssistantConfig, AssistantError, LookerApi,
};
use serde_json::json;
use std::sync::{Arc, Once, RwLock};

static INIT: Once = Once::new();

/// Initializes the tracing subscriber and loads .env for tests.
pub fn setup_tracing() {
    INIT.call_once(|| {
        dotenv().ok();
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .try_init();
    });
}

/// A complete configuration for the `thelook:order_items` explore.
pub fn test_config() -> AssistantConfig {
    AssistantConfig {
        connection_name: Some("looker-private-demo".to_string()),
        dataset: Some("explore_assistant".to_string()),
        examples_table: Some("explore_assistant_examples".to_string()),
        refinements_table: Some("explore_assistant_refinement_examples".to_string()),
        model_id: Some("demo.explore_assistant.explore_assistant_llm".to_string()),
        lookml_model_name: Some("thelook".to_string()),
        looker_explore_id: Some("order_items".to_string()),
    }
}

pub fn field(name: &str, field_type: &str, label: &str) -> LookmlField {
    LookmlField {
        name: Some(name.to_string()),
        field_type: Some(field_type.to_string()),
        label: Some(label.to_string()),
        ..Default::default()
    }
}

/// The fields of the `order_items` explore used across tests.
pub fn order_items_fields() -> ExploreFields {
    ExploreFields {
        dimensions: vec![
            field("order_items.created_date", "date_date", "Order Items Created Date"),
            field("order_items.status", "string", "Order Items Status"),
        ],
        measures: vec![field("order_items.count", "count", "Order Items Count")],
    }
}

/// The SQL Runner output for an examples row.
pub fn examples_rows() -> String {
    let examples = json!([
        {"input": "total orders", "output": "fields=order_items.count"},
        {"input": "orders by status", "output": "fields=order_items.status,order_items.count"}
    ]);
    json!([{ "explore_id": "thelook:order_items", "examples": examples.to_string() }]).to_string()
}

/// The SQL Runner output for a single generated value.
pub fn generated_rows(generated: &str) -> String {
    json!([{ "generated_content": generated }]).to_string()
}

// --- Mock Looker Provider for Logic Testing ---

/// An in-memory `LookerApi` that answers SQL Runner calls in order and records
/// every call it receives.
#[derive(Clone, Debug)]
pub struct MockLooker {
    pub fields: Option<ExploreFields>,
    pub sql_responses: Arc<RwLock<Vec<String>>>,
    pub inline_response: Vec<u8>,
    pub sql_history: Arc<RwLock<Vec<(String, String)>>>,
    pub inline_history: Arc<RwLock<Vec<(WriteQuery, ResultFormat)>>>,
}

impl MockLooker {
    pub fn new(fields: Option<ExploreFields>, sql_responses: Vec<String>, inline: &[u8]) -> Self {
        Self {
            fields,
            sql_responses: Arc::new(RwLock::new(sql_responses.into_iter().rev().collect())),
            inline_response: inline.to_vec(),
            sql_history: Arc::new(RwLock::new(Vec::new())),
            inline_history: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn sql_calls(&self) -> Vec<(String, String)> {
        self.sql_history.read().unwrap().clone()
    }

    pub fn inline_calls(&self) -> Vec<(WriteQuery, ResultFormat)> {
        self.inline_history.read().unwrap().clone()
    }
}

#[async_trait]
impl LookerApi for MockLooker {
    async fn explore_fields(
        &self,
        model: &str,
        explore: &str,
    ) -> Result<ExploreFields, AssistantError> {
        self.fields
            .clone()
            .ok_or_else(|| AssistantError::ExploreNotFound {
                model: model.to_string(),
                explore: explore.to_string(),
            })
    }

    async fn run_sql(&self, connection: &str, sql: &str) -> Result<String, AssistantError> {
        self.sql_history
            .write()
            .unwrap()
            .push((connection.to_string(), sql.to_string()));
        self.sql_responses
            .write()
            .unwrap()
            .pop()
            .ok_or(AssistantError::MissingSqlSlug)
    }

    async fn run_inline_query(
        &self,
        query: &WriteQuery,
        format: ResultFormat,
    ) -> Result<Vec<u8>, AssistantError> {
        self.inline_history
            .write()
            .unwrap()
            .push((query.clone(), format));
        Ok(self.inline_response.clone())
    }
}

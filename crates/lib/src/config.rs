//! # Assistant Configuration
//!
//! The per-request configuration for the explore assistant. The deployment
//! constants (connection, dataset, tables, model) are combined with the model and
//! explore named by the caller. Every value is required; `resolve` turns a
//! complete `AssistantConfig` into a `ResolvedConfig` with non-optional fields.

use crate::errors::AssistantError;
use serde::{Deserialize, Serialize};

/// Builds the key used to scope example lookups for an explore.
pub fn explore_key(model: &str, explore: &str) -> String {
    format!("{model}:{explore}")
}

/// The raw configuration, set field by field before use.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssistantConfig {
    pub connection_name: Option<String>,
    pub dataset: Option<String>,
    pub examples_table: Option<String>,
    pub refinements_table: Option<String>,
    pub model_id: Option<String>,
    pub lookml_model_name: Option<String>,
    pub looker_explore_id: Option<String>,
}

impl AssistantConfig {
    /// Names of the attributes that are still unset.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("connection_name", &self.connection_name),
            ("dataset", &self.dataset),
            ("examples_table", &self.examples_table),
            ("refinements_table", &self.refinements_table),
            ("model_id", &self.model_id),
            ("lookml_model_name", &self.lookml_model_name),
            ("looker_explore_id", &self.looker_explore_id),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| name)
        .collect()
    }

    /// A configuration is usable only when every attribute is set.
    pub fn is_valid(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Validates the configuration and converts it into a `ResolvedConfig`.
    pub fn resolve(&self) -> Result<ResolvedConfig, AssistantError> {
        let (
            Some(connection_name),
            Some(dataset),
            Some(examples_table),
            Some(refinements_table),
            Some(model_id),
            Some(lookml_model_name),
            Some(looker_explore_id),
        ) = (
            &self.connection_name,
            &self.dataset,
            &self.examples_table,
            &self.refinements_table,
            &self.model_id,
            &self.lookml_model_name,
            &self.looker_explore_id,
        )
        else {
            return Err(AssistantError::InvalidConfig(self.missing_fields()));
        };

        Ok(ResolvedConfig {
            connection_name: connection_name.clone(),
            dataset: dataset.clone(),
            examples_table: examples_table.clone(),
            refinements_table: refinements_table.clone(),
            model_id: model_id.clone(),
            lookml_model_name: lookml_model_name.clone(),
            looker_explore_id: looker_explore_id.clone(),
        })
    }
}

/// A fully resolved configuration with non-optional fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub connection_name: String,
    pub dataset: String,
    pub examples_table: String,
    pub refinements_table: String,
    pub model_id: String,
    pub lookml_model_name: String,
    pub looker_explore_id: String,
}

impl ResolvedConfig {
    pub fn explore_key(&self) -> String {
        explore_key(&self.lookml_model_name, &self.looker_explore_id)
    }

    /// The `dataset.table` path of the examples table.
    pub fn examples_table_path(&self) -> String {
        format!("{}.{}", self.dataset, self.examples_table)
    }
}

//! # Explore Assistant
//!
//! This crate translates a natural language question into a Looker explore query
//! and executes it. Every request follows the same sequence:
//!
//! 1. fetch the explore's field metadata from Looker,
//! 2. fetch the curated examples for the explore from the warehouse,
//! 3. build the prompt,
//! 4. run the prompt through a warehouse-hosted model via the SQL Runner,
//! 5. parse the generated query string,
//! 6. execute the resulting inline query in the requested format.

pub mod config;
pub mod errors;
pub mod examples;
pub mod inference;
pub mod metadata;
pub mod prompts;
pub mod providers;
pub mod query_string;
pub mod types;

pub use config::{explore_key, AssistantConfig, ResolvedConfig};
pub use errors::AssistantError;
pub use providers::looker::{LookerApi, LookerClient, LookerSettings};
pub use types::{LookerPayload, LookerReturn, ParsedQuery, ResultFormat, WriteQuery};

use reqwest::Client as ReqwestClient;
use std::fmt;
use tracing::{debug, info};

/// Runs the explore assistant pipeline for a single model and explore.
pub struct ExploreAssistant {
    config: ResolvedConfig,
    looker: Box<dyn LookerApi>,
}

impl fmt::Debug for ExploreAssistant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExploreAssistant")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ExploreAssistant {
    /// Creates an assistant over an existing Looker session.
    ///
    /// Fails with `AssistantError::InvalidConfig` if any configuration value is unset.
    pub fn new(config: &AssistantConfig, looker: Box<dyn LookerApi>) -> Result<Self, AssistantError> {
        Ok(Self {
            config: config.resolve()?,
            looker,
        })
    }

    /// Validates the configuration, then logs in to Looker and creates an assistant.
    ///
    /// No network call is made when the configuration is invalid.
    pub async fn connect(
        config: &AssistantConfig,
        http_client: ReqwestClient,
        settings: &LookerSettings,
    ) -> Result<Self, AssistantError> {
        let resolved = config.resolve()?;
        let looker = LookerClient::login(http_client, settings).await?;
        Ok(Self {
            config: resolved,
            looker: Box::new(looker),
        })
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// Builds the full prompt for a question from the explore metadata and examples.
    pub async fn generate_full_prompt(&self, question: &str) -> Result<String, AssistantError> {
        let semantic_model = metadata::fetch_semantic_model(
            self.looker.as_ref(),
            &self.config.lookml_model_name,
            &self.config.looker_explore_id,
        )
        .await?;
        let examples = examples::fetch_examples(self.looker.as_ref(), &self.config).await?;

        Ok(prompts::build_explore_prompt(
            &semantic_model.dimensions,
            &semantic_model.measures,
            &examples::render_examples(&examples),
            question,
        ))
    }

    /// Asks the model for a query string answering the question.
    pub async fn generate_query_string(&self, question: &str) -> Result<String, AssistantError> {
        let prompt = self.generate_full_prompt(question).await?;
        debug!(prompt = %prompt, "--> Sending prompt to model");
        inference::generate(
            self.looker.as_ref(),
            &self.config.connection_name,
            &self.config.model_id,
            &prompt,
        )
        .await
    }

    /// Executes a parsed query against the explore, with caching disabled.
    pub async fn run_query(
        &self,
        parsed: ParsedQuery,
        format: ResultFormat,
    ) -> Result<(WriteQuery, LookerPayload), AssistantError> {
        let query = WriteQuery::from_parsed(
            &self.config.lookml_model_name,
            &self.config.looker_explore_id,
            parsed,
        );
        let bytes = self.looker.run_inline_query(&query, format).await?;
        let payload = LookerPayload::from_bytes(format, bytes)?;
        Ok((query, payload))
    }

    /// Runs the whole pipeline for a question and returns the result in `format`.
    pub async fn get_looker_return(
        &self,
        question: &str,
        format: ResultFormat,
    ) -> Result<LookerReturn, AssistantError> {
        info!(
            "[get_looker_return] explore {} question: {:?}",
            self.config.explore_key(),
            question
        );
        let generated_query = self.generate_query_string(question).await?;
        let parsed = query_string::parse_query_string(&generated_query);
        let (query, payload) = self.run_query(parsed, format).await?;

        Ok(LookerReturn {
            generated_query,
            query,
            payload,
        })
    }
}

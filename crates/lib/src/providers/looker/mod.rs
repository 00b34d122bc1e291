pub mod client;

use crate::{
    errors::AssistantError,
    types::{ExploreFields, ResultFormat, WriteQuery},
};
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

pub use client::{LookerClient, LookerSettings};

/// A trait for the Looker operations the assistant depends on.
///
/// `LookerClient` talks to the Looker 4.0 REST API; tests substitute
/// in-memory implementations.
#[async_trait]
pub trait LookerApi: Send + Sync + Debug + DynClone {
    /// Fetches the dimension and measure definitions of an explore.
    async fn explore_fields(
        &self,
        model: &str,
        explore: &str,
    ) -> Result<ExploreFields, AssistantError>;

    /// Runs ad-hoc SQL on a connection through the SQL Runner and returns the raw
    /// JSON text of the result rows.
    async fn run_sql(&self, connection: &str, sql: &str) -> Result<String, AssistantError>;

    /// Executes an inline query in the given format, with caching disabled.
    async fn run_inline_query(
        &self,
        query: &WriteQuery,
        format: ResultFormat,
    ) -> Result<Vec<u8>, AssistantError>;
}

dyn_clone::clone_trait_object!(LookerApi);

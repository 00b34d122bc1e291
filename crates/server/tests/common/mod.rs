//! # Common Test Utilities
//!
//! This module centralizes the test harness used across the
//! `explore-assistant-server` integration tests:
//!
//! - `TestApp`: spawns the real router on a random port, configured against an
//!   `httpmock::MockServer` that stands in for the Looker API.
//! - Helpers that mount the Looker endpoints a full explore request touches.

// Allow unused code because this is a test utility module, and not all
// functions might be used by every test file that includes it.
#![allow(unused)]

use anyhow::Result;
use axum::serve;
use explore_assistant::LookerSettings;
use explore_assistant_server::{
    config::{AppConfig, DeploymentConfig, RequestConfig},
    router::create_router,
    state::build_app_state,
};
use httpmock::{Method::GET, Method::POST, Mock, MockServer};
use reqwest::Client;
use serde_json::{json, Value};
use std::net::SocketAddr;
use tokio::{net::TcpListener, task::JoinHandle};

/// A harness for end-to-end testing of the Axum server.
pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub looker: MockServer,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

/// A configuration pointing at the mock Looker instance.
pub fn test_config(looker: &MockServer) -> AppConfig {
    AppConfig {
        port: 0,
        looker: LookerSettings {
            base_url: Some(looker.base_url()),
            client_id: Some("test-client-id".to_string()),
            client_secret: Some("test-client-secret".to_string()),
            ..Default::default()
        },
        explore_assistant: DeploymentConfig {
            connection_name: Some("looker-private-demo".to_string()),
            dataset: Some("explore_assistant".to_string()),
            examples_table: Some("explore_assistant_examples".to_string()),
            refinements_table: Some("explore_assistant_refinement_examples".to_string()),
            model_id: Some("demo.explore_assistant.explore_assistant_llm".to_string()),
        },
        request: RequestConfig::default(),
    }
}

impl TestApp {
    /// Spawns the application server with the default test configuration.
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(|_| {}).await
    }

    /// Spawns the application server after letting the caller adjust the configuration.
    pub async fn spawn_with(customize: impl FnOnce(&mut AppConfig)) -> Result<Self> {
        dotenvy::dotenv().ok();
        // `try_init` is used to prevent panic if the logger is already initialized.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .try_init();

        let looker = MockServer::start_async().await;
        let mut config = test_config(&looker);
        customize(&mut config);
        let app_state = build_app_state(config).await?;

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let address = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let server_handle = tokio::spawn(async move {
            let app = create_router(app_state);
            let server = serve(listener, app).with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            });
            if let Err(e) = server.await {
                eprintln!("Test server error: {e}");
            }
        });

        Ok(Self {
            address,
            client: Client::new(),
            looker,
            _server_handle: server_handle,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    /// Posts a JSON body to the explore endpoint.
    pub async fn post_explore(&self, body: &Value) -> Result<(u16, Value)> {
        let response = self
            .client
            .post(format!("{}/explore", self.address))
            .json(body)
            .send()
            .await?;
        let status = response.status().as_u16();
        Ok((status, response.json().await?))
    }

    /// Mounts a successful Looker login.
    pub fn mount_login(&self) -> Mock<'_> {
        self.looker.mock(|when, then| {
            when.method(POST)
                .path("/api/4.0/login")
                .body_contains("client_id=test-client-id")
                .body_contains("client_secret=test-client-secret");
            then.status(200).json_body(json!({
                "access_token": "test-token",
                "token_type": "Bearer",
                "expires_in": 3600
            }));
        })
    }

    /// Mounts the `thelook:order_items` explore metadata.
    pub fn mount_explore_fields(&self) -> Mock<'_> {
        self.looker.mock(|when, then| {
            when.method(GET)
                .path("/api/4.0/lookml_models/thelook/explores/order_items")
                .query_param("fields", "fields")
                .header("authorization", "Bearer test-token");
            then.status(200).json_body(json!({
                "fields": {
                    "dimensions": [
                        {"name": "order_items.created_date", "type": "date_date", "label": "Order Items Created Date", "description": null, "tags": []},
                        {"name": "order_items.status", "type": "string", "label": "Order Items Status", "description": null, "tags": []}
                    ],
                    "measures": [
                        {"name": "order_items.count", "type": "count", "label": "Order Items Count", "description": null, "tags": []}
                    ]
                }
            }));
        })
    }

    /// Mounts the SQL Runner calls that load the examples, answering with `rows`.
    pub fn mount_examples(&self, rows: Value) -> (Mock<'_>, Mock<'_>) {
        let create = self.looker.mock(|when, then| {
            when.method(POST)
                .path("/api/4.0/sql_queries")
                .body_contains("SELECT explore_id, examples FROM")
                .body_contains("WHERE explore_id = 'thelook:order_items'");
            then.status(200).json_body(json!({"slug": "examples-slug"}));
        });
        let run = self.looker.mock(|when, then| {
            when.method(POST)
                .path("/api/4.0/sql_queries/examples-slug/run/json");
            then.status(200).body(rows.to_string());
        });
        (create, run)
    }

    /// Mounts the SQL Runner calls that run inference, answering with `generated`.
    pub fn mount_inference(&self, generated: &str) -> (Mock<'_>, Mock<'_>) {
        let create = self.looker.mock(|when, then| {
            when.method(POST)
                .path("/api/4.0/sql_queries")
                .body_contains("ML.GENERATE_TEXT");
            then.status(200).json_body(json!({"slug": "inference-slug"}));
        });
        let body = json!([{ "generated_content": generated }]).to_string();
        let run = self.looker.mock(|when, then| {
            when.method(POST)
                .path("/api/4.0/sql_queries/inference-slug/run/json");
            then.status(200).body(body);
        });
        (create, run)
    }
}

/// The examples row stored for `thelook:order_items`.
pub fn order_items_examples() -> Value {
    let examples = json!([
        {"input": "total orders", "output": "fields=order_items.count"},
        {"input": "orders by status", "output": "fields=order_items.status,order_items.count&sorts=order_items.count desc"}
    ]);
    json!([{ "explore_id": "thelook:order_items", "examples": examples.to_string() }])
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

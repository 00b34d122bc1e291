use crate::{
    errors::AssistantError,
    providers::looker::LookerApi,
    types::{ExploreFields, ResultFormat, WriteQuery},
};
use async_trait::async_trait;
use reqwest::{Client as ReqwestClient, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::{fmt, time::Duration};
use tracing::{debug, info};

const API_PREFIX: &str = "api/4.0";

// --- Looker-specific request and response structures ---

#[derive(Deserialize)]
struct LoginResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct ExploreResponse {
    fields: ExploreFields,
}

#[derive(Serialize)]
struct SqlQueryCreate<'a> {
    connection_name: &'a str,
    sql: &'a str,
}

#[derive(Deserialize)]
struct SqlQueryResponse {
    #[serde(default)]
    slug: Option<String>,
}

/// Connection settings for a Looker instance.
#[derive(Clone, Deserialize)]
pub struct LookerSettings {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default = "default_verify_ssl")]
    pub verify_ssl: bool,
    /// Request timeout for every call to Looker. The transport default applies when unset.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_verify_ssl() -> bool {
    true
}

impl Default for LookerSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            client_id: None,
            client_secret: None,
            verify_ssl: default_verify_ssl(),
            timeout_secs: None,
        }
    }
}

impl fmt::Debug for LookerSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LookerSettings")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("verify_ssl", &self.verify_ssl)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

impl LookerSettings {
    /// Builds the HTTP client shared by every Looker session.
    pub fn build_http_client(&self) -> Result<ReqwestClient, AssistantError> {
        let mut builder = ReqwestClient::builder().danger_accept_invalid_certs(!self.verify_ssl);
        if let Some(secs) = self.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        builder.build().map_err(AssistantError::ReqwestClientBuild)
    }
}

// --- Looker client implementation ---

/// An authenticated session against the Looker 4.0 REST API.
#[derive(Clone)]
pub struct LookerClient {
    client: ReqwestClient,
    base_url: String,
    access_token: String,
}

impl fmt::Debug for LookerClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LookerClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl LookerClient {
    /// Logs in with the API client credentials and returns a new session.
    pub async fn login(
        client: ReqwestClient,
        settings: &LookerSettings,
    ) -> Result<Self, AssistantError> {
        let base_url = settings
            .base_url
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or(AssistantError::MissingLookerSetting("base_url"))?
            .trim_end_matches('/')
            .to_string();
        let client_id = settings
            .client_id
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or(AssistantError::MissingLookerSetting("client_id"))?;
        let client_secret = settings
            .client_secret
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or(AssistantError::MissingLookerSetting("client_secret"))?;

        info!("--> Logging in to Looker at {base_url}");
        let response = client
            .post(format!("{base_url}/{API_PREFIX}/login"))
            .form(&[("client_id", client_id), ("client_secret", client_secret)])
            .send()
            .await
            .map_err(AssistantError::LookerRequest)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AssistantError::LookerAuth(format!("{status}: {body}")));
        }

        let login: LoginResponse = response
            .json()
            .await
            .map_err(|e| AssistantError::LookerAuth(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            access_token: login.access_token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{API_PREFIX}/{path}", self.base_url)
    }

    /// Builds an API URL with each of `segments` percent-encoded as one path segment.
    fn segment_url(&self, prefix: &str, segments: &[&str]) -> Result<Url, AssistantError> {
        let mut url = Url::parse(&self.url(prefix))
            .map_err(|e| AssistantError::InvalidLookerUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| AssistantError::InvalidLookerUrl(self.base_url.clone()))?
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, AssistantError> {
        let response = request
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(AssistantError::LookerRequest)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AssistantError::LookerApi { status, body });
        }
        Ok(response)
    }
}

#[async_trait]
impl LookerApi for LookerClient {
    async fn explore_fields(
        &self,
        model: &str,
        explore: &str,
    ) -> Result<ExploreFields, AssistantError> {
        debug!("--> Fetching fields for explore {model}:{explore}");
        let url = self.segment_url("lookml_models", &[model, "explores", explore])?;
        let request = self.client.get(url).query(&[("fields", "fields")]);

        let response = match self.send(request).await {
            Err(AssistantError::LookerApi { status, .. })
                if status == StatusCode::NOT_FOUND.as_u16() =>
            {
                return Err(AssistantError::ExploreNotFound {
                    model: model.to_string(),
                    explore: explore.to_string(),
                })
            }
            other => other?,
        };

        let explore: ExploreResponse = response.json().await.map_err(AssistantError::LookerRequest)?;
        Ok(explore.fields)
    }

    async fn run_sql(&self, connection: &str, sql: &str) -> Result<String, AssistantError> {
        debug!("--> Creating SQL Runner query on connection {connection}: {sql}");
        let request = self
            .client
            .post(self.url("sql_queries"))
            .json(&SqlQueryCreate {
                connection_name: connection,
                sql,
            });
        let created: SqlQueryResponse = self
            .send(request)
            .await?
            .json()
            .await
            .map_err(AssistantError::LookerRequest)?;

        let slug = created
            .slug
            .filter(|s| !s.is_empty())
            .ok_or(AssistantError::MissingSqlSlug)?;

        let url = self.segment_url("sql_queries", &[slug.as_str(), "run", "json"])?;
        let request = self.client.post(url);
        self.send(request)
            .await?
            .text()
            .await
            .map_err(AssistantError::LookerRequest)
    }

    async fn run_inline_query(
        &self,
        query: &WriteQuery,
        format: ResultFormat,
    ) -> Result<Vec<u8>, AssistantError> {
        info!("--> Running inline query in format '{format}': {query:?}");
        let request = self
            .client
            .post(self.url(&format!("queries/run/{}", format.as_str())))
            .query(&[("cache", "false")])
            .json(query);
        let bytes = self
            .send(request)
            .await?
            .bytes()
            .await
            .map_err(AssistantError::LookerRequest)?;
        Ok(bytes.to_vec())
    }
}

use crate::errors::AssistantError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The timezone every generated query is executed in.
pub const QUERY_TIMEZONE: &str = "UTC";

// --- Looker metadata structures ---

/// A single dimension or measure from a LookML explore.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LookmlField {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub field_type: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// The dimensions and measures of an explore, in the order Looker returns them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExploreFields {
    #[serde(default)]
    pub dimensions: Vec<LookmlField>,
    #[serde(default)]
    pub measures: Vec<LookmlField>,
}

/// One curated natural-language to query-string mapping.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExamplePair {
    pub input: String,
    pub output: String,
}

// --- Query structures ---

/// The fields, pivots, filters and sorts extracted from a generated query string.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ParsedQuery {
    pub fields: Vec<String>,
    pub pivots: Vec<String>,
    pub filters: BTreeMap<String, String>,
    pub sorts: Vec<String>,
}

/// The body of a Looker inline query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WriteQuery {
    pub model: String,
    pub view: String,
    pub fields: Vec<String>,
    pub pivots: Vec<String>,
    pub filters: BTreeMap<String, String>,
    pub sorts: Vec<String>,
    pub query_timezone: String,
}

impl WriteQuery {
    /// Builds the inline query for an explore. The timezone is always UTC.
    pub fn from_parsed(model: &str, explore: &str, parsed: ParsedQuery) -> Self {
        Self {
            model: model.to_string(),
            view: explore.to_string(),
            fields: parsed.fields,
            pivots: parsed.pivots,
            filters: parsed.filters,
            sorts: parsed.sorts,
            query_timezone: QUERY_TIMEZONE.to_string(),
        }
    }
}

// --- Result formats ---

/// The output formats a caller may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultFormat {
    #[serde(rename = "sql")]
    Sql,
    #[serde(rename = "json")]
    Json,
    #[serde(rename = "png")]
    Png,
    #[serde(rename = "csv")]
    Csv,
    #[serde(rename = "json-bi")]
    JsonBi,
}

impl ResultFormat {
    pub const ALL: [ResultFormat; 5] = [
        ResultFormat::Sql,
        ResultFormat::Json,
        ResultFormat::Png,
        ResultFormat::Csv,
        ResultFormat::JsonBi,
    ];

    /// The name Looker uses for this format in `queries/run/{result_format}`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultFormat::Sql => "sql",
            ResultFormat::Json => "json",
            ResultFormat::Png => "png",
            ResultFormat::Csv => "csv",
            ResultFormat::JsonBi => "json-bi",
        }
    }

    /// Renders the allowed set as `[sql, json, png, csv, json-bi]`.
    pub fn allowed_list() -> String {
        let names: Vec<&str> = Self::ALL.iter().map(|f| f.as_str()).collect();
        format!("[{}]", names.join(", "))
    }
}

impl fmt::Display for ResultFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResultFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == s)
            .ok_or_else(|| format!("unsupported result format '{s}'"))
    }
}

// --- Results ---

/// The payload Looker returned for an inline query, keyed by content type.
#[derive(Debug, Clone, PartialEq)]
pub enum LookerPayload {
    /// Deserialized JSON, for `json` and `json-bi`.
    Rows(serde_json::Value),
    /// Raw text, for `sql` and `csv`.
    Text(String),
    /// Raw bytes, for `png`.
    Binary(Vec<u8>),
}

impl LookerPayload {
    /// Interprets raw inline-query bytes according to the requested format.
    pub fn from_bytes(format: ResultFormat, bytes: Vec<u8>) -> Result<Self, AssistantError> {
        if format.as_str().starts_with("json") {
            return Ok(LookerPayload::Rows(serde_json::from_slice(&bytes)?));
        }
        match format {
            ResultFormat::Png => Ok(LookerPayload::Binary(bytes)),
            _ => Ok(LookerPayload::Text(
                String::from_utf8_lossy(&bytes).into_owned(),
            )),
        }
    }
}

/// The outcome of a full assistant run.
#[derive(Debug, Clone)]
pub struct LookerReturn {
    /// The trimmed query string produced by the model.
    pub generated_query: String,
    pub query: WriteQuery,
    pub payload: LookerPayload,
}

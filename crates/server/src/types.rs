use base64::{engine::general_purpose::STANDARD, Engine as _};
use explore_assistant::LookerPayload;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The `data` field of a response: deserialized JSON or raw text.
///
/// PNG bytes are carried as base64 text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReturnPayload {
    Text(String),
    Rows(Value),
}

impl Default for ReturnPayload {
    fn default() -> Self {
        ReturnPayload::Text(String::new())
    }
}

impl From<LookerPayload> for ReturnPayload {
    fn from(payload: LookerPayload) -> Self {
        match payload {
            LookerPayload::Rows(rows) => ReturnPayload::Rows(rows),
            LookerPayload::Text(text) => ReturnPayload::Text(text),
            LookerPayload::Binary(bytes) => ReturnPayload::Text(STANDARD.encode(bytes)),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReturnData {
    pub content_type: String,
    pub data: ReturnPayload,
}

/// The uniform response envelope, returned for successes and failures alike.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReturnObject {
    /// Empty when the request succeeded.
    pub error_message: String,
    pub return_data: ReturnData,
    /// An echo of the request body.
    pub request_object: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_seconds: Option<f64>,
}

//! Provider error envelope for OpenAI-compatible endpoints.

use serde::{Deserialize, Serialize};

/// Standard envelope: `{ "error": { "message": "...", "type": "...", "code": "..." } }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatErrorBody {
    #[serde(rename = "error")]
    pub inner: ChatErrorObject,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatErrorObject {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ChatErrorBody {
    /// Best-effort extraction of the provider message from a raw error body.
    pub fn message_from_slice(body: &[u8]) -> Option<String> {
        serde_json::from_slice::<ChatErrorBody>(body)
            .ok()
            .map(|envelope| envelope.inner.message)
    }
}

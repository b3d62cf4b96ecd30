use serde::{Deserialize, Serialize};
use url::Url;

/// A named, user-editable record describing one LLM provider endpoint.
///
/// `name` is the display name and the primary key for lookup, update and
/// delete; `model_name` is the identifier sent in API request bodies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfig {
    pub name: String,
    pub api_endpoint: Url,
    pub api_key: String,
    pub model_name: String,
    pub enabled: bool,
}

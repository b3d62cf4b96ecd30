//! Persisted project entities.
//!
//! Serialized with camelCase field names so collections written by the
//! desktop UI load unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named container for one prompt and its version history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub prompt: String,
    pub versions: Vec<ProjectVersion>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            prompt: String::new(),
            versions: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Appends a snapshot to the version history and bumps `updated_at`.
    /// Versions are append-only; insertion order is chronological order.
    pub fn push_version(&mut self, version: ProjectVersion) {
        self.versions.push(version);
        self.updated_at = Utc::now();
    }
}

/// An immutable snapshot of a prompt plus the responses generated from it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectVersion {
    pub id: String,
    pub prompt: String,
    pub responses: Vec<ModelResponse>,
    pub created_at: DateTime<Utc>,
}

impl ProjectVersion {
    pub fn new(prompt: impl Into<String>, responses: Vec<ModelResponse>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            prompt: prompt.into(),
            responses,
            created_at: Utc::now(),
        }
    }
}

/// One model's answer to a version's prompt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModelResponse {
    /// Display name of the model configuration that produced this answer.
    pub model_name: String,
    pub content: String,
    pub token_usage: TokenUsage,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    /// As reported by the provider; not necessarily `prompt + completion`.
    pub total_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_collections_written_by_the_ui() {
        let raw = r#"{
            "id": "1736951234567",
            "name": "greetings",
            "prompt": "say hi",
            "versions": [{
                "id": "1736951240001",
                "prompt": "say hi",
                "responses": [{
                    "modelName": "gpt-4o-mini",
                    "content": "hi",
                    "tokenUsage": {"promptTokens": 3, "completionTokens": 1, "totalTokens": 4},
                    "createdAt": "2025-01-15T14:27:20Z"
                }],
                "createdAt": "2025-01-15T14:27:20Z"
            }],
            "createdAt": "2025-01-15T14:27:14Z",
            "updatedAt": "2025-01-15T14:27:20Z"
        }"#;

        let project: Project = serde_json::from_str(raw).expect("legacy project should parse");
        assert_eq!(project.id, "1736951234567");
        assert_eq!(project.versions.len(), 1);
        assert_eq!(project.versions[0].responses[0].token_usage.total_tokens, 4);

        // Field names survive a rewrite in the same casing.
        let back = serde_json::to_value(&project).expect("serialize");
        assert!(back["versions"][0]["responses"][0]["tokenUsage"]["promptTokens"].is_u64());
    }

    #[test]
    fn push_version_appends_and_touches_updated_at() {
        let mut project = Project::new("demo");
        let before = project.updated_at;
        project.push_version(ProjectVersion::new("v1", Vec::new()));
        project.push_version(ProjectVersion::new("v2", Vec::new()));
        assert_eq!(project.versions.len(), 2);
        assert_eq!(project.versions[0].prompt, "v1");
        assert_eq!(project.versions[1].prompt, "v2");
        assert!(project.updated_at >= before);
    }
}

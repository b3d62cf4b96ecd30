use crate::config::RelayConfig;
use crate::error::ApiError;
use chrono::Utc;
use promptdock_schema::{
    ChatCompletionRequest, ChatCompletionResponse, ChatErrorBody, ModelConfig, ModelResponse,
    TokenUsage,
};
use std::net::SocketAddr;
use tracing::{debug, warn};

/// Probe prompt used by `validate_key`.
const VALIDATION_PROMPT: &str = "Hello";

const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Chat completion client for the UI process.
///
/// Every call is addressed to the local relay; the provider endpoint rides
/// in the target header and the relay re-issues the request there. No
/// failure is retried; the caller decides what a failure means.
pub struct ChatClient {
    client: reqwest::Client,
    relay_url: String,
    target_url_header: String,
}

impl ChatClient {
    /// `relay_addr` is the address the bound relay reported at startup.
    pub fn new(relay_addr: SocketAddr, relay_cfg: &RelayConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            relay_url: format!("http://{relay_addr}"),
            target_url_header: relay_cfg.target_url_header.clone(),
        }
    }

    /// Sends `prompt` to the model behind `model` and normalizes the reply
    /// into a [`ModelResponse`].
    pub async fn send_request(
        &self,
        prompt: &str,
        model: &ModelConfig,
    ) -> Result<ModelResponse, ApiError> {
        let body =
            ChatCompletionRequest::user_prompt(model.model_name.clone(), prompt, DEFAULT_TEMPERATURE);

        let resp = self
            .client
            .post(&self.relay_url)
            .bearer_auth(&model.api_key)
            .header(self.target_url_header.as_str(), model.api_endpoint.as_str())
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let bytes = resp.bytes().await.unwrap_or_default();
            let message = ChatErrorBody::message_from_slice(&bytes)
                .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()));
            warn!(model = %model.name, %status, %message, "Chat completion request failed");
            return Err(ApiError::UpstreamStatus { status, message });
        }

        let bytes = resp.bytes().await?;
        let payload: ChatCompletionResponse = serde_json::from_slice(&bytes)
            .map_err(|err| ApiError::MalformedResponse(format!("invalid JSON payload: {err}")))?;

        let Some(content) = payload.content() else {
            warn!(model = %model.name, "Chat completion response carried no content");
            return Err(ApiError::MalformedResponse(
                "missing choices[0].message.content".to_string(),
            ));
        };

        let usage = payload.usage.unwrap_or_default();

        Ok(ModelResponse {
            // Display name of the configuration, not the wire model id.
            model_name: model.name.clone(),
            content: content.to_string(),
            token_usage: TokenUsage {
                prompt_tokens: usage.prompt_tokens.unwrap_or(0),
                completion_tokens: usage.completion_tokens.unwrap_or(0),
                total_tokens: usage.total_tokens.unwrap_or(0),
            },
            created_at: Utc::now(),
        })
    }

    /// Credential/reachability probe: true when a minimal request
    /// round-trips successfully through the relay.
    pub async fn validate_key(&self, model: &ModelConfig) -> bool {
        match self.send_request(VALIDATION_PROMPT, model).await {
            Ok(_) => true,
            Err(error) => {
                debug!(model = %model.name, %error, "API key validation failed");
                false
            }
        }
    }
}

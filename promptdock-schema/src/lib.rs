pub mod model_config;
pub mod openai;
pub mod project;

pub use model_config::ModelConfig;
pub use openai::{
    ChatChoice, ChatChoiceMessage, ChatCompletionRequest, ChatCompletionResponse, ChatErrorBody,
    ChatErrorObject, ChatMessage, ChatUsage,
};
pub use project::{ModelResponse, Project, ProjectVersion, TokenUsage};

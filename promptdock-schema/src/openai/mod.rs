mod chat_error;
mod chat_request;
mod chat_response;

pub use chat_error::{ChatErrorBody, ChatErrorObject};
pub use chat_request::{ChatCompletionRequest, ChatMessage};
pub use chat_response::{ChatChoice, ChatChoiceMessage, ChatCompletionResponse, ChatUsage};

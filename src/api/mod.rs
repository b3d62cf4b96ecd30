mod chat_client;

pub use chat_client::ChatClient;

use thiserror::Error as ThisError;

/// Persistence layer failures.
#[derive(Debug, ThisError)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Store actor error: {0}")]
    Actor(String),
}

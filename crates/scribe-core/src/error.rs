//! Domain-level error types.

use thiserror::Error;

/// The write or read that addressed a missing post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostAction {
    Read,
    Update,
    Delete,
}

/// Domain errors - business logic failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),

    #[error("{}", not_found_message(.action, .id))]
    NotFound { action: PostAction, id: String },

    #[error("Storage failure: {0}")]
    Storage(#[from] RepoError),

    #[error("Internal error: {0}")]
    Internal(String),
}

fn not_found_message(action: &PostAction, id: &str) -> String {
    match action {
        PostAction::Read => format!("Blog post with id={id} not found"),
        PostAction::Update => format!("Could not update blog post with id={id}. Post not found"),
        PostAction::Delete => format!("Could not delete blog post with id={id}. Post not found"),
    }
}

impl DomainError {
    pub fn not_found(action: PostAction, id: impl Into<String>) -> Self {
        DomainError::NotFound {
            action,
            id: id.into(),
        }
    }
}

/// Store-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Store is corrupt: {0}")]
    Corrupt(String),
}

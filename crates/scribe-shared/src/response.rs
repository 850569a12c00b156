//! Error body returned by every failing endpoint.

use serde::{Deserialize, Serialize};

/// JSON error body: `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// A human-readable explanation of the failure.
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    pub fn internal_error() -> Self {
        Self::new("Internal server error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_error_field_only() {
        let body = serde_json::to_value(ErrorResponse::new("Title and content are required."))
            .unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "error": "Title and content are required." })
        );
    }
}

//! Data Transfer Objects - response types for the API.

use serde::{Deserialize, Serialize};

/// Response of the health check endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

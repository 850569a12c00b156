use chrono::{DateTime, Utc};

/// Source of the current time for stamping posts.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Source of fresh post identifiers.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DomainError;

/// Keys owned by [`Post`] itself. Client-supplied extra fields never shadow these.
pub const RESERVED_FIELDS: [&str; 5] = ["id", "title", "content", "createdAt", "updatedAt"];

pub(crate) const REQUIRED_FIELDS_MESSAGE: &str = "Title and content are required.";
pub(crate) const EMPTY_FIELDS_MESSAGE: &str = "Title and content must not be empty.";

/// Post entity - a blog post as stored and returned by the API.
///
/// Any fields the client sent beyond `title` and `content` are kept in
/// `extra` and serialized back at the top level of the object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of a create request, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPost {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A create request that passed validation.
#[derive(Debug, Clone)]
pub struct PostDraft {
    title: String,
    content: String,
    extra: Map<String, Value>,
}

/// Body of an update request. Only `title`, `content` and extra fields are
/// writable; `id` and the timestamps are dropped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewPost {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            content: Some(content.into()),
            extra: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Check that both `title` and `content` are present and non-empty.
    pub fn validate(self) -> Result<PostDraft, DomainError> {
        match (non_empty(self.title), non_empty(self.content)) {
            (Some(title), Some(content)) => Ok(PostDraft {
                title,
                content,
                extra: strip_reserved(self.extra),
            }),
            _ => Err(DomainError::Validation(REQUIRED_FIELDS_MESSAGE.to_string())),
        }
    }
}

impl PostPatch {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

impl Post {
    /// Build a freshly created post. `updated_at` starts out empty.
    pub fn from_draft(id: String, draft: PostDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            content: draft.content,
            created_at: now,
            updated_at: None,
            extra: draft.extra,
        }
    }

    /// Merge `patch` over this post and stamp `updated_at`.
    ///
    /// The stamp is always strictly later than both `created_at` and any
    /// previous `updated_at`, even if the clock has not advanced. On error the
    /// post is left untouched.
    pub fn apply(&mut self, patch: PostPatch, now: DateTime<Utc>) -> Result<(), DomainError> {
        let empty = |field: &Option<String>| field.as_deref().is_some_and(str::is_empty);
        if empty(&patch.title) || empty(&patch.content) {
            return Err(DomainError::Validation(EMPTY_FIELDS_MESSAGE.to_string()));
        }

        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        self.extra.extend(strip_reserved(patch.extra));

        let floor = self.updated_at.unwrap_or(self.created_at);
        self.updated_at = Some(if now > floor {
            now
        } else {
            floor + Duration::microseconds(1)
        });

        Ok(())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn strip_reserved(mut extra: Map<String, Value>) -> Map<String, Value> {
    extra.retain(|key, _| !RESERVED_FIELDS.contains(&key.as_str()));
    extra
}

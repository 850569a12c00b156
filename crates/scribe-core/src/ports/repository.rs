use async_trait::async_trait;

use crate::domain::Post;
use crate::error::RepoError;

/// Ordered key-value store of posts, keyed by post id.
///
/// Implementations must return [`PostStore::values`] in ascending key order.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Insert or replace the post under `post.id`, returning the previous value.
    async fn insert(&self, post: Post) -> Result<Option<Post>, RepoError>;

    /// Look up a post by id.
    async fn get(&self, id: &str) -> Result<Option<Post>, RepoError>;

    /// Remove a post by id, returning it if it was present.
    async fn remove(&self, id: &str) -> Result<Option<Post>, RepoError>;

    /// All stored posts in key order.
    async fn values(&self) -> Result<Vec<Post>, RepoError>;

    async fn contains(&self, id: &str) -> Result<bool, RepoError> {
        Ok(self.get(id).await?.is_some())
    }
}

//! In-memory post store - used when no durable backend is configured.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use scribe_core::domain::Post;
use scribe_core::error::RepoError;
use scribe_core::ports::PostStore;

/// In-memory post store using a `BTreeMap` behind an async RwLock.
///
/// Note: Data is lost on process restart.
#[derive(Default)]
pub struct InMemoryPostStore {
    posts: RwLock<BTreeMap<String, Post>>,
}

impl InMemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    async fn insert(&self, post: Post) -> Result<Option<Post>, RepoError> {
        let mut posts = self.posts.write().await;
        Ok(posts.insert(post.id.clone(), post))
    }

    async fn get(&self, id: &str) -> Result<Option<Post>, RepoError> {
        let posts = self.posts.read().await;
        Ok(posts.get(id).cloned())
    }

    async fn remove(&self, id: &str) -> Result<Option<Post>, RepoError> {
        let mut posts = self.posts.write().await;
        Ok(posts.remove(id))
    }

    async fn values(&self) -> Result<Vec<Post>, RepoError> {
        let posts = self.posts.read().await;
        Ok(posts.values().cloned().collect())
    }
}

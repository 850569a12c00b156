//! The post store API: create, list, get, update and delete.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{NewPost, Post, PostPatch};
use crate::error::{DomainError, PostAction};
use crate::ports::{Clock, IdGenerator, PostStore};

/// How many ids to draw before giving up on finding an unused one.
const MAX_ID_ATTEMPTS: usize = 8;

/// CRUD over the single post collection.
///
/// Writes (create, update, delete) run one at a time behind `writer`, so each
/// read-modify-write sequence completes before the next one starts even when
/// requests arrive concurrently. Reads go straight to the store.
pub struct PostService {
    store: Arc<dyn PostStore>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    writer: Mutex<()>,
}

impl PostService {
    pub fn new(
        store: Arc<dyn PostStore>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            store,
            clock,
            ids,
            writer: Mutex::new(()),
        }
    }

    /// Validate and store a new post with a fresh id and creation time.
    pub async fn create(&self, input: NewPost) -> Result<Post, DomainError> {
        let draft = input.validate()?;

        let _guard = self.writer.lock().await;
        let id = self.fresh_id().await?;
        let post = Post::from_draft(id, draft, self.clock.now());
        self.store.insert(post.clone()).await?;

        tracing::info!(post_id = %post.id, "Post created");
        Ok(post)
    }

    /// All posts in store order.
    pub async fn list(&self) -> Result<Vec<Post>, DomainError> {
        Ok(self.store.values().await?)
    }

    pub async fn get(&self, id: &str) -> Result<Post, DomainError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(PostAction::Read, id))
    }

    /// Merge `patch` into an existing post and stamp `updatedAt`.
    pub async fn update(&self, id: &str, patch: PostPatch) -> Result<Post, DomainError> {
        let _guard = self.writer.lock().await;

        let mut post = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(PostAction::Update, id))?;

        post.apply(patch, self.clock.now())?;
        self.store.insert(post.clone()).await?;

        tracing::info!(post_id = %post.id, "Post updated");
        Ok(post)
    }

    /// Remove a post, returning what was stored.
    pub async fn delete(&self, id: &str) -> Result<Post, DomainError> {
        let _guard = self.writer.lock().await;

        let post = self
            .store
            .remove(id)
            .await?
            .ok_or_else(|| DomainError::not_found(PostAction::Delete, id))?;

        tracing::info!(post_id = %post.id, "Post deleted");
        Ok(post)
    }

    async fn fresh_id(&self) -> Result<String, DomainError> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = self.ids.generate();
            if !id.is_empty() && !self.store.contains(&id).await? {
                return Ok(id);
            }
            tracing::warn!(post_id = %id, "Generated post id is unusable, drawing again");
        }

        Err(DomainError::Internal(format!(
            "no unused post id after {MAX_ID_ATTEMPTS} attempts"
        )))
    }
}

//! PostgreSQL post store.

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, OnConflict, Order};
use sea_orm::{DbConn, DbErr, EntityTrait, QueryOrder, Select, TransactionTrait};

use scribe_core::domain::Post;
use scribe_core::error::RepoError;
use scribe_core::ports::PostStore;

use super::entity::post::{self, Entity as PostEntity};

/// Post store over the `posts` table, ordered by primary key.
pub struct PostgresPostStore {
    pub(crate) db: DbConn,
}

impl PostgresPostStore {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

/// All rows in byte order of `id`, matching the in-memory and file stores
/// whatever the database collation.
pub(crate) fn ordered_posts() -> Select<PostEntity> {
    PostEntity::find().order_by(Expr::cust(r#""posts"."id" COLLATE "C""#), Order::Asc)
}

fn query_error(err: DbErr) -> RepoError {
    match err {
        DbErr::Conn(e) => RepoError::Connection(e.to_string()),
        other => RepoError::Query(other.to_string()),
    }
}

#[async_trait]
impl PostStore for PostgresPostStore {
    async fn insert(&self, record: Post) -> Result<Option<Post>, RepoError> {
        tracing::debug!(post_id = %record.id, "Upserting post");

        let txn = self.db.begin().await.map_err(query_error)?;

        let previous = PostEntity::find_by_id(record.id.clone())
            .one(&txn)
            .await
            .map_err(query_error)?;

        let model: post::ActiveModel = record.into();
        PostEntity::insert(model)
            .on_conflict(
                OnConflict::column(post::Column::Id)
                    .update_columns([
                        post::Column::Title,
                        post::Column::Content,
                        post::Column::Extra,
                        post::Column::CreatedAt,
                        post::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await
            .map_err(query_error)?;

        txn.commit().await.map_err(query_error)?;
        Ok(previous.map(Into::into))
    }

    async fn get(&self, id: &str) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::find_by_id(id.to_owned())
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }

    async fn remove(&self, id: &str) -> Result<Option<Post>, RepoError> {
        let txn = self.db.begin().await.map_err(query_error)?;

        let existing = PostEntity::find_by_id(id.to_owned())
            .one(&txn)
            .await
            .map_err(query_error)?;

        if existing.is_some() {
            PostEntity::delete_by_id(id.to_owned())
                .exec(&txn)
                .await
                .map_err(query_error)?;
        }

        txn.commit().await.map_err(query_error)?;
        Ok(existing.map(Into::into))
    }

    async fn values(&self) -> Result<Vec<Post>, RepoError> {
        let result = ordered_posts()
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

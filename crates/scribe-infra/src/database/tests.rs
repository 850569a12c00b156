#[cfg(test)]
mod tests {
    use crate::database::entity::post;
    use crate::database::postgres_repo::{PostgresPostStore, ordered_posts};
    use chrono::{SubsecRound, Utc};
    use scribe_core::domain::Post;
    use scribe_core::ports::PostStore;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, QueryTrait};
    use serde_json::json;

    fn model(id: &str, title: &str) -> post::Model {
        let now = Utc::now().trunc_subsecs(6);
        post::Model {
            id: id.to_owned(),
            title: title.to_owned(),
            content: "Content".to_owned(),
            extra: json!({ "tags": ["rust"] }),
            created_at: now.into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_get_post_by_id() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model("p1", "Test Post")]])
            .into_connection();

        let store = PostgresPostStore::new(db);

        let result: Option<Post> = store.get("p1").await.unwrap();

        let post = result.unwrap();
        assert_eq!(post.title, "Test Post");
        assert_eq!(post.id, "p1");
        assert!(post.updated_at.is_none());
        assert_eq!(post.extra.get("tags"), Some(&json!(["rust"])));
    }

    #[tokio::test]
    async fn test_values_maps_all_rows() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model("a", "First"), model("b", "Second")]])
            .into_connection();

        let store = PostgresPostStore::new(db);
        let posts = store.values().await.unwrap();

        let titles: Vec<&str> = posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["First", "Second"]);
    }

    #[test]
    fn test_values_order_by_id_bytes() {
        let sql = ordered_posts().build(DatabaseBackend::Postgres).sql;
        assert!(sql.contains(r#"ORDER BY "posts"."id" COLLATE "C" ASC"#));
    }

    #[tokio::test]
    async fn test_insert_returns_previous_row() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model("p1", "Old")]])
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let store = PostgresPostStore::new(db);
        let mut post: Post = model("p1", "New").into();
        post.updated_at = Some(Utc::now().trunc_subsecs(6));

        let previous = store.insert(post).await.unwrap();
        assert_eq!(previous.unwrap().title, "Old");
    }

    #[tokio::test]
    async fn test_remove_missing_returns_none() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<post::Model>::new()])
            .into_connection();

        let store = PostgresPostStore::new(db);
        assert!(store.remove("ghost").await.unwrap().is_none());
    }
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use crate::{
    db::{error::DbResult, repos::RevisionRepo},
    models::RevisionCandidate,
};

pub struct SqliteRevisionRepo {
    pool: SqlitePool,
}

impl SqliteRevisionRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Build a `?, ?, ...` placeholder list for an IN clause.
    fn placeholders(count: usize) -> String {
        vec!["?"; count].join(", ")
    }
}

#[async_trait]
impl RevisionRepo for SqliteRevisionRepo {
    async fn find_candidates(
        &self,
        post_types: &[String],
        cutoff: DateTime<Utc>,
        limit: Option<u32>,
    ) -> DbResult<Vec<RevisionCandidate>> {
        if post_types.is_empty() {
            return Ok(Vec::new());
        }

        let mut sql = format!(
            r#"
            SELECT r.id AS revision_id, r.post_id, p.post_type, r.created_at
            FROM post_revisions r
            JOIN posts p ON p.id = r.post_id
            WHERE p.post_type IN ({})
              AND p.published_at < ?
              AND r.created_at < ?
            ORDER BY p.published_at ASC, r.created_at ASC
            "#,
            Self::placeholders(post_types.len())
        );
        if limit.is_some() {
            sql.push_str(" LIMIT ?");
        }

        let mut query = sqlx::query(&sql);
        for post_type in post_types {
            query = query.bind(post_type);
        }
        query = query.bind(cutoff).bind(cutoff);
        if let Some(limit) = limit {
            query = query.bind(limit as i64);
        }

        let rows = query.fetch_all(&self.pool).await?;

        Ok(rows
            .into_iter()
            .map(|row| RevisionCandidate {
                revision_id: row.get("revision_id"),
                post_id: row.get("post_id"),
                post_type: row.get("post_type"),
                created_at: row.get("created_at"),
            })
            .collect())
    }

    async fn count_eligible(&self, post_types: &[String], cutoff: DateTime<Utc>) -> DbResult<i64> {
        if post_types.is_empty() {
            return Ok(0);
        }

        let sql = format!(
            r#"
            SELECT COUNT(r.id) AS count
            FROM post_revisions r
            JOIN posts p ON p.id = r.post_id
            WHERE p.post_type IN ({})
              AND p.published_at < ?
              AND r.created_at < ?
            "#,
            Self::placeholders(post_types.len())
        );

        let mut query = sqlx::query(&sql);
        for post_type in post_types {
            query = query.bind(post_type);
        }
        let row = query.bind(cutoff).bind(cutoff).fetch_one(&self.pool).await?;

        Ok(row.get::<i64, _>("count"))
    }

    async fn delete(&self, revision_id: i64) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM post_revisions WHERE id = ?")
            .bind(revision_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    async fn create_test_pool() -> SqlitePool {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory SQLite pool");

        sqlx::query(
            r#"
            CREATE TABLE posts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                post_type TEXT NOT NULL DEFAULT 'post',
                title TEXT NOT NULL DEFAULT '',
                published_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .expect("Failed to create posts table");

        sqlx::query(
            r#"
            CREATE TABLE post_revisions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                post_id INTEGER NOT NULL REFERENCES posts (id) ON DELETE CASCADE,
                created_at TEXT NOT NULL,
                content TEXT NOT NULL DEFAULT ''
            )
            "#,
        )
        .execute(&pool)
        .await
        .expect("Failed to create post_revisions table");

        pool
    }

    fn days_ago(days: i64) -> DateTime<Utc> {
        Utc::now() - Duration::days(days)
    }

    async fn insert_post(pool: &SqlitePool, post_type: &str, published_at: DateTime<Utc>) -> i64 {
        sqlx::query("INSERT INTO posts (post_type, published_at) VALUES (?, ?)")
            .bind(post_type)
            .bind(published_at)
            .execute(pool)
            .await
            .expect("Failed to insert post")
            .last_insert_rowid()
    }

    async fn insert_revision(pool: &SqlitePool, post_id: i64, created_at: DateTime<Utc>) -> i64 {
        sqlx::query("INSERT INTO post_revisions (post_id, created_at) VALUES (?, ?)")
            .bind(post_id)
            .bind(created_at)
            .execute(pool)
            .await
            .expect("Failed to insert revision")
            .last_insert_rowid()
    }

    fn types(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_find_candidates_filters_by_post_type() {
        let pool = create_test_pool().await;
        let repo = SqliteRevisionRepo::new(pool.clone());

        let post = insert_post(&pool, "post", days_ago(90)).await;
        let page = insert_post(&pool, "page", days_ago(90)).await;
        let post_rev = insert_revision(&pool, post, days_ago(60)).await;
        insert_revision(&pool, page, days_ago(60)).await;

        let candidates = repo
            .find_candidates(&types(&["post"]), days_ago(30), None)
            .await
            .expect("Failed to find candidates");

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].revision_id, post_rev);
        assert_eq!(candidates[0].post_id, post);
        assert_eq!(candidates[0].post_type, "post");
    }

    #[tokio::test]
    async fn test_find_candidates_multiple_post_types() {
        let pool = create_test_pool().await;
        let repo = SqliteRevisionRepo::new(pool.clone());

        let post = insert_post(&pool, "post", days_ago(90)).await;
        let page = insert_post(&pool, "page", days_ago(90)).await;
        let article = insert_post(&pool, "article", days_ago(90)).await;
        insert_revision(&pool, post, days_ago(60)).await;
        insert_revision(&pool, page, days_ago(60)).await;
        insert_revision(&pool, article, days_ago(60)).await;

        let candidates = repo
            .find_candidates(&types(&["post", "page"]), days_ago(30), None)
            .await
            .expect("Failed to find candidates");

        assert_eq!(candidates.len(), 2);
        assert!(candidates.iter().all(|c| c.post_type != "article"));
    }

    #[tokio::test]
    async fn test_find_candidates_excludes_recent_posts() {
        let pool = create_test_pool().await;
        let repo = SqliteRevisionRepo::new(pool.clone());

        let recent_post = insert_post(&pool, "post", days_ago(10)).await;
        insert_revision(&pool, recent_post, days_ago(60)).await;

        let candidates = repo
            .find_candidates(&types(&["post"]), days_ago(30), None)
            .await
            .expect("Failed to find candidates");

        assert!(candidates.is_empty());
    }

    #[tokio::test]
    async fn test_find_candidates_excludes_recent_revisions() {
        let pool = create_test_pool().await;
        let repo = SqliteRevisionRepo::new(pool.clone());

        let post = insert_post(&pool, "post", days_ago(90)).await;
        let old_rev = insert_revision(&pool, post, days_ago(60)).await;
        insert_revision(&pool, post, days_ago(5)).await;

        let candidates = repo
            .find_candidates(&types(&["post"]), days_ago(30), None)
            .await
            .expect("Failed to find candidates");

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].revision_id, old_rev);
    }

    #[tokio::test]
    async fn test_find_candidates_orders_by_parent_publish_date() {
        let pool = create_test_pool().await;
        let repo = SqliteRevisionRepo::new(pool.clone());

        let newer_post = insert_post(&pool, "post", days_ago(60)).await;
        let older_post = insert_post(&pool, "post", days_ago(120)).await;
        insert_revision(&pool, newer_post, days_ago(50)).await;
        insert_revision(&pool, older_post, days_ago(100)).await;

        let candidates = repo
            .find_candidates(&types(&["post"]), days_ago(30), None)
            .await
            .expect("Failed to find candidates");

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].post_id, older_post);
        assert_eq!(candidates[1].post_id, newer_post);
    }

    #[tokio::test]
    async fn test_find_candidates_orders_revisions_oldest_first_within_post() {
        let pool = create_test_pool().await;
        let repo = SqliteRevisionRepo::new(pool.clone());

        let post = insert_post(&pool, "post", days_ago(120)).await;
        let newer = insert_revision(&pool, post, days_ago(40)).await;
        let older = insert_revision(&pool, post, days_ago(100)).await;

        let candidates = repo
            .find_candidates(&types(&["post"]), days_ago(30), None)
            .await
            .expect("Failed to find candidates");

        assert_eq!(
            candidates
                .iter()
                .map(|c| c.revision_id)
                .collect::<Vec<_>>(),
            vec![older, newer]
        );
    }

    #[tokio::test]
    async fn test_find_candidates_applies_limit() {
        let pool = create_test_pool().await;
        let repo = SqliteRevisionRepo::new(pool.clone());

        let post = insert_post(&pool, "post", days_ago(120)).await;
        for i in 0..5 {
            insert_revision(&pool, post, days_ago(100 - i)).await;
        }

        let candidates = repo
            .find_candidates(&types(&["post"]), days_ago(30), Some(3))
            .await
            .expect("Failed to find candidates");

        assert_eq!(candidates.len(), 3);
    }

    #[tokio::test]
    async fn test_find_candidates_empty_post_types() {
        let pool = create_test_pool().await;
        let repo = SqliteRevisionRepo::new(pool.clone());

        let post = insert_post(&pool, "post", days_ago(90)).await;
        insert_revision(&pool, post, days_ago(60)).await;

        let candidates = repo
            .find_candidates(&[], days_ago(30), None)
            .await
            .expect("Failed to find candidates");

        assert!(candidates.is_empty());
    }

    #[tokio::test]
    async fn test_count_eligible() {
        let pool = create_test_pool().await;
        let repo = SqliteRevisionRepo::new(pool.clone());

        let post = insert_post(&pool, "post", days_ago(90)).await;
        insert_revision(&pool, post, days_ago(60)).await;
        insert_revision(&pool, post, days_ago(45)).await;
        insert_revision(&pool, post, days_ago(5)).await;

        let count = repo
            .count_eligible(&types(&["post"]), days_ago(30))
            .await
            .expect("Failed to count");

        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_count_eligible_empty_post_types() {
        let pool = create_test_pool().await;
        let repo = SqliteRevisionRepo::new(pool);

        let count = repo
            .count_eligible(&[], days_ago(30))
            .await
            .expect("Failed to count");

        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_delete_revision() {
        let pool = create_test_pool().await;
        let repo = SqliteRevisionRepo::new(pool.clone());

        let post = insert_post(&pool, "post", days_ago(90)).await;
        let rev = insert_revision(&pool, post, days_ago(60)).await;

        assert!(repo.delete(rev).await.expect("Failed to delete"));

        let remaining = repo
            .count_eligible(&types(&["post"]), days_ago(30))
            .await
            .expect("Failed to count");
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn test_delete_already_deleted_is_noop() {
        let pool = create_test_pool().await;
        let repo = SqliteRevisionRepo::new(pool.clone());

        let post = insert_post(&pool, "post", days_ago(90)).await;
        let rev = insert_revision(&pool, post, days_ago(60)).await;

        assert!(repo.delete(rev).await.expect("Failed to delete"));
        assert!(!repo.delete(rev).await.expect("Failed to delete"));
    }
}

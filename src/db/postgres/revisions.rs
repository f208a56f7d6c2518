use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::{
    db::{error::DbResult, repos::RevisionRepo},
    models::RevisionCandidate,
};

/// Postgres-backed revision storage.
///
/// Uses a single pool for reads and writes: each batch re-queries after the
/// previous batch's deletions, so reads must observe this process's own
/// writes. Routing candidate queries to a replica would reselect rows that
/// are already gone.
pub struct PostgresRevisionRepo {
    pool: PgPool,
}

impl PostgresRevisionRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RevisionRepo for PostgresRevisionRepo {
    async fn find_candidates(
        &self,
        post_types: &[String],
        cutoff: DateTime<Utc>,
        limit: Option<u32>,
    ) -> DbResult<Vec<RevisionCandidate>> {
        if post_types.is_empty() {
            return Ok(Vec::new());
        }

        let mut sql = String::from(
            r#"
            SELECT r.id AS revision_id, r.post_id, p.post_type, r.created_at
            FROM post_revisions r
            JOIN posts p ON p.id = r.post_id
            WHERE p.post_type = ANY($1)
              AND p.published_at < $2
              AND r.created_at < $2
            ORDER BY p.published_at ASC, r.created_at ASC
            "#,
        );
        if limit.is_some() {
            sql.push_str(" LIMIT $3");
        }

        let mut query = sqlx::query(&sql).bind(post_types).bind(cutoff);
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

        let row = sqlx::query(
            r#"
            SELECT COUNT(r.id) AS count
            FROM post_revisions r
            JOIN posts p ON p.id = r.post_id
            WHERE p.post_type = ANY($1)
              AND p.published_at < $2
              AND r.created_at < $2
            "#,
        )
        .bind(post_types)
        .bind(cutoff)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get::<i64, _>("count"))
    }

    async fn delete(&self, revision_id: i64) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM post_revisions WHERE id = $1")
            .bind(revision_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{db::error::DbResult, models::RevisionCandidate};

/// Storage access for post revisions.
///
/// The selector/batcher is the only consumer. Candidate ordering is part of
/// the contract: rows come back sorted by the parent post's publish date
/// ascending, then revision creation date ascending. Relative order of rows
/// with equal timestamps is unspecified.
#[async_trait]
pub trait RevisionRepo: Send + Sync {
    /// Find revisions eligible for removal.
    ///
    /// A revision is eligible when its parent post's type is in `post_types`
    /// and both the parent's publish date and the revision's own creation
    /// date fall before `cutoff`. `limit` caps the result at the database
    /// level; pass `None` when a retention rule must see every candidate
    /// before any truncation.
    async fn find_candidates(
        &self,
        post_types: &[String],
        cutoff: DateTime<Utc>,
        limit: Option<u32>,
    ) -> DbResult<Vec<RevisionCandidate>>;

    /// Count revisions matching the eligibility predicate, without a limit.
    async fn count_eligible(&self, post_types: &[String], cutoff: DateTime<Utc>) -> DbResult<i64>;

    /// Delete a single revision by ID.
    ///
    /// Returns `false` when no row was deleted (already gone); that is not
    /// an error.
    async fn delete(&self, revision_id: i64) -> DbResult<bool>;
}

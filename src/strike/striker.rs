use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveTime, Utc};

use crate::{
    config::StrikeConfig,
    db::{DbResult, RevisionRepo},
};

use super::{
    policy::{ConfiguredPostTypes, KeepOverride, PostTypeResolver, ResultPostProcessor},
    selector::select_removable,
};

/// The batch size when striking revisions.
///
/// A single pass deletes at most `limit` revisions, split into batches of
/// at most this many. Each batch re-queries the store instead of paginating
/// with offsets: the previous batch's deletions drop out of the next
/// batch's results on their own, so batching stays correct even when some
/// deletions fail.
pub const BATCH_SIZE: u32 = 50;

/// Arguments for a single strike pass.
///
/// Constructed from [`StrikeConfig`] defaults, with the calling surface
/// free to override any field for one invocation.
#[derive(Debug, Clone)]
pub struct StrikeArgs {
    /// Days a post must have been published before its revisions are
    /// eligible.
    pub days: u32,
    /// Maximum number of revisions this pass may delete. Zero is a no-op.
    pub limit: u32,
    /// Post types whose revisions are considered.
    pub post_types: Vec<String>,
    /// Newest revisions to retain per post regardless of age.
    pub keep: u32,
    /// Select and log without deleting.
    pub dry_run: bool,
}

impl StrikeArgs {
    pub fn from_config(config: &StrikeConfig) -> Self {
        Self {
            days: config.days,
            limit: config.limit,
            post_types: config.post_types.clone(),
            keep: config.keep,
            dry_run: config.safety.dry_run,
        }
    }
}

/// Statistics for a single strike pass. Reset on every call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStatistics {
    /// Removable revisions matched by the eligibility query before the
    /// limit was applied (last non-empty batch).
    pub found: u64,
    /// Revisions actually deleted, accumulated across batches.
    pub deleted: u64,
}

impl RunStatistics {
    /// Classify the pass for the calling surface.
    pub fn outcome(&self) -> StrikeOutcome {
        if self.found == 0 && self.deleted == 0 {
            StrikeOutcome::NoMatches
        } else if self.deleted == 0 {
            StrikeOutcome::NoneDeleted
        } else {
            StrikeOutcome::Deleted(self.deleted)
        }
    }
}

/// Three-way classification of a completed pass.
///
/// Failure interpretation (messages, exit codes) belongs to the caller;
/// the striker itself never raises for these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrikeOutcome {
    /// No revisions matched the criteria.
    NoMatches,
    /// Candidates were found but none could be deleted.
    NoneDeleted,
    /// This many revisions were deleted.
    Deleted(u64),
}

/// Selects and deletes old post revisions in bounded batches.
pub struct Striker {
    repo: Arc<dyn RevisionRepo>,
    post_types: Arc<dyn PostTypeResolver>,
    keep_override: Option<Arc<dyn KeepOverride>>,
    post_processor: Option<Arc<dyn ResultPostProcessor>>,
}

impl Striker {
    pub fn new(repo: Arc<dyn RevisionRepo>) -> Self {
        Self {
            repo,
            post_types: Arc::new(ConfiguredPostTypes),
            keep_override: None,
            post_processor: None,
        }
    }

    /// Install a post-type resolver replacing the identity default.
    pub fn with_post_type_resolver(mut self, resolver: Arc<dyn PostTypeResolver>) -> Self {
        self.post_types = resolver;
        self
    }

    /// Install a per-post-type keep override.
    ///
    /// Installing one disables database-level batch limits even when the
    /// configured keep is zero, since the override must see every
    /// candidate.
    pub fn with_keep_override(mut self, policy: Arc<dyn KeepOverride>) -> Self {
        self.keep_override = Some(policy);
        self
    }

    /// Install a post-processor over the final removable ID list.
    pub fn with_result_post_processor(mut self, processor: Arc<dyn ResultPostProcessor>) -> Self {
        self.post_processor = Some(processor);
        self
    }

    /// Run one strike pass: select eligible revisions, delete up to
    /// `args.limit` of them oldest-first, and report statistics.
    ///
    /// Never returns an error for empty configuration or partial deletion
    /// failure; only storage-level query errors propagate.
    pub async fn strike(&self, args: &StrikeArgs) -> DbResult<RunStatistics> {
        let mut stats = RunStatistics::default();

        let post_types = self
            .post_types
            .resolve(normalize_post_types(&args.post_types));
        if post_types.is_empty() {
            tracing::debug!("No eligible post types, nothing to strike");
            return Ok(stats);
        }
        if args.limit == 0 {
            tracing::debug!("Limit is zero, nothing to strike");
            return Ok(stats);
        }

        let per_batch = args.limit.min(BATCH_SIZE);
        let batch_count = args.limit.div_ceil(per_batch);
        let cutoff = cutoff_for(args.days);

        // Retention must see every candidate per post before truncation;
        // without it the query can bound each batch at the database level.
        let retention_active = args.keep > 0 || self.keep_override.is_some();

        let mut remaining = args.limit;
        let mut attempted: u64 = 0;
        for batch in 0..batch_count {
            if remaining == 0 {
                break;
            }
            let batch_limit = per_batch.min(remaining);
            let query_limit = if retention_active {
                None
            } else {
                Some(batch_limit)
            };

            let candidates = self
                .repo
                .find_candidates(&post_types, cutoff, query_limit)
                .await?;
            if candidates.is_empty() {
                // The next batch's query would be empty too.
                break;
            }

            let mut selection = select_removable(
                candidates,
                args.keep,
                self.keep_override.as_deref(),
                batch_limit as usize,
            );
            if selection.found == 0 {
                // Candidates exist but every one is retained; later batches
                // would select nothing new either.
                break;
            }
            if let Some(processor) = &self.post_processor {
                selection.revision_ids = processor.process(selection.revision_ids);
                selection.revision_ids.truncate(batch_limit as usize);
            }
            stats.found = selection.found;

            tracing::debug!(
                batch,
                found = selection.found,
                selected = selection.revision_ids.len(),
                "Selected revisions for removal"
            );

            if args.dry_run {
                for revision_id in &selection.revision_ids {
                    tracing::info!(revision_id, "DRY RUN: would delete revision");
                }
                // Nothing was deleted, so another batch would only reselect
                // the same rows.
                break;
            }

            remaining -= selection.revision_ids.len() as u32;
            for revision_id in selection.revision_ids {
                attempted += 1;
                match self.repo.delete(revision_id).await {
                    Ok(true) => {
                        stats.deleted += 1;
                        tracing::debug!(revision_id, "Deleted revision");
                    }
                    Ok(false) => {
                        tracing::warn!(revision_id, "Revision was already gone");
                    }
                    Err(e) => {
                        tracing::warn!(revision_id, error = %e, "Failed to delete revision");
                    }
                }
            }
        }

        if stats.deleted < attempted {
            tracing::warn!(
                attempted,
                deleted = stats.deleted,
                "Some revisions could not be deleted"
            );
        }

        Ok(stats)
    }
}

/// Cutoff instant for an age threshold: "now minus `days` days", truncated
/// to day granularity (midnight UTC).
pub fn cutoff_for(days: u32) -> DateTime<Utc> {
    let date = (Utc::now() - Duration::days(days as i64)).date_naive();
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Trim whitespace around each tag, drop empties, dedupe preserving order.
fn normalize_post_types(raw: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(raw.len());
    for tag in raw {
        let tag = tag.trim();
        if tag.is_empty() || normalized.iter().any(|t| t == tag) {
            continue;
        }
        normalized.push(tag.to_string());
    }
    normalized
}

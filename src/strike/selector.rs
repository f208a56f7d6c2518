//! Pure selection logic: grouping, retention scrub, truncation.
//!
//! Operates on candidate rows the storage layer already filtered by post
//! type and age; everything here is synchronous and store-free so the
//! retention semantics can be tested exhaustively.

use std::collections::HashMap;

use crate::models::RevisionCandidate;

use super::policy::KeepOverride;

/// Outcome of one selection pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Revision IDs to delete, in deletion order.
    pub revision_ids: Vec<i64>,
    /// Size of the removable set before the limit was applied.
    pub found: u64,
}

/// Compute the removable revision IDs from a candidate set.
///
/// Candidates are grouped by parent post in first-seen order (the query
/// orders parents oldest-published first). Within each post the revisions
/// are sorted oldest-created first and the `keep` newest are scrubbed; a
/// post with `keep` or fewer candidates contributes nothing. The surviving
/// IDs are concatenated in post order and truncated to `limit`.
///
/// The sort is stable, so candidates with equal creation timestamps keep
/// their query order; no particular order is promised for such ties.
pub fn select_removable(
    candidates: Vec<RevisionCandidate>,
    keep: u32,
    keep_override: Option<&dyn KeepOverride>,
    limit: usize,
) -> Selection {
    // Group by parent post, preserving the order posts first appear.
    let mut post_order: Vec<i64> = Vec::new();
    let mut by_post: HashMap<i64, Vec<RevisionCandidate>> = HashMap::new();
    for candidate in candidates {
        let group = by_post.entry(candidate.post_id).or_default();
        if group.is_empty() {
            post_order.push(candidate.post_id);
        }
        group.push(candidate);
    }

    let mut removable: Vec<i64> = Vec::new();
    for post_id in post_order {
        let mut revisions = by_post.remove(&post_id).unwrap_or_default();
        revisions.sort_by_key(|r| r.created_at);

        let keep_n = match keep_override {
            Some(policy) => policy.keep_for(&revisions[0].post_type, keep),
            None => keep,
        } as usize;

        if revisions.len() > keep_n {
            let cut = revisions.len() - keep_n;
            removable.extend(revisions.drain(..cut).map(|r| r.revision_id));
        }
    }

    let found = removable.len() as u64;
    removable.truncate(limit);

    Selection {
        revision_ids: removable,
        found,
    }
}

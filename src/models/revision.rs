use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A revision row eligible for consideration by the selector.
///
/// One row per stored revision of a post whose parent matched the
/// eligibility query (post type in the configured set, both the parent's
/// publish date and the revision's creation date past the cutoff).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisionCandidate {
    /// Unique identifier of the revision.
    pub revision_id: i64,
    /// The parent post that owns this revision.
    pub post_id: i64,
    /// Post type of the parent (e.g. "post", "page").
    /// Carried so retention overrides can vary by type.
    pub post_type: String,
    /// When the revision was created.
    pub created_at: DateTime<Utc>,
}

//! Strategy seams for callers that need to influence selection.
//!
//! Each seam has an identity default; hosts embedding the library can
//! install their own implementations on the [`Striker`](super::Striker)
//! builder.

/// Maps the configured post-type set to the effective set used for a pass.
pub trait PostTypeResolver: Send + Sync {
    fn resolve(&self, configured: Vec<String>) -> Vec<String>;
}

/// Default resolver: the configured set is the effective set.
#[derive(Debug, Default)]
pub struct ConfiguredPostTypes;

impl PostTypeResolver for ConfiguredPostTypes {
    fn resolve(&self, configured: Vec<String>) -> Vec<String> {
        configured
    }
}

impl<F> PostTypeResolver for F
where
    F: Fn(Vec<String>) -> Vec<String> + Send + Sync,
{
    fn resolve(&self, configured: Vec<String>) -> Vec<String> {
        self(configured)
    }
}

/// Overrides the retained-revision count per post type.
pub trait KeepOverride: Send + Sync {
    /// Return the keep count to use for `post_type`, given the configured
    /// value.
    fn keep_for(&self, post_type: &str, configured: u32) -> u32;
}

impl<F> KeepOverride for F
where
    F: Fn(&str, u32) -> u32 + Send + Sync,
{
    fn keep_for(&self, post_type: &str, configured: u32) -> u32 {
        self(post_type, configured)
    }
}

/// Filters or reorders the final removable revision-ID list before any
/// deletion happens.
pub trait ResultPostProcessor: Send + Sync {
    fn process(&self, revision_ids: Vec<i64>) -> Vec<i64>;
}

impl<F> ResultPostProcessor for F
where
    F: Fn(Vec<i64>) -> Vec<i64> + Send + Sync,
{
    fn process(&self, revision_ids: Vec<i64>) -> Vec<i64> {
        self(revision_ids)
    }
}

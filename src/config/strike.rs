//! Revision strike configuration.
//!
//! Configures which revisions are eligible for removal and how aggressively
//! each pass prunes them.
//!
//! # Example
//!
//! ```toml
//! [strike]
//! days = 30
//! limit = 50
//! post_types = ["post", "page"]
//! keep = 2
//!
//! [strike.scheduler]
//! enabled = true
//! interval_hours = 24
//!
//! [strike.safety]
//! dry_run = false
//! ```

use serde::{Deserialize, Serialize};

/// Revision strike configuration.
///
/// These are the defaults for every pass; the CLI can override any of them
/// for a single invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StrikeConfig {
    /// A post must have been published at least this many days ago before
    /// its revisions are eligible. The cutoff is computed at day
    /// granularity.
    /// Default: 30
    #[serde(default = "default_days")]
    pub days: u32,

    /// Maximum number of revisions to delete in a single pass.
    /// A value of 0 makes the pass a no-op.
    /// Default: 50
    #[serde(default = "default_limit")]
    pub limit: u32,

    /// Post types whose revisions are eligible. An empty list disables
    /// striking entirely (no query is issued).
    /// Default: ["post"]
    #[serde(default = "default_post_types")]
    pub post_types: Vec<String>,

    /// Number of most-recent revisions to always retain per post,
    /// regardless of age.
    /// Default: 0 (keep nothing back)
    #[serde(default)]
    pub keep: u32,

    /// Background scheduler settings.
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Safety settings to prevent accidental data loss.
    #[serde(default)]
    pub safety: StrikeSafety,
}

impl Default for StrikeConfig {
    fn default() -> Self {
        Self {
            days: default_days(),
            limit: default_limit(),
            post_types: default_post_types(),
            keep: 0,
            scheduler: SchedulerConfig::default(),
            safety: StrikeSafety::default(),
        }
    }
}

fn default_days() -> u32 {
    30
}

fn default_limit() -> u32 {
    50
}

fn default_post_types() -> Vec<String> {
    vec!["post".to_string()]
}

/// Background scheduler settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Whether the `run` command's background worker strikes on a cadence.
    /// Default: false (must be explicitly enabled)
    #[serde(default)]
    pub enabled: bool,

    /// How often to run a strike pass (in hours).
    /// Default: 24 (once per day)
    #[serde(default = "default_interval_hours")]
    pub interval_hours: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_hours: default_interval_hours(),
        }
    }
}

fn default_interval_hours() -> u64 {
    24
}

/// Safety settings for strike passes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StrikeSafety {
    /// If true, log what would be deleted without actually deleting.
    /// Useful for testing a configuration before enabling it.
    /// Default: false
    #[serde(default)]
    pub dry_run: bool,
}

impl StrikeConfig {
    /// Get the scheduler interval as a Duration.
    pub fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.scheduler.interval_hours * 3600)
    }

    pub fn validate(&self) -> Result<(), super::ConfigError> {
        if self.scheduler.enabled && self.scheduler.interval_hours == 0 {
            return Err(super::ConfigError::Validation(
                "strike.scheduler.interval_hours must be positive when the scheduler is enabled"
                    .into(),
            ));
        }
        Ok(())
    }
}

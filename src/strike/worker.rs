//! Background worker that runs strike passes on a fixed cadence.
//!
//! Follows the same pattern as the CLI surfaces: one pass at a time, the
//! statistics classified after the fact, errors logged and the loop kept
//! alive.

use std::sync::Arc;

use crate::config::StrikeConfig;

use super::{StrikeArgs, Striker};

/// Starts the strike worker as a background task.
///
/// The worker runs in a loop, striking old revisions at the configured
/// interval with the configured defaults. It will run indefinitely until
/// the task is cancelled.
pub async fn start_strike_worker(striker: Arc<Striker>, config: StrikeConfig) {
    if !config.scheduler.enabled {
        tracing::info!("Strike worker disabled by configuration");
        return;
    }

    let dry_run_msg = if config.safety.dry_run {
        " (DRY RUN)"
    } else {
        ""
    };

    tracing::info!(
        interval_hours = config.scheduler.interval_hours,
        days = config.days,
        limit = config.limit,
        keep = config.keep,
        post_types = ?config.post_types,
        dry_run = config.safety.dry_run,
        "Starting strike worker{}",
        dry_run_msg
    );

    let interval = config.interval();
    let args = StrikeArgs::from_config(&config);

    loop {
        match striker.strike(&args).await {
            Ok(stats) => {
                if stats.found > 0 || stats.deleted > 0 {
                    tracing::info!(
                        found = stats.found,
                        deleted = stats.deleted,
                        dry_run = config.safety.dry_run,
                        "Strike pass complete{}",
                        dry_run_msg
                    );
                } else {
                    tracing::debug!("Strike pass complete, no revisions to delete");
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Error running strike pass");
            }
        }

        tokio::time::sleep(interval).await;
    }
}

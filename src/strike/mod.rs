//! Revision selection and batched deletion.
//!
//! This module is the core of the tool. Given an age threshold, a
//! post-type set, a per-pass limit and a retention count, it:
//! 1. Queries the store for candidate revisions of old posts
//! 2. Groups them by parent post, oldest first
//! 3. Scrubs the newest `keep` revisions of each post
//! 4. Deletes up to `limit` of the survivors in bounded batches
//!
//! Deletion runs in batches of at most [`BATCH_SIZE`], each batch
//! re-querying the store so earlier deletions fall out on their own.
//! Statistics are returned explicitly; nothing here holds state between
//! passes.

mod policy;
mod selector;
mod striker;
mod worker;

pub use policy::{ConfiguredPostTypes, KeepOverride, PostTypeResolver, ResultPostProcessor};
pub use selector::{Selection, select_removable};
pub use striker::{BATCH_SIZE, RunStatistics, StrikeArgs, StrikeOutcome, Striker, cutoff_for};
pub use worker::start_strike_worker;

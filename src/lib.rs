//! revision-strike: prunes old post revisions from a CMS content database.
//!
//! The library surface exposes the selector/batcher ([`strike::Striker`]),
//! the storage layer ([`db::DbPool`] and [`db::RevisionRepo`]), and the
//! configuration types, so the tool can be embedded in a host application
//! as well as driven from the bundled CLI.

pub mod config;
pub mod db;
pub mod models;
pub mod observability;
pub mod strike;

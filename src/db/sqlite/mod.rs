mod revisions;

pub use revisions::SqliteRevisionRepo;

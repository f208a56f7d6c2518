mod revisions;

pub use revisions::PostgresRevisionRepo;

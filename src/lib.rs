// Tracked Query - Core Library
// SQLite-backed person store with an explicit unit of work:
// queries hand out tracked entities, projections stay read-only

pub mod config;
pub mod criteria;
pub mod db;
pub mod entities;
pub mod error;
pub mod session;
pub mod store;
pub mod workflow;

// Re-export commonly used types
pub use config::{JournalMode, StoreConfig};
pub use criteria::{Comparison, Criteria};
pub use entities::{Person, PersonAge, PersonId, PersonSummary, Projection, SEED_PEOPLE};
pub use error::{CommitError, Result, StoreError};
pub use session::{CommitSummary, UnitOfWork};
pub use store::Store;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

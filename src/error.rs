// Error types for the record store.
//
// Library code returns StoreError; the binary wraps it with anyhow
// context at the program boundary.

use std::path::PathBuf;

use crate::entities::PersonId;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors raised by the store and its units of work.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The database could not be opened, configured or given its schema.
    #[error("storage unavailable at {}: {source}", path.display())]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// A commit was rejected; nothing from it was persisted.
    #[error("commit failed: {0}")]
    CommitFailure(#[from] CommitError),

    /// A read against the database failed.
    #[error("query failed: {0}")]
    Query(#[from] rusqlite::Error),

    /// A stored row could not be decoded into an entity.
    #[error("corrupt row: {0}")]
    CorruptRow(String),

    /// Adding to a person's age would leave the i64 range.
    #[error("age of person {id} overflows when adding {years}")]
    AgeOverflow { id: PersonId, years: i64 },
}

/// Why a commit was rolled back.
#[derive(Debug, thiserror::Error)]
pub enum CommitError {
    /// Another writer changed the record after this unit of work loaded it.
    #[error("write conflict on person {id}: row changed since it was loaded")]
    Conflict { id: PersonId },

    /// The database refused the write (I/O, locking, constraint).
    #[error("write error: {0}")]
    Write(#[source] rusqlite::Error),
}

impl StoreError {
    pub(crate) fn unavailable(path: impl Into<PathBuf>, source: rusqlite::Error) -> Self {
        StoreError::StorageUnavailable {
            path: path.into(),
            source,
        }
    }

    /// True when the error came from a rejected commit.
    pub fn is_commit_failure(&self) -> bool {
        matches!(self, StoreError::CommitFailure(_))
    }

    /// True when a commit lost an optimistic-lock race.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            StoreError::CommitFailure(CommitError::Conflict { .. })
        )
    }
}

impl From<rusqlite::Error> for CommitError {
    fn from(err: rusqlite::Error) -> Self {
        CommitError::Write(err)
    }
}

use crate::store::RecordId;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by [`Store`](crate::Store) operations.
///
/// A missing backing file is not an error: [`Store::load`](crate::Store::load)
/// treats it as an empty collection. Unknown timeframes and categories are
/// not errors either; queries degrade to empty results.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// A data row could not be turned into a record (bad date, missing or
    /// non-numeric field, wrong column count).
    #[error("malformed record at line {line} of {}: {reason}", .path.display())]
    MalformedRecord {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    /// The header row lacks columns the schema requires.
    #[error("{} is missing required columns: {}", .path.display(), .missing.join(", "))]
    SchemaMismatch { path: PathBuf, missing: Vec<String> },

    /// Writing the collection to disk failed. The in-memory collection is
    /// left as it was after the mutation; nothing is rolled back.
    #[error("failed to persist {}: {source}", .path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading the backing file failed for a reason other than absence.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Preparing the store failed: creating the parent directory or the
    /// lock file.
    #[error("failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("index {index} out of range for {len} records")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("no record with id {0}")]
    NotFound(RecordId),

    /// Another store holds the exclusive lock on this file.
    #[error("another writer holds the lock on {}", .path.display())]
    Locked { path: PathBuf },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;

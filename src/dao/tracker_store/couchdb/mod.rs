mod config;
mod error;
mod models;
mod store;

pub use config::{CouchConfig, CouchCredentials};
pub use error::CouchDaoError;
pub use store::CouchTrackerStore;

use crate::dao::storage::StorageError;

impl From<CouchDaoError> for StorageError {
    fn from(err: CouchDaoError) -> Self {
        match err {
            CouchDaoError::ConflictRetriesExhausted { doc_id, attempts } => StorageError::Conflict {
                key: doc_id,
                attempts,
            },
            other => StorageError::unavailable(other.to_string(), other),
        }
    }
}

//! Failures of the CouchDB tracker store, keyed by the document they hit.

use reqwest::StatusCode;
use thiserror::Error;

/// Result alias of the CouchDB tracker store.
pub type CouchResult<T> = Result<T, CouchDaoError>;

/// Failures that can occur while talking to CouchDB.
#[derive(Debug, Error)]
pub enum CouchDaoError {
    /// `COUCH_URL` is not set.
    #[error("missing CouchDB environment variable `{var}`")]
    MissingEnvVar {
        /// Name of the variable.
        var: &'static str,
    },
    /// The server URL cannot be used.
    #[error("invalid CouchDB url `{url}`: {reason}")]
    InvalidUrl {
        /// URL as configured.
        url: String,
        /// Why it was refused.
        reason: String,
    },
    /// The HTTP client could not be built.
    #[error("failed to build CouchDB client")]
    ClientBuilder {
        /// Underlying HTTP failure.
        #[source]
        source: reqwest::Error,
    },
    /// The tracker database could not be looked up or created.
    #[error("tracker database `{database}` is unreachable")]
    Database {
        /// Database name.
        database: String,
        /// Underlying HTTP failure.
        #[source]
        source: reqwest::Error,
    },
    /// CouchDB answered a database call with an unexpected status.
    #[error("tracker database `{database}` answered {status}")]
    DatabaseStatus {
        /// Database name.
        database: String,
        /// Status returned by CouchDB.
        status: StatusCode,
    },
    /// A document request never got an answer.
    #[error("request for document `{doc_id}` failed")]
    Transport {
        /// Document id or endpoint.
        doc_id: String,
        /// Underlying HTTP failure.
        #[source]
        source: reqwest::Error,
    },
    /// CouchDB answered a document request with an unexpected status.
    #[error("document `{doc_id}` answered {status}")]
    UnexpectedStatus {
        /// Document id or endpoint.
        doc_id: String,
        /// Status returned by CouchDB.
        status: StatusCode,
    },
    /// The document revision moved between read and write.
    #[error("revision conflict on document `{doc_id}`")]
    Conflict {
        /// Contended document.
        doc_id: String,
    },
    /// Every read-modify-write lost against a concurrent writer.
    #[error("document `{doc_id}` kept conflicting after {attempts} attempt(s)")]
    ConflictRetriesExhausted {
        /// Contended document.
        doc_id: String,
        /// Attempts made.
        attempts: u32,
    },
    /// The body was not JSON.
    #[error("document `{doc_id}` is not valid JSON")]
    Decode {
        /// Document id or endpoint.
        doc_id: String,
        /// Underlying HTTP failure.
        #[source]
        source: reqwest::Error,
    },
    /// The JSON did not match the tracker or ranking shape.
    #[error("document `{doc_id}` does not match the expected shape")]
    Shape {
        /// Document id.
        doc_id: String,
        /// Underlying decoding failure.
        #[source]
        source: serde_json::Error,
    },
}

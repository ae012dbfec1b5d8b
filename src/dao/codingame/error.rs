use reqwest::StatusCode;
use thiserror::Error;

use crate::state::clash::MalformedData;

/// Result alias for clash fetches.
pub type FetchResult<T> = Result<T, CodinGameError>;

/// Hard failures while fetching a clash. A missing clash is not one of them.
#[derive(Debug, Error)]
pub enum CodinGameError {
    /// Building the HTTP client failed.
    #[error("failed to build CodinGame client")]
    ClientBuilder {
        /// HTTP failure.
        #[source]
        source: reqwest::Error,
    },
    /// The request could not be sent or timed out.
    #[error("failed to query clash `{handle}`")]
    RequestSend {
        /// Requested clash.
        handle: String,
        /// HTTP failure.
        #[source]
        source: reqwest::Error,
    },
    /// CodinGame answered with an unexpected status code.
    #[error("unexpected CodinGame response status {status} for clash `{handle}`")]
    RequestStatus {
        /// Requested clash.
        handle: String,
        /// Status returned by CodinGame.
        status: StatusCode,
    },
    /// The response body was not JSON.
    #[error("failed to decode CodinGame response for clash `{handle}`")]
    DecodeResponse {
        /// Requested clash.
        handle: String,
        /// HTTP failure.
        #[source]
        source: reqwest::Error,
    },
    /// The response was JSON but not a usable clash.
    #[error("malformed clash `{handle}`")]
    Malformed {
        /// Requested clash.
        handle: String,
        /// What was wrong with the payload.
        #[source]
        source: MalformedData,
    },
}

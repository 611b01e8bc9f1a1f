use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single request against the movie collection.
///
/// Every variant is handled the same way by callers: a load failure enters
/// the retry loop, a submit failure is shown once to the user.
#[derive(Debug, Error)]
pub enum MovieClientError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: StatusCode },
    #[error("could not decode movie collection: {0}")]
    Decode(#[from] serde_json::Error),
}

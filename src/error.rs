// Error type shared by every module of the walkthrough. The binary wraps
// it in `anyhow` at the top level; library code returns it directly so
// callers (and tests) can match on the kind of failure.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DemoError {
    /// Network, TLS or request-timeout failure reported by reqwest.
    #[error("{method} {uri} failed")]
    Transport {
        method: &'static str,
        uri: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("response from {uri} is not valid JSON")]
    InvalidJson {
        uri: String,
        #[source]
        source: serde_json::Error,
    },

    /// The JSON body did not have the shape expected for `resource`.
    #[error("unexpected {resource} document")]
    Decode {
        resource: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("request {uri} still {last_status} after waiting {waited:?}")]
    Timeout {
        uri: String,
        last_status: String,
        waited: Duration,
    },

    #[error("wait for {uri} was cancelled")]
    Cancelled { uri: String },

    #[error("invalid value {value:?} for {key}")]
    InvalidSetting { key: &'static str, value: String },

    #[error("invalid authorization header")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("terminal interaction failed")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = DemoError> = std::result::Result<T, E>;

use std::path::PathBuf;
use thiserror::Error;

/// Fatal failures of a collection run.
///
/// Missing fields inside individual camera records are not represented here;
/// they are defaulted in [`crate::models`] and never abort a run.
#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("authentication failed: {message}")]
    Authentication {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("failed to fetch camera page at offset {offset}")]
    PageFetch {
        offset: usize,
        #[source]
        source: reqwest::Error,
    },

    #[error("camera page at offset {offset} is not a JSON array")]
    MalformedPage {
        offset: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write snapshot {path}")]
    Snapshot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode snapshot")]
    Encode(#[from] serde_json::Error),
}

impl CollectorError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn authentication(msg: impl Into<String>) -> Self {
        Self::Authentication {
            message: msg.into(),
            source: None,
        }
    }

    pub fn authentication_request(msg: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Authentication {
            message: msg.into(),
            source: Some(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, CollectorError>;

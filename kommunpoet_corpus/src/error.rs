// Errors from fetching, parsing and persisting municipality records.

use std::path::PathBuf;

use kommunpoet_engine::PoemError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("fetching {url} failed: {message}")]
    Fetch { url: String, message: String },

    #[error("fetching {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("page has no {0} element")]
    MissingElement(&'static str),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no municipalities registered; run fetch-links first")]
    NoRecords,

    #[error(transparent)]
    Poem(#[from] PoemError),
}

impl CorpusError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CorpusError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        CorpusError::Json {
            path: path.into(),
            source,
        }
    }
}

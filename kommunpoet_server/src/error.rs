// Front-end errors.

use std::path::PathBuf;

use kommunpoet_corpus::CorpusError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("could not listen on {addr}: {message}")]
    Bind { addr: String, message: String },

    #[error("listener has no IP address")]
    NoAddress,

    #[error("config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Corpus(#[from] CorpusError),
}

// Engine errors.
//
// Data-quality problems (empty corpus, exhausted sections, a model that
// cannot produce a fresh sentence) are not errors: the engine returns a
// short or empty poem instead. The only failures are in chaos mode, when a
// record has no model or its serialized model cannot be decoded. Extractive
// generation never touches the model and so never fails.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PoemError {
    #[error("record {id} has no trained model; compile it first")]
    MissingModel { id: String },

    #[error("malformed model: {0}")]
    MalformedModel(String),
}

impl From<serde_json::Error> for PoemError {
    fn from(err: serde_json::Error) -> Self {
        PoemError::MalformedModel(err.to_string())
    }
}

// Application configuration, loaded from an optional JSON file:
//
//   { "poet":   { "min_lines": 10, ... },
//     "corpus": { "data_dir": "data", ... },
//     "server": { "host": "127.0.0.1", "port": 8000 } }
//
// Every section and field is optional and falls back to its default.

use std::fs;
use std::path::Path;

use kommunpoet_corpus::CorpusConfig;
use kommunpoet_engine::PoetConfig;
use serde::{Deserialize, Serialize};

use crate::error::ServerError;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub poet: PoetConfig,
    pub corpus: CorpusConfig,
    pub server: ServerConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    /// 0 lets the OS pick a free port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8000,
        }
    }
}

impl AppConfig {
    /// Defaults when `path` is `None`, otherwise the file's settings.
    pub fn load(path: Option<&Path>) -> Result<Self, ServerError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path).map_err(|source| ServerError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ServerError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

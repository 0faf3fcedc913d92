// Where articles come from and where fetched data is kept.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::CorpusError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// Wiki root; article and link paths are resolved against it.
    pub base_url: String,
    /// Path of the page listing every municipality.
    pub list_page: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Directory holding `kommuner.json` and `html.json`.
    pub data_dir: PathBuf,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            base_url: "https://sv.wikipedia.org/".into(),
            list_page: "wiki/Lista_över_Sveriges_kommuner".into(),
            user_agent: concat!("kommunpoet/", env!("CARGO_PKG_VERSION")).into(),
            timeout_secs: 30,
            data_dir: PathBuf::from("data"),
        }
    }
}

impl CorpusConfig {
    /// Resolve an absolute or site-relative link (e.g. "/wiki/Alingsås").
    pub fn resolve(&self, href: &str) -> Result<String, CorpusError> {
        let base = Url::parse(&self.base_url).map_err(|err| CorpusError::InvalidUrl {
            url: self.base_url.clone(),
            message: err.to_string(),
        })?;
        let url = base.join(href).map_err(|err| CorpusError::InvalidUrl {
            url: href.to_string(),
            message: err.to_string(),
        })?;
        Ok(url.into())
    }

    /// URL of a municipality's article.
    pub fn article_url(&self, id: &str) -> Result<String, CorpusError> {
        self.resolve(&format!("wiki/{id}"))
    }

    pub fn list_url(&self) -> Result<String, CorpusError> {
        self.resolve(&self.list_page)
    }
}

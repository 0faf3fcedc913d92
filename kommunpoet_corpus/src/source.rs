// Page sources: where article HTML comes from.
//
// `PageSource` is the seam between record compilation and the network.
// `HttpPageSource` fetches over HTTP with a blocking client; tests plug in
// an in-memory map instead.

use std::time::Duration;

use tracing::debug;

use crate::config::CorpusConfig;
use crate::error::CorpusError;

pub trait PageSource: Send + Sync {
    /// Fetch the body of `url` as text.
    fn fetch(&self, url: &str) -> Result<String, CorpusError>;
}

/// Fetches pages over HTTP(S).
pub struct HttpPageSource {
    client: reqwest::blocking::Client,
}

impl HttpPageSource {
    pub fn new(config: &CorpusConfig) -> Result<Self, CorpusError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| CorpusError::Fetch {
                url: config.base_url.clone(),
                message: err.to_string(),
            })?;
        Ok(Self { client })
    }
}

impl PageSource for HttpPageSource {
    fn fetch(&self, url: &str) -> Result<String, CorpusError> {
        debug!(url, "GET");
        let fetch_error = |err: reqwest::Error| CorpusError::Fetch {
            url: url.to_string(),
            message: err.to_string(),
        };
        let response = self.client.get(url).send().map_err(fetch_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(CorpusError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        response.text().map_err(fetch_error)
    }
}

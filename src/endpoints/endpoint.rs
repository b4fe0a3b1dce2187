//! Endpoint abstraction.
//!
//! # Responsibilities
//! - Represent a single read/write node endpoint
//! - Build the request URL, appending the API key when one is set

use serde::{Deserialize, Serialize};
use url::Url;

/// Query parameter carrying the API key.
pub const API_KEY_PARAM: &str = "api-key";

/// A single RPC endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Endpoint {
    /// Stable identity used for primary selection and dedup.
    pub id: String,
    /// Human readable name used in logs and results.
    pub label: String,
    /// Base URL, may already carry query parameters.
    pub url: String,
    /// Empty when the endpoint needs no key.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Endpoint {
    pub fn new(id: impl Into<String>, label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            url: url.into(),
            api_key: String::new(),
            enabled: true,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// URL to send requests to.
    ///
    /// The API key goes last, after any parameters already in `url`.
    pub fn request_url(&self) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&self.url)?;
        if !self.api_key.is_empty() {
            url.query_pairs_mut().append_pair(API_KEY_PARAM, &self.api_key);
        }
        Ok(url)
    }
}

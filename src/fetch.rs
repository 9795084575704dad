//! Blocking page retrieval

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// HTTP settings for fetching pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("semantic-selectors/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 30,
        }
    }
}

/// Fetch `url` and return the response body as text
pub fn fetch(url: &str, config: &FetchConfig) -> Result<String> {
    let parsed = url::Url::parse(url)?;

    let agent = ureq::Agent::new_with_config(
        ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .user_agent(config.user_agent.as_str())
            .build(),
    );

    debug!(url = %parsed, "fetching page");
    let fetch_error = |reason: String| Error::Fetch {
        url: url.to_string(),
        reason,
    };

    let resp = agent
        .get(parsed.as_str())
        .call()
        .map_err(|e| fetch_error(e.to_string()))?;

    if !resp.status().is_success() {
        return Err(fetch_error(format!("HTTP {}", resp.status())));
    }

    resp.into_body()
        .read_to_string()
        .map_err(|e| fetch_error(e.to_string()))
}

//! Error types
//!
//! Missing data is never an error: lookups that fail resolve to `null`.
//! Only configuration mistakes and collaborator failures end up here.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A selector or DOM path expression that cannot be tokenized
    #[error("invalid selector `{selector}`: {reason}")]
    SelectorSyntax { selector: String, reason: String },

    /// Path generalization was asked to fold zero paths
    #[error("cannot generalize an empty set of paths")]
    EmptyInput,

    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn syntax(selector: &str, reason: impl Into<String>) -> Self {
        Error::SelectorSyntax {
            selector: selector.to_string(),
            reason: reason.into(),
        }
    }
}

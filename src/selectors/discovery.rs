//! Selector discovery from known values

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::locator::locate;
use crate::error::Result;
use crate::paths::generalize;

/// Outcome of looking up selectors by example values
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DiscoveredSelector {
    /// Concrete paths, one per occurrence
    Concrete(Vec<String>),
    /// Several occurrences of several values folded into one path
    Template(String),
}

impl DiscoveredSelector {
    /// Combine raw occurrence paths the way discovery does.
    ///
    /// Paths are only generalized when more than one value was searched for
    /// and more than one occurrence turned up.
    pub fn from_paths(paths: Vec<String>, value_count: usize, separator: char) -> Result<Self> {
        if value_count > 1 && paths.len() > 1 {
            let template = generalize(&paths, separator)?;
            debug!(occurrences = paths.len(), template = %template, "generalized selector");
            return Ok(DiscoveredSelector::Template(template));
        }
        Ok(DiscoveredSelector::Concrete(paths))
    }

    pub fn selectors(&self) -> Vec<&str> {
        match self {
            DiscoveredSelector::Concrete(paths) => paths.iter().map(String::as_str).collect(),
            DiscoveredSelector::Template(path) => vec![path.as_str()],
        }
    }

    pub fn first(&self) -> Option<&str> {
        self.selectors().first().copied()
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, DiscoveredSelector::Concrete(paths) if paths.is_empty())
    }
}

/// Find the selector(s) leading to `values` inside `tree`
pub fn discover_selector(tree: &Value, values: &[Value]) -> Result<DiscoveredSelector> {
    let paths: Vec<String> = values.iter().flat_map(|value| locate(tree, value)).collect();
    DiscoveredSelector::from_paths(paths, values.len(), '.')
}

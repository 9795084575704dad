//! HTML extraction modules
//!
//! Each structured data module turns one metadata format into a plain nested
//! tree that selectors can run against. `html_extractor` queries the DOM
//! directly by positional path.

mod html_extractor;
mod jsonld_extractor;
mod microdata_extractor;
mod opengraph_extractor;

pub use html_extractor::*;
pub use jsonld_extractor::*;
pub use microdata_extractor::*;
pub use opengraph_extractor::*;

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};
use crate::fetch::{fetch, FetchConfig};

/// Supported structured data formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Microdata,
    #[serde(alias = "og")]
    OpenGraph,
    #[serde(alias = "json-ld")]
    JsonLd,
}

impl Format {
    pub const ALL: [Format; 3] = [Format::Microdata, Format::OpenGraph, Format::JsonLd];

    pub fn name(&self) -> &'static str {
        match self {
            Format::Microdata => "microdata",
            Format::OpenGraph => "opengraph",
            Format::JsonLd => "jsonld",
        }
    }

    /// Extract this format from `html` as a normalized tree
    pub fn extract(&self, html: &str, base_url: Option<&Url>) -> Value {
        match self {
            Format::Microdata => extract_microdata(html, base_url),
            Format::OpenGraph => extract_opengraph(html),
            Format::JsonLd => extract_jsonld(html),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "microdata" => Ok(Format::Microdata),
            "opengraph" | "og" => Ok(Format::OpenGraph),
            "jsonld" | "json-ld" => Ok(Format::JsonLd),
            other => Err(Error::syntax(other, "unknown structured data format")),
        }
    }
}

/// Normalized structured data of one page, one tree per format
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SemanticData {
    url: Option<String>,
    data: IndexMap<Format, Value>,
}

impl SemanticData {
    /// Extract every supported format from `html`.
    /// `url` is used to resolve relative links and may be empty.
    pub fn from_html(html: &str, url: &str) -> Self {
        Self::with_formats(html, url, &Format::ALL)
    }

    pub fn with_formats(html: &str, url: &str, formats: &[Format]) -> Self {
        let base = Url::parse(url).ok();
        let data: IndexMap<Format, Value> = formats
            .iter()
            .map(|format| (*format, format.extract(html, base.as_ref())))
            .collect();

        debug!(
            url,
            formats = ?data.iter().map(|(f, v)| (f.name(), tree_size(v))).collect::<Vec<_>>(),
            "extracted structured data"
        );

        Self {
            url: (!url.is_empty()).then(|| url.to_string()),
            data,
        }
    }

    pub fn from_url(url: &str, config: &FetchConfig) -> Result<Self> {
        let html = fetch(url, config)?;
        Ok(Self::from_html(&html, url))
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn get(&self, format: Format) -> Option<&Value> {
        self.data.get(&format)
    }

    pub fn contains(&self, format: Format) -> bool {
        self.data.contains_key(&format)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Format, &Value)> {
        self.data.iter().map(|(f, v)| (*f, v))
    }

    /// All trees as one JSON object keyed by format name
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .data
            .iter()
            .map(|(f, v)| (f.name().to_string(), v.clone()))
            .collect();
        Value::Object(map)
    }
}

/// Insert under `key`. A repeated key turns the entry into a list.
pub(crate) fn push_value(map: &mut Map<String, Value>, key: &str, value: Value) {
    match map.get_mut(key) {
        Some(Value::Array(arr)) => arr.push(value),
        Some(existing) => {
            let old = existing.take();
            *existing = Value::Array(vec![old, value]);
        }
        None => {
            map.insert(key.to_string(), value);
        }
    }
}

fn tree_size(value: &Value) -> usize {
    value.as_object().map_or(0, Map::len)
}

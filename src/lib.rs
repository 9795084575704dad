//! Semantic selectors for HTML pages
//!
//! Pulls values out of structured page data with dotted path selectors, and
//! finds those selectors from example values:
//! - Microdata, OpenGraph and JSON-LD normalized into plain nested trees
//! - Selector compilation and matching with index and broadcast rules
//! - Reverse lookup of a value's path and generalization across siblings
//! - Positional path queries on the HTML DOM
//! - FFI interface for C/C++ hosts

pub mod error;
pub mod extractors;
pub mod fetch;
pub mod ffi;
pub mod paths;
pub mod selectors;

pub use error::{Error, Result};
pub use extractors::{Format, HtmlDocument, SemanticData};
pub use fetch::{fetch, FetchConfig};
pub use paths::{generalize, most_common};
pub use selectors::{
    apply, discover_selector, locate, ApplyMode, CompiledSelectors, DiscoveredSelector, Matched,
    ResultMap, SelectorMap, SemanticSelector,
};

//! Selector compilation
//!
//! Turns `{result key -> "a.b[0].c"}` into a prefix tree of segments. Nodes
//! where a selector ends carry the result keys to accumulate under.
//!
//! ```text
//! Breadcrumb
//!   ListItem[-1]
//!     name        -> product.category
//! Product
//!   Offer         -> product.offers
//!   name          -> product.name
//! ```

use indexmap::IndexMap;
use tracing::debug;

use super::segment::{parse_path, Segment};
use super::SelectorMap;
use crate::error::Result;

/// A node of the compiled selector trie
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectorNode {
    /// Parsed segment that leads to this node (`None` at the root)
    segment: Option<Segment>,
    /// Children keyed by their literal token, in insertion order
    children: IndexMap<String, SelectorNode>,
    /// Result keys of every selector ending here
    result_keys: Vec<String>,
}

impl SelectorNode {
    fn with_segment(segment: Segment) -> Self {
        SelectorNode {
            segment: Some(segment),
            ..Default::default()
        }
    }

    pub fn segment(&self) -> Option<&Segment> {
        self.segment.as_ref()
    }

    pub fn children(&self) -> impl Iterator<Item = &SelectorNode> {
        self.children.values()
    }

    pub fn child(&self, token: &str) -> Option<&SelectorNode> {
        self.children.get(token)
    }

    pub fn result_keys(&self) -> &[String] {
        &self.result_keys
    }

    fn insert(&mut self, segments: Vec<Segment>, result_key: &str) {
        let mut current = self;
        for segment in segments {
            current = current
                .children
                .entry(segment.to_string())
                .or_insert_with(|| SelectorNode::with_segment(segment));
        }
        if !current.result_keys.iter().any(|k| k == result_key) {
            current.result_keys.push(result_key.to_string());
        }
    }
}

/// Compiled selector trie
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledSelectors {
    root: SelectorNode,
}

impl CompiledSelectors {
    /// Compile a selector map. Entries with an empty selector are skipped.
    pub fn compile(selectors: &SelectorMap) -> Result<Self> {
        let mut compiled = CompiledSelectors::default();
        compiled.merge(selectors)?;
        Ok(compiled)
    }

    /// Extend the trie with more selectors.
    ///
    /// Every selector is validated before anything is inserted, so a syntax
    /// error leaves the trie untouched.
    pub fn merge(&mut self, selectors: &SelectorMap) -> Result<()> {
        let mut parsed = Vec::with_capacity(selectors.len());
        for (result_key, selector) in selectors {
            if selector.trim().is_empty() {
                continue;
            }
            parsed.push((result_key, parse_path(selector)?));
        }

        debug!(count = parsed.len(), "compiling selectors");
        for (result_key, segments) in parsed {
            self.root.insert(segments, result_key);
        }
        Ok(())
    }

    pub fn root(&self) -> &SelectorNode {
        &self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }
}

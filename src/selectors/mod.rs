//! Semantic data selectors
//!
//! Selectors are dotted paths into a normalized data tree, keyed by the name
//! the matched value should be reported under:
//!
//! ```text
//! {"product.name": "Product.name", "product.category": "BreadcrumbList.ListItem[-1].name"}
//! ```
//!
//! An index picks one element of a sequence (negative counts from the end).
//! Without an index, a sequence is broadcast and every element is visited;
//! repeated matches for the same key become a list.

mod compiler;
mod discovery;
mod locator;
mod matcher;
mod segment;

pub use compiler::*;
pub use discovery::*;
pub use locator::*;
pub use matcher::*;
pub use segment::*;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::error::Result;

/// Result key -> selector path
pub type SelectorMap = IndexMap<String, String>;

/// Whether `select` starts from an empty result or adds to the previous one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApplyMode {
    #[default]
    Clean,
    Accumulate,
}

/// Selector set bound to its compiled trie and a result accumulator
#[derive(Debug, Clone)]
pub struct SemanticSelector {
    selectors: SelectorMap,
    compiled: CompiledSelectors,
    result: ResultMap,
}

impl SemanticSelector {
    pub fn new(selectors: SelectorMap) -> Result<Self> {
        let compiled = CompiledSelectors::compile(&selectors)?;
        Ok(Self {
            selectors,
            compiled,
            result: ResultMap::new(),
        })
    }

    /// Run the selectors against `tree`
    pub fn select(&mut self, tree: &Value, mode: ApplyMode) {
        if mode == ApplyMode::Clean {
            self.result.clear();
        }
        apply(&self.compiled, tree, &mut self.result);
        debug!(matched = self.result.len(), ?mode, "selectors applied");
    }

    pub fn result(&self) -> ResultMap {
        self.result.clone()
    }

    pub fn clear_result(&mut self) {
        self.result.clear();
    }

    pub fn selectors(&self) -> &SelectorMap {
        &self.selectors
    }

    pub fn compiled(&self) -> &CompiledSelectors {
        &self.compiled
    }

    /// Replace every selector. The trie is rebuilt; accumulated results are kept.
    pub fn set_selectors(&mut self, selectors: SelectorMap) -> Result<()> {
        self.compiled = CompiledSelectors::compile(&selectors)?;
        self.selectors = selectors;
        Ok(())
    }

    /// Add or override selectors, then rebuild the trie
    pub fn update_selectors(&mut self, selectors: SelectorMap) -> Result<()> {
        let mut merged = self.selectors.clone();
        merged.extend(selectors);
        self.set_selectors(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(entries: &[(&str, &str)]) -> SelectorMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_clean_select_is_idempotent() {
        let tree = json!({"Product": {"name": "Lamp", "Offer": [{"price": 10}, {"price": 12}]}});
        let mut selector = SemanticSelector::new(map(&[
            ("product.name", "Product.name"),
            ("product.price", "Product.Offer.price"),
        ]))
        .unwrap();

        selector.select(&tree, ApplyMode::Clean);
        let first = selector.result();
        selector.select(&tree, ApplyMode::Clean);
        assert_eq!(selector.result(), first);
        assert_eq!(first.value("product.price"), Some(json!([10, 12])));
    }

    #[test]
    fn test_switch_selectors_and_accumulate() {
        let jsonld = json!({"Product": {"name": "Lamp"}});
        let microdata = json!({
            "BreadcrumbList": {"ListItem": [{"name": "Home"}, {"name": "Tafellamp"}]}
        });

        let mut selector = SemanticSelector::new(map(&[("product.name", "Product.name")])).unwrap();
        selector.select(&jsonld, ApplyMode::Clean);
        selector
            .set_selectors(map(&[("product.category", "BreadcrumbList.ListItem[-1].name")]))
            .unwrap();
        selector.select(&microdata, ApplyMode::Accumulate);

        let result = selector.result();
        assert_eq!(result.value("product.name"), Some(json!("Lamp")));
        assert_eq!(result.value("product.category"), Some(json!("Tafellamp")));
        assert_eq!(selector.selectors().len(), 1);
    }

    #[test]
    fn test_update_selectors_merges() {
        let mut selector = SemanticSelector::new(map(&[("name", "Product.name")])).unwrap();
        selector
            .update_selectors(map(&[("sku", "Product.sku"), ("name", "Product.title")]))
            .unwrap();

        assert_eq!(selector.selectors().len(), 2);
        selector.select(&json!({"Product": {"title": "T", "sku": "S"}}), ApplyMode::Clean);
        assert_eq!(selector.result().value("name"), Some(json!("T")));
        assert_eq!(selector.result().value("sku"), Some(json!("S")));
    }

    #[test]
    fn test_bad_selector_keeps_previous_set() {
        let mut selector = SemanticSelector::new(map(&[("name", "Product.name")])).unwrap();
        assert!(selector.set_selectors(map(&[("x", "a[")])).is_err());
        assert_eq!(selector.selectors().get("name").map(String::as_str), Some("Product.name"));
    }

    #[test]
    fn test_selector_map_from_json_config() {
        let selectors: SelectorMap =
            serde_json::from_str(r#"{"b": "x.b", "a": "x.a", "skip": ""}"#).unwrap();
        let mut selector = SemanticSelector::new(selectors).unwrap();
        selector.select(&json!({"x": {"a": 1, "b": 2}}), ApplyMode::Clean);
        let keys: Vec<_> = selector.result().iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(keys, ["b", "a"]);
    }
}

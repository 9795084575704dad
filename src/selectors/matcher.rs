//! Selector matching
//!
//! Walks a compiled selector trie and a data tree side by side. Missing data
//! never fails: lookups that come up empty continue with `null` so every
//! selector below that point still reports an explicit `null`.

use indexmap::IndexMap;
use serde::ser::{Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::trace;

use super::compiler::{CompiledSelectors, SelectorNode};
use super::segment::Segment;

/// Value(s) accumulated under one result key
#[derive(Debug, Clone, PartialEq)]
pub enum Matched {
    Single(Value),
    /// Promoted on the second match, in encounter order
    Many(Vec<Value>),
}

impl Matched {
    pub fn to_value(&self) -> Value {
        match self {
            Matched::Single(v) => v.clone(),
            Matched::Many(values) => Value::Array(values.clone()),
        }
    }
}

/// Result key -> matched value(s), in first-match order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultMap {
    entries: IndexMap<String, Matched>,
}

impl ResultMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a match. A second match for the same key turns the entry into a list.
    pub fn push(&mut self, key: &str, value: Value) {
        match self.entries.get_mut(key) {
            Some(entry) => {
                let previous = std::mem::replace(entry, Matched::Many(Vec::new()));
                *entry = match previous {
                    Matched::Single(first) => Matched::Many(vec![first, value]),
                    Matched::Many(mut values) => {
                        values.push(value);
                        Matched::Many(values)
                    }
                };
            }
            None => {
                self.entries.insert(key.to_string(), Matched::Single(value));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Matched> {
        self.entries.get(key)
    }

    /// JSON view of one entry
    pub fn value(&self, key: &str) -> Option<Value> {
        self.entries.get(key).map(Matched::to_value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Matched)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .entries
            .iter()
            .map(|(k, m)| (k.clone(), m.to_value()))
            .collect();
        Value::Object(map)
    }
}

impl Serialize for ResultMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Apply compiled selectors to `tree`, accumulating into `result`
pub fn apply(selectors: &CompiledSelectors, tree: &Value, result: &mut ResultMap) {
    visit(selectors.root(), Some(tree), result);
}

fn visit(node: &SelectorNode, data: Option<&Value>, result: &mut ResultMap) {
    let data = data.filter(|v| !v.is_null());

    for key in node.result_keys() {
        trace!(key = %key, found = data.is_some(), "selector matched");
        result.push(key, data.cloned().unwrap_or(Value::Null));
    }

    for child in node.children() {
        let Some(segment) = child.segment() else {
            continue;
        };
        match data {
            // An empty sequence reports its selectors like missing data
            Some(Value::Array(items)) if items.is_empty() => visit(child, None, result),
            // Fan out over every element, unless the segment picks by index
            Some(Value::Array(items)) if segment.index.is_none() => {
                for item in items {
                    visit(child, lookup(segment, item), result);
                }
            }
            Some(value) => visit(child, lookup(segment, value), result),
            None => visit(child, None, result),
        }
    }
}

fn lookup<'a>(segment: &Segment, value: &'a Value) -> Option<&'a Value> {
    let found = value.as_object()?.get(&segment.name)?;
    match segment.index {
        None => Some(found),
        Some(index) => {
            let items = found.as_array()?;
            items.get(Segment::resolve_index(index, items.len())?)
        }
    }
}

//! HTML document queries by positional path
//!
//! Paths are absolute chains of tag names with optional 1-based positions,
//! the shape produced by [`HtmlDocument::locate_path`]:
//!
//! ```text
//! /html/body/div[2]/ul/li[1]/a
//! ```
//!
//! A step without a position selects every child with that tag, so a
//! generalized path like `/html/body/div[2]/ul/li/a` returns all links.
//! A negative position counts from the last sibling.

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::error::{Error, Result};
use crate::fetch::{fetch, FetchConfig};
use crate::selectors::{DiscoveredSelector, Segment};

/// Parsed HTML document
pub struct HtmlDocument {
    document: Html,
}

impl HtmlDocument {
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    pub fn from_url(url: &str, config: &FetchConfig) -> Result<Self> {
        Ok(Self::parse(&fetch(url, config)?))
    }

    /// Elements matching a positional path, in document order
    pub fn extract(&self, path: &str) -> Result<Vec<ElementRef<'_>>> {
        let steps = parse_dom_path(path)?;
        let Some((first, rest)) = steps.split_first() else {
            return Ok(Vec::new());
        };

        let root = self.document.root_element();
        let mut current = select_step(std::iter::once(root), first);

        for step in rest {
            current = current
                .into_iter()
                .flat_map(|el| select_step(el.children().filter_map(ElementRef::wrap), step))
                .collect();
        }
        Ok(current)
    }

    /// Leading text of every matching element
    pub fn extract_text(&self, path: &str, strip: bool) -> Result<Vec<String>> {
        Ok(self
            .extract(path)?
            .iter()
            .map(|el| {
                let text = leading_text(el);
                if strip {
                    text.trim().to_string()
                } else {
                    text
                }
            })
            .collect())
    }

    /// Positional path of an element. Positions are only written when same-tag siblings exist.
    pub fn locate_path(&self, element: &ElementRef) -> String {
        let mut steps = Vec::new();
        let mut current = Some(*element);

        while let Some(el) = current {
            let name = el.value().name();
            let parent = el.parent().and_then(ElementRef::wrap);
            let siblings: Vec<ElementRef> = match el.parent() {
                Some(parent_node) => parent_node
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|s| s.value().name() == name)
                    .collect(),
                None => vec![el],
            };

            if siblings.len() > 1 {
                let position = siblings.iter().position(|s| s.id() == el.id()).unwrap_or(0) + 1;
                steps.push(format!("{}[{}]", name, position));
            } else {
                steps.push(name.to_string());
            }
            current = parent;
        }

        steps.reverse();
        format!("/{}", steps.join("/"))
    }

    /// Paths of elements whose leading text equals one of `values`.
    ///
    /// Several values with several hits are folded into one template path.
    pub fn paths_from_value(&self, values: &[&str]) -> Result<DiscoveredSelector> {
        let mut paths = Vec::new();
        for value in values {
            let value = value.trim();
            for el in self.elements() {
                if leading_text(&el).trim() == value {
                    paths.push(self.locate_path(&el));
                }
            }
        }
        debug!(values = values.len(), hits = paths.len(), "located elements by text");
        DiscoveredSelector::from_paths(paths, values.len(), '/')
    }

    /// Trimmed text of elements matching a CSS selector
    pub fn extract_css_text(&self, selector_str: &str) -> Result<Vec<String>> {
        let selector = Selector::parse(selector_str)
            .map_err(|e| Error::syntax(selector_str, e.to_string()))?;

        Ok(self
            .document
            .select(&selector)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .collect())
    }

    fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> {
        self.document
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
    }
}

fn select_step<'a>(
    candidates: impl Iterator<Item = ElementRef<'a>>,
    step: &Segment,
) -> Vec<ElementRef<'a>> {
    let matching: Vec<ElementRef<'a>> = candidates
        .filter(|el| el.value().name() == step.name)
        .collect();

    match step.index {
        None => matching,
        Some(position) => {
            // 1-based from the front, -1 is the last sibling
            let index = if position > 0 { position - 1 } else { position };
            Segment::resolve_index(index, matching.len())
                .map(|ix| vec![matching[ix]])
                .unwrap_or_default()
        }
    }
}

/// Text before the first child element
fn leading_text(element: &ElementRef) -> String {
    element
        .children()
        .map_while(|node| node.value().as_text().map(|t| t.text.to_string()))
        .collect()
}

fn parse_dom_path(path: &str) -> Result<Vec<Segment>> {
    let Some(body) = path.strip_prefix('/') else {
        return Err(Error::syntax(path, "path must be absolute"));
    };

    body.split('/')
        .map(|step| {
            let segment = Segment::parse(step, path)?;
            let valid_name = segment
                .name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
            if !valid_name {
                return Err(Error::syntax(path, format!("unsupported step `{}`", step)));
            }
            if segment.index == Some(0) {
                return Err(Error::syntax(path, "positions start at 1"));
            }
            Ok(segment)
        })
        .collect()
}

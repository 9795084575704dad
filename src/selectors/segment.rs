//! Selector path segments: `name`, `Offer[0]`, `ListItem[-1]`

use std::fmt;

use crate::error::{Error, Result};

/// One parsed step of a selector path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment {
    pub name: String,
    pub index: Option<i64>,
}

impl Segment {
    /// Parse a single segment. `selector` is only used for error messages.
    pub fn parse(token: &str, selector: &str) -> Result<Self> {
        if token.is_empty() {
            return Err(Error::syntax(selector, "empty path segment"));
        }

        let Some(open) = token.find('[') else {
            if token.contains(']') {
                return Err(Error::syntax(selector, format!("unbalanced `]` in `{}`", token)));
            }
            return Ok(Segment {
                name: token.to_string(),
                index: None,
            });
        };

        let name = &token[..open];
        let rest = &token[open + 1..];
        let Some(inner) = rest.strip_suffix(']') else {
            return Err(Error::syntax(selector, format!("unbalanced `[` in `{}`", token)));
        };
        if name.is_empty() {
            return Err(Error::syntax(selector, format!("missing name before index in `{}`", token)));
        }
        if inner.contains('[') || inner.contains(']') {
            return Err(Error::syntax(selector, format!("nested brackets in `{}`", token)));
        }
        let index = inner
            .parse::<i64>()
            .map_err(|_| Error::syntax(selector, format!("index `{}` is not an integer", inner)))?;

        Ok(Segment {
            name: name.to_string(),
            index: Some(index),
        })
    }

    /// Resolve a signed index against a sequence length, negatives counting from the end
    pub fn resolve_index(index: i64, len: usize) -> Option<usize> {
        let resolved = if index < 0 {
            len as i64 + index
        } else {
            index
        };
        if resolved >= 0 && (resolved as usize) < len {
            Some(resolved as usize)
        } else {
            None
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(ix) => write!(f, "{}[{}]", self.name, ix),
            None => f.write_str(&self.name),
        }
    }
}

/// Split a dotted selector into segments
pub fn parse_path(selector: &str) -> Result<Vec<Segment>> {
    selector
        .split('.')
        .map(|token| Segment::parse(token, selector))
        .collect()
}

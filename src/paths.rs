//! Path generalization
//!
//! Folds several concrete paths that only differ in their bracket indices
//! into one template path, e.g. `ul/li[1]/form` + `ul/li[2]/form` -> `ul/li/form`.

use std::collections::HashMap;
use std::hash::Hash;

use crate::error::{Error, Result};

/// Most frequent item, ties going to the one seen first
pub fn most_common<T, I>(items: I) -> Option<T>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    // (count, first position) per distinct item
    let mut counts: HashMap<T, (usize, usize)> = HashMap::new();
    for (pos, item) in items.into_iter().enumerate() {
        counts.entry(item).or_insert((0, pos)).0 += 1;
    }

    counts
        .into_iter()
        .max_by(|(_, (ca, pa)), (_, (cb, pb))| ca.cmp(cb).then(pb.cmp(pa)))
        .map(|(item, _)| item)
}

/// Strip a trailing `[..]` suffix: `li[2]` -> `li`
pub fn base_token(segment: &str) -> &str {
    match segment.find('[') {
        Some(pos) => &segment[..pos],
        None => segment,
    }
}

/// Generalize a set of concrete paths into a single template path.
///
/// Only paths with the most common segment count take part in the vote.
/// At each position the dominant base token wins; its index is kept when
/// every voter carrying that base token agrees on the full segment.
pub fn generalize<S: AsRef<str>>(paths: &[S], separator: char) -> Result<String> {
    let split: Vec<Vec<&str>> = paths
        .iter()
        .map(|p| p.as_ref().split(separator).collect())
        .collect();

    let common_length = most_common(split.iter().map(Vec::len)).ok_or(Error::EmptyInput)?;
    let split: Vec<Vec<&str>> = split
        .into_iter()
        .filter(|segments| segments.len() == common_length)
        .collect();

    let mut template: Vec<&str> = Vec::with_capacity(common_length);
    for i in 0..common_length {
        let winner = most_common(split.iter().map(|segments| base_token(segments[i])))
            .ok_or(Error::EmptyInput)?;

        let mut full: Vec<&str> = Vec::new();
        for segments in &split {
            let segment = segments[i];
            if base_token(segment) == winner && !full.contains(&segment) {
                full.push(segment);
            }
        }

        match full.as_slice() {
            [only] => template.push(*only),
            _ => template.push(winner),
        }
    }

    let separator = separator.to_string();
    Ok(template.join(&separator))
}

//! Reduction of candidate paths to a minimal covering set

use serde::Serialize;
use std::cmp::Ordering;

/// Sorted, non-redundant list of absolute host paths to bind-mount.
///
/// No element equals another or lies below another. Built fresh for each
/// run; it is never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MountSet(Vec<String>);

impl MountSet {
    /// Reduce `paths` to the minimal set of directories covering all of them.
    ///
    /// Paths must not carry a trailing separator. `/foo` covers `/foo` and
    /// `/foo/bar` but not `/foobar`. The result is sorted lexicographically
    /// and reducing it again yields the same set.
    pub fn reduce<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut candidates: Vec<String> = paths.into_iter().map(Into::into).collect();
        if candidates.len() <= 1 {
            return Self(candidates);
        }

        // Ordering the separator before every other byte keeps a directory's
        // descendants directly after it: "/a", "/a/c", "/a-b".
        candidates.sort_by(|a, b| separator_first(a, b));
        candidates.dedup();

        let mut kept: Vec<String> = Vec::with_capacity(candidates.len());
        for path in candidates {
            if kept.last().is_some_and(|last| covers(last, &path)) {
                continue;
            }
            kept.push(path);
        }

        kept.sort();
        Self(kept)
    }

    /// The mount paths, sorted
    pub fn paths(&self) -> &[String] {
        &self.0
    }

    /// Iterate over the mount paths
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume the set, returning the sorted paths
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl<'a> IntoIterator for &'a MountSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn separator_first(a: &str, b: &str) -> Ordering {
    let key = |s: &str| s.bytes().map(|b| if b == b'/' { 0 } else { b }).collect::<Vec<u8>>();
    key(a).cmp(&key(b))
}

/// Whether mounting `parent` already makes `path` visible
fn covers(parent: &str, path: &str) -> bool {
    match path.strip_prefix(parent) {
        Some("") => true,
        // "/" is the only retained path that ends in a separator
        Some(rest) => parent.ends_with('/') || rest.starts_with('/'),
        None => false,
    }
}

//! Option sets
//!
//! A node's options are the union of its own declarations and those of
//! every attached plugin, combined with [`Options::merge`].

use crate::option::OptionSpec;
use std::collections::btree_map::{self, BTreeMap};

/// Mapping from option key to option descriptor, unique per node
#[derive(Debug, Clone, Default)]
pub struct Options(BTreeMap<String, OptionSpec>);

impl Options {
    pub fn new() -> Self {
        Options(BTreeMap::new())
    }

    /// Add an option, replacing any previous one with the same key
    pub fn with(mut self, key: impl Into<String>, option: OptionSpec) -> Self {
        self.0.insert(key.into(), option);
        self
    }

    /// Combine two option sets into a new one
    ///
    /// Keys present in both take the descriptor from `other` (last write wins).
    /// Neither input is modified.
    pub fn merge(&self, other: &Options) -> Options {
        let mut merged = self.0.clone();
        for (key, option) in &other.0 {
            merged.insert(key.clone(), option.clone());
        }
        Options(merged)
    }

    pub fn get(&self, key: &str) -> Option<&OptionSpec> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, OptionSpec> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, OptionSpec)> for Options {
    fn from_iter<I: IntoIterator<Item = (K, OptionSpec)>>(iter: I) -> Self {
        Options(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<'a> IntoIterator for &'a Options {
    type Item = (&'a String, &'a OptionSpec);
    type IntoIter = btree_map::Iter<'a, String, OptionSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

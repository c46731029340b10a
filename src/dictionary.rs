//! Public field name <-> storage path mapping.
//!
//! Public names are what HTTP clients send (`vehicle.year`); storage paths are
//! what the document store holds (`car.year`). Lookups that miss return `None`
//! and each call site picks its own fallback.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct Dictionary {
    forward: BTreeMap<String, String>,
    inverse: BTreeMap<String, String>,
}

impl Dictionary {
    /// Builds a dictionary from `(public, storage)` pairs. Duplicate public
    /// names keep the last storage path given.
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let forward: BTreeMap<String, String> =
            entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        let inverse = Self::invert(&forward);
        Self { forward, inverse }
    }

    /// Reverses a public -> storage map. When two public names share a
    /// storage path the one iterated last wins.
    #[must_use]
    pub fn invert(map: &BTreeMap<String, String>) -> BTreeMap<String, String> {
        map.iter().map(|(public, storage)| (storage.clone(), public.clone())).collect()
    }

    #[must_use]
    pub fn resolve(&self, public: &str) -> Option<&str> {
        self.forward.get(public).map(String::as_str)
    }

    #[must_use]
    pub fn resolve_inverse(&self, storage: &str) -> Option<&str> {
        self.inverse.get(storage).map(String::as_str)
    }

    /// Storage path for `name`, or `name` itself when no entry exists.
    #[must_use]
    pub fn resolve_or_raw<'a>(&'a self, name: &'a str) -> &'a str {
        self.resolve(name).unwrap_or(name)
    }

    /// Renames the keys of `map` to storage paths, keeping unmapped keys as-is.
    pub fn transform_keys<'v, V>(
        &self,
        map: impl IntoIterator<Item = (&'v String, &'v V)>,
    ) -> Vec<(String, &'v V)>
    where
        V: 'v,
    {
        map.into_iter().map(|(k, v)| (self.resolve_or_raw(k).to_owned(), v)).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.forward.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl From<BTreeMap<String, String>> for Dictionary {
    fn from(forward: BTreeMap<String, String>) -> Self {
        let inverse = Self::invert(&forward);
        Self { forward, inverse }
    }
}

impl From<Dictionary> for BTreeMap<String, String> {
    fn from(dictionary: Dictionary) -> Self {
        dictionary.forward
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Dictionary {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(iter)
    }
}

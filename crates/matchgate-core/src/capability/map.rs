//! # Capability Map
//!
//! Immutable snapshot of derived capabilities for one fact set.

use super::Capability;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Capability name → allowed.
///
/// Keyed by string because server overrides can add names outside the base
/// set. BTreeMap keeps iteration and serialization order deterministic.
/// There are no mutators: a new derivation produces a new map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityMap(BTreeMap<String, bool>);

impl CapabilityMap {
    /// Value stored for `name`, if the key exists.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<bool> {
        self.0.get(name).copied()
    }

    /// Check whether `name` is allowed. Missing keys are denied.
    #[must_use]
    pub fn allows(&self, name: &str) -> bool {
        self.get(name).unwrap_or(false)
    }

    /// Check a base capability.
    #[must_use]
    pub fn allows_capability(&self, capability: Capability) -> bool {
        self.allows(capability.as_str())
    }

    /// Names of allowed capabilities, in key order.
    pub fn granted(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .filter(|(_, allowed)| **allowed)
            .map(|(name, _)| name.as_str())
    }

    /// Names of denied capabilities, in key order.
    pub fn denied(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .filter(|(_, allowed)| !**allowed)
            .map(|(name, _)| name.as_str())
    }

    /// Iterate over all entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.0.iter().map(|(name, allowed)| (name.as_str(), *allowed))
    }

    /// Check if the key exists, regardless of its value.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the underlying map.
    #[must_use]
    pub fn as_map(&self) -> &BTreeMap<String, bool> {
        &self.0
    }

    /// Consume the snapshot and return the underlying map.
    #[must_use]
    pub fn into_inner(self) -> BTreeMap<String, bool> {
        self.0
    }
}

/// Later entries win, matching the stage overwrite semantics.
impl FromIterator<(String, bool)> for CapabilityMap {
    fn from_iter<I: IntoIterator<Item = (String, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for CapabilityMap {
    type Item = (String, bool);
    type IntoIter = std::collections::btree_map::IntoIter<String, bool>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

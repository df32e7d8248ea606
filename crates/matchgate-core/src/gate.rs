//! # Capability Gate
//!
//! Callers gate buttons and routes on a [`CapabilityMap`]. A gate is the set
//! of capabilities an action requires; checking it reports every missing
//! capability at once.

use crate::capability::{Capability, CapabilityMap};
use crate::types::MatchgateError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A set of required capability names.
///
/// Names are trimmed and blank names dropped on construction, including when
/// the gate is deserialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct CapabilityGate {
    required: BTreeSet<String>,
}

impl CapabilityGate {
    /// Create a gate from capability names.
    ///
    /// Surrounding whitespace is trimmed, blank names are dropped and
    /// duplicates collapse. Capability keys themselves stay case-sensitive.
    #[must_use]
    pub fn new<I, S>(required: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            required: required
                .into_iter()
                .map(|name| name.as_ref().trim().to_string())
                .filter(|name| !name.is_empty())
                .collect(),
        }
    }

    /// Create a gate from base capabilities.
    #[must_use]
    pub fn for_capabilities(required: &[Capability]) -> Self {
        Self::new(required.iter().map(Capability::as_str))
    }

    /// Required names, sorted.
    pub fn required(&self) -> impl Iterator<Item = &str> {
        self.required.iter().map(String::as_str)
    }

    /// Required capabilities the map does not allow, sorted.
    #[must_use]
    pub fn missing(&self, map: &CapabilityMap) -> Vec<String> {
        self.required
            .iter()
            .filter(|name| !map.allows(name))
            .cloned()
            .collect()
    }

    /// Check the gate against a map.
    pub fn check(&self, map: &CapabilityMap) -> Result<(), MatchgateError> {
        let missing = self.missing(map);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(MatchgateError::CapabilityDenied(missing))
        }
    }

    /// Check if the gate requires nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.required.is_empty()
    }
}

impl From<Vec<String>> for CapabilityGate {
    fn from(required: Vec<String>) -> Self {
        Self::new(required)
    }
}

impl From<CapabilityGate> for Vec<String> {
    fn from(gate: CapabilityGate) -> Self {
        gate.required.into_iter().collect()
    }
}

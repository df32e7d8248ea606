//! # Core Type Definitions
//!
//! This module contains the input type and the error type shared by the
//! Matchgate engine:
//! - Raw member facts (`RawFacts`)
//! - Error types (`MatchgateError`)
//!
//! ## Totality
//!
//! `RawFacts` can be built from ANY JSON value. A value that is not an object
//! simply yields an empty mapping, so everything downstream of it stays total.
//! Only parsing JSON *text* can fail.

use crate::primitives::CAPABILITIES_KEY;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

// =============================================================================
// RAW FACTS
// =============================================================================

/// Untyped account/billing/verification/role facts about one member.
///
/// Assembled by the caller from a session and/or a server response. Keys and
/// values are taken as-is; spelling and casing are sorted out by the
/// normalizer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RawFacts(Map<String, Value>);

impl RawFacts {
    /// Create an empty set of facts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build facts from any JSON value. Non-objects yield empty facts.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    /// Parse facts from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, MatchgateError> {
        serde_json::from_str::<Value>(text)
            .map(Self::from_value)
            .map_err(|e| MatchgateError::InvalidFacts(e.to_string()))
    }

    /// Builder-style insert, mostly for tests and callers assembling facts by hand.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Raw value stored under `key`, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// First non-null value among `keys`, in the given order.
    #[must_use]
    pub fn first_present(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter()
            .filter_map(|key| self.0.get(*key))
            .find(|value| !value.is_null())
    }

    /// String entries of the `capabilities` array, in order.
    ///
    /// Non-string entries are dropped; a missing or non-array value yields
    /// an empty list.
    #[must_use]
    pub fn override_capabilities(&self) -> Vec<String> {
        match self.0.get(CAPABILITIES_KEY) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Number of top-level keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if no facts were supplied at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Value> for RawFacts {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

impl From<Map<String, Value>> for RawFacts {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<'de> Deserialize<'de> for RawFacts {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur around the Matchgate engine.
///
/// Normalization and derivation themselves never fail. These variants cover
/// the edges: parsing input text, gate checks, configuration and I/O.
#[derive(Debug, Error)]
pub enum MatchgateError {
    /// The supplied facts are not valid JSON text.
    #[error("Invalid facts: {0}")]
    InvalidFacts(String),

    /// A gate required capabilities the member does not hold.
    #[error("Capability denied: missing {}", .0.join(", "))]
    CapabilityDenied(Vec<String>),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Configuration could not be loaded or is inconsistent.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================

//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.
//!
//! Fact bodies are plain [`RawFacts`] objects and normalized facts,
//! capability maps and traces are returned in their core serialization, so
//! only the envelopes live here.

use matchgate_core::{Capability, CapabilityMap, RawFacts};
use serde::{Deserialize, Serialize};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// CATALOG RESPONSE
// =============================================================================

/// One base capability in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub description: String,
    pub survives_deletion: bool,
}

impl From<Capability> for CatalogEntry {
    fn from(capability: Capability) -> Self {
        Self {
            name: capability.as_str().to_string(),
            description: capability.description().to_string(),
            survives_deletion: capability.survives_deletion(),
        }
    }
}

/// Base capability catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogResponse {
    pub capabilities: Vec<CatalogEntry>,
}

impl Default for CatalogResponse {
    fn default() -> Self {
        Self {
            capabilities: Capability::ALL.into_iter().map(CatalogEntry::from).collect(),
        }
    }
}

// =============================================================================
// DERIVE RESPONSE
// =============================================================================

/// Derived capabilities for one fact set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilitiesResponse {
    pub capabilities: CapabilityMap,
}

// =============================================================================
// CHECK REQUEST/RESPONSE
// =============================================================================

/// Gate check request: facts plus the capabilities an action requires.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckRequest {
    #[serde(default)]
    pub facts: RawFacts,
    #[serde(default)]
    pub require: Vec<String>,
}

/// Gate check result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResponse {
    pub allowed: bool,
    /// Required capabilities that are not allowed, sorted.
    pub missing: Vec<String>,
}

impl CheckResponse {
    pub fn from_missing(missing: Vec<String>) -> Self {
        Self {
            allowed: missing.is_empty(),
            missing,
        }
    }
}

// =============================================================================
// ERROR RESPONSE
// =============================================================================

/// Generic error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}

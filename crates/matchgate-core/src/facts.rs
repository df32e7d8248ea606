//! # Fact Normalizer
//!
//! Folds [`RawFacts`] into [`NormalizedFacts`]: four canonical dimensions and
//! the ordered list of server overrides.
//!
//! Each dimension is read from the first non-null of its alternate keys
//! (see [`crate::primitives`]), coerced to a string, trimmed, lower-cased and
//! mapped through the synonym table in [`crate::vocabulary`]. Normalization
//! never fails; bad input degrades to absent dimensions.

use crate::primitives::{ACCOUNT_KEYS, BILLING_KEYS, ROLE_KEYS, VERIFICATION_KEYS};
use crate::types::RawFacts;
use crate::vocabulary::{
    AccountStatus, BillingStatus, Role, VerificationStatus, canonical_token, display_token,
    optional_dimension,
};
use serde::{Deserialize, Serialize};

/// Canonical view of one member's facts.
///
/// `None` means the dimension was missing or explicitly unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedFacts {
    #[serde(default, deserialize_with = "optional_dimension")]
    pub account: Option<AccountStatus>,
    #[serde(default, deserialize_with = "optional_dimension")]
    pub billing: Option<BillingStatus>,
    #[serde(default, deserialize_with = "optional_dimension")]
    pub verification: Option<VerificationStatus>,
    #[serde(default, deserialize_with = "optional_dimension")]
    pub role: Option<Role>,
    /// Server overrides, in the order supplied. Not deduplicated.
    #[serde(default)]
    pub capabilities: Vec<String>,
}

impl NormalizedFacts {
    /// Role used for decisions: absent roles act as guests.
    #[must_use]
    pub fn effective_role(&self) -> Role {
        self.role.clone().unwrap_or(Role::Guest)
    }
}

/// Normalize raw facts. Pure and total.
#[must_use]
pub fn normalize_user_facts(raw: &RawFacts) -> NormalizedFacts {
    NormalizedFacts {
        account: dimension_token(raw, ACCOUNT_KEYS).map(|t| AccountStatus::from_token(&t)),
        billing: dimension_token(raw, BILLING_KEYS).map(|t| BillingStatus::from_token(&t)),
        verification: dimension_token(raw, VERIFICATION_KEYS)
            .map(|t| VerificationStatus::from_token(&t)),
        role: dimension_token(raw, ROLE_KEYS).map(|t| Role::from_token(&t)),
        capabilities: raw.override_capabilities(),
    }
}

/// Canonical token for one dimension, or `None` when unknown.
fn dimension_token(raw: &RawFacts, keys: &[&str]) -> Option<String> {
    raw.first_present(keys)
        .map(display_token)
        .and_then(|token| canonical_token(&token))
}

// =============================================================================
// TESTS
// =============================================================================

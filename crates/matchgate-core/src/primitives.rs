//! # Fact Keys and Sentinels
//!
//! Fixed lookup tables for the Fact Normalizer.
//!
//! Upstream services disagree on what to call each dimension, so every
//! dimension is looked up under several alternate keys. The first key that
//! holds a non-null value wins; the order of each list is the priority order.

/// Keys that may carry the account lifecycle status.
pub const ACCOUNT_KEYS: &[&str] = &["account", "account_status", "status", "lifecycle"];

/// Keys that may carry the billing / subscription status.
pub const BILLING_KEYS: &[&str] = &[
    "billing",
    "billing_status",
    "subscription_status",
    "plan_status",
];

/// Keys that may carry the identity verification status.
pub const VERIFICATION_KEYS: &[&str] = &[
    "verification",
    "verification_status",
    "identity_status",
    "kyc_status",
];

/// Keys that may carry the member role.
pub const ROLE_KEYS: &[&str] = &["role", "user_role", "member_role"];

/// Key holding the server-supplied capability overrides.
pub const CAPABILITIES_KEY: &str = "capabilities";

/// Sentinel for a dimension whose value is missing or unusable.
///
/// Never surfaces in [`crate::NormalizedFacts`]: a dimension that normalizes
/// to this token is reported as absent.
pub const UNKNOWN_TOKEN: &str = "unknown";

//! # Property-Based Tests
//!
//! Normalization and derivation invariants checked with proptest.

use matchgate_core::{
    Capability, RawFacts, derive_capabilities, normalize_user_facts, primitives::ACCOUNT_KEYS,
};
use proptest::collection::vec;
use proptest::prelude::*;
use proptest::sample::select;
use serde_json::json;

// =============================================================================
// SYNONYM TABLES
// =============================================================================

const ACCOUNT_SYNONYMS: &[(&str, &str)] = &[
    ("activated", "activated"),
    ("active", "activated"),
    ("visible", "activated"),
    ("available", "activated"),
    ("reactivated", "activated"),
    ("enabled", "activated"),
    ("open", "activated"),
    ("deactivated", "deactivated"),
    ("inactive", "deactivated"),
    ("hidden", "deactivated"),
    ("disabled", "deactivated"),
    ("suspended", "deactivated"),
    ("deleted", "deleted"),
    ("archived", "deleted"),
    ("removed", "deleted"),
    ("closed", "deleted"),
];

const BILLING_SYNONYMS: &[(&str, &str)] = &[
    ("paid", "paid"),
    ("active", "paid"),
    ("current", "paid"),
    ("good_standing", "paid"),
    ("trial", "trial"),
    ("trialing", "trial"),
    ("free_trial", "trial"),
    ("grace", "grace"),
    ("grace_period", "grace"),
    ("past_due", "past_due"),
    ("pastdue", "past_due"),
    ("overdue", "past_due"),
    ("unpaid", "unpaid"),
    ("none", "unpaid"),
    ("canceled", "unpaid"),
    ("cancelled", "unpaid"),
    ("expired", "unpaid"),
];

const VERIFICATION_SYNONYMS: &[(&str, &str)] = &[
    ("verified", "verified"),
    ("complete", "verified"),
    ("approved", "verified"),
    ("confirmed", "verified"),
    ("pending", "pending"),
    ("processing", "pending"),
    ("review", "pending"),
    ("unverified", "unverified"),
    ("incomplete", "unverified"),
    ("rejected", "unverified"),
    ("failed", "unverified"),
];

const ROLE_SYNONYMS: &[(&str, &str)] = &[
    ("superadmin", "admin"),
    ("owner", "admin"),
    ("administrator", "admin"),
    ("support", "support"),
    ("agent", "support"),
    ("moderator", "moderator"),
    ("mod", "moderator"),
    ("member", "user"),
    ("user", "user"),
    ("standard", "user"),
    ("guest", "guest"),
    ("anonymous", "guest"),
];

// =============================================================================
// STRATEGIES
// =============================================================================

/// Randomly re-case a word and pad it with whitespace.
fn spelling_variant(word: &'static str) -> impl Strategy<Value = String> {
    (
        vec(any::<bool>(), word.len()),
        select(vec!["", " ", "  ", "\t", "\n "]),
        select(vec!["", " ", "\t", " \n"]),
    )
        .prop_map(move |(upper, lead, trail)| {
            let body: String = word
                .chars()
                .zip(upper)
                .map(|(c, up)| if up { c.to_ascii_uppercase() } else { c })
                .collect();
            format!("{lead}{body}{trail}")
        })
}

fn synonym_case(table: &'static [(&'static str, &'static str)]) -> impl Strategy<Value = (String, &'static str)> {
    select(table).prop_flat_map(|(word, canonical)| {
        spelling_variant(word).prop_map(move |variant| (variant, canonical))
    })
}

/// Arbitrary raw value for a fact dimension.
fn raw_value() -> impl Strategy<Value = serde_json::Value> {
    prop_oneof![
        Just(serde_json::Value::Null),
        any::<bool>().prop_map(serde_json::Value::from),
        any::<i32>().prop_map(serde_json::Value::from),
        "[a-zA-Z_ ]{0,12}".prop_map(serde_json::Value::from),
        select(vec!["active", "deleted", "paid", "past_due", "unpaid", "pending", "verified", "owner", "mod"])
            .prop_map(serde_json::Value::from),
        Just(json!(["active"])),
        Just(json!({ "state": "active" })),
    ]
}

fn raw_facts() -> impl Strategy<Value = RawFacts> {
    (
        raw_value(),
        raw_value(),
        raw_value(),
        raw_value(),
        select(ACCOUNT_KEYS.to_vec()),
    )
        .prop_map(|(account, billing, verification, role, account_key)| {
            RawFacts::new()
                .with(account_key, account)
                .with("billing_status", billing)
                .with("verification", verification)
                .with("role", role)
        })
}

fn deleted_spelling() -> impl Strategy<Value = String> {
    select(vec!["deleted", "archived", "removed", "closed"]).prop_flat_map(spelling_variant)
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Every account synonym normalizes regardless of case and padding.
    #[test]
    fn account_synonyms_normalize((variant, canonical) in synonym_case(ACCOUNT_SYNONYMS)) {
        let facts = normalize_user_facts(&RawFacts::new().with("account", variant));
        prop_assert_eq!(facts.account.map(|a| a.as_str().to_string()), Some(canonical.to_string()));
    }

    /// Every billing synonym normalizes regardless of case and padding.
    #[test]
    fn billing_synonyms_normalize((variant, canonical) in synonym_case(BILLING_SYNONYMS)) {
        let facts = normalize_user_facts(&RawFacts::new().with("billing", variant));
        prop_assert_eq!(facts.billing.map(|b| b.as_str().to_string()), Some(canonical.to_string()));
    }

    /// Every verification synonym normalizes regardless of case and padding.
    #[test]
    fn verification_synonyms_normalize((variant, canonical) in synonym_case(VERIFICATION_SYNONYMS)) {
        let facts = normalize_user_facts(&RawFacts::new().with("verification_status", variant));
        prop_assert_eq!(
            facts.verification.map(|v| v.as_str().to_string()),
            Some(canonical.to_string())
        );
    }

    /// Every role synonym normalizes regardless of case and padding.
    #[test]
    fn role_synonyms_normalize((variant, canonical) in synonym_case(ROLE_SYNONYMS)) {
        let facts = normalize_user_facts(&RawFacts::new().with("role", variant));
        prop_assert_eq!(facts.role.map(|r| r.as_str().to_string()), Some(canonical.to_string()));
    }

    /// Unmapped tokens pass through trimmed and lower-cased.
    #[test]
    fn unmapped_tokens_pass_through(word in "[a-z]{3,10}x") {
        let facts = normalize_user_facts(&RawFacts::new().with("lifecycle", format!("  {}  ", word.to_uppercase())));
        prop_assert_eq!(facts.account.map(|a| a.as_str().to_string()), Some(word));
    }

    /// Same facts produce identical maps.
    #[test]
    fn derivation_is_idempotent(facts in raw_facts()) {
        prop_assert_eq!(derive_capabilities(&facts), derive_capabilities(&facts));
    }

    /// The base set is always present, whatever the input.
    #[test]
    fn base_keys_always_present(facts in raw_facts()) {
        let map = derive_capabilities(&facts);
        for capability in Capability::ALL {
            prop_assert!(map.contains(capability.as_str()));
        }
        prop_assert_eq!(map.len(), Capability::ALL.len());
    }

    /// Deleted accounts without overrides keep nothing but the two survivors.
    #[test]
    fn deletion_dominates(
        account in deleted_spelling(),
        rest in raw_facts()
    ) {
        let facts = rest
            .with("account", account)
            .with("capabilities", json!([]));
        let map = derive_capabilities(&facts);

        for (name, allowed) in map.iter() {
            if name != "accessAppShell" && name != "reactivateAccount" {
                prop_assert!(!allowed, "{} should be false", name);
            }
        }
    }

    /// Overrides are always true in the result, including brand-new keys.
    #[test]
    fn overrides_always_win(
        facts in raw_facts(),
        overrides in vec("[a-zA-Z]{1,16}", 0..6)
    ) {
        let facts = facts.with("capabilities", json!(overrides.clone()));
        let map = derive_capabilities(&facts);
        for name in &overrides {
            prop_assert!(map.allows(name));
        }
    }
}

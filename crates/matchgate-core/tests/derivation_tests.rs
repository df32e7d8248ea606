//! # Derivation Scenarios
//!
//! End-to-end checks of raw facts → capability map for representative members.

use matchgate_core::{
    AccountStatus, BillingStatus, Capability, RawFacts, Role, VerificationStatus,
    derive_capabilities, normalize_user_facts,
};
use serde_json::json;

fn raw(value: serde_json::Value) -> RawFacts {
    RawFacts::from_value(value)
}

// =============================================================================
// NORMALIZATION
// =============================================================================

#[test]
fn normalizes_alternate_keys_and_casing() {
    let facts = normalize_user_facts(&raw(json!({
        "account_status": "Active",
        "billing_status": "PastDue",
        "verification_status": "Pending",
        "role": "Support"
    })));

    assert_eq!(facts.account, Some(AccountStatus::Activated));
    assert_eq!(facts.billing, Some(BillingStatus::PastDue));
    assert_eq!(facts.verification, Some(VerificationStatus::Pending));
    assert_eq!(facts.role, Some(Role::Support));
}

#[test]
fn normalized_facts_serialize_to_tokens() {
    let facts = normalize_user_facts(&raw(json!({
        "account_status": "Active",
        "billing_status": "PastDue",
        "verification_status": "Pending",
        "role": "Support"
    })));
    let value = serde_json::to_value(&facts).expect("serialize");

    assert_eq!(value["account"], "activated");
    assert_eq!(value["billing"], "past_due");
    assert_eq!(value["verification"], "pending");
    assert_eq!(value["role"], "support");
}

// =============================================================================
// DERIVATION
// =============================================================================

#[test]
fn active_paying_verified_member() {
    let map = derive_capabilities(&raw(json!({
        "account": "activated",
        "billing": "paid",
        "verification": "verified",
        "role": "user"
    })));

    assert!(map.allows("browseDiscovery"));
    assert!(map.allows("sendMessage"));
    assert!(map.allows("accessPremium"));
    assert!(map.allows("editProfile"));
    assert!(!map.allows("reactivateAccount"));
    assert!(!map.allows("requestVerification"));
    assert!(!map.allows("manageUsers"));
}

#[test]
fn deactivated_member_can_read_but_not_respond() {
    let map = derive_capabilities(&raw(json!({
        "account": "deactivated",
        "billing": "paid",
        "verification": "verified",
        "role": "user"
    })));

    assert!(map.allows("viewMatchRequests"));
    assert!(!map.allows("respondToMatchRequests"));
    assert!(!map.allows("sendMessage"));
    assert!(map.allows("reactivateAccount"));
    assert!(map.allows("readMessages"));
}

#[test]
fn overrides_win_over_base_rules() {
    let map = derive_capabilities(&raw(json!({
        "account": "deactivated",
        "billing": "unpaid",
        "verification": "unverified",
        "role": "user",
        "capabilities": ["viewInsights", "sendMessage"]
    })));

    assert!(map.allows("viewInsights"));
    assert!(map.allows("sendMessage"));
    assert!(!map.allows("browseDiscovery"));
}

#[test]
fn past_due_moderator() {
    let map = derive_capabilities(&raw(json!({
        "account": "activated",
        "billing": "past_due",
        "verification": "verified",
        "role": "moderator"
    })));

    assert!(!map.allows("accessPremium"));
    assert!(!map.allows("sendMessage"));
    assert!(map.allows("assistMembers"));
    assert!(map.allows("overrideBlocks"));
    assert!(!map.allows("manageUsers"));
}

#[test]
fn deleted_member_keeps_only_shell_rule() {
    let map = derive_capabilities(&raw(json!({
        "account": "archived",
        "billing": "paid",
        "verification": "verified",
        "role": "superadmin"
    })));

    for capability in Capability::ALL {
        assert!(
            !map.allows_capability(capability),
            "{capability} should be denied for a deleted account"
        );
    }
    // Both survivors are still present as keys, just false for a deleted account.
    assert_eq!(map.get("accessAppShell"), Some(false));
    assert_eq!(map.get("reactivateAccount"), Some(false));
}

#[test]
fn deleted_member_override_restores_capability() {
    let map = derive_capabilities(&raw(json!({
        "account": "deleted",
        "capabilities": ["readMessages"]
    })));
    assert!(map.allows("readMessages"));
    assert!(!map.allows("viewMatchRequests"));
}

#[test]
fn every_base_key_is_present() {
    let map = derive_capabilities(&raw(json!({ "account": "frozen", "role": 42 })));
    for capability in Capability::ALL {
        assert!(map.contains(capability.as_str()), "missing {capability}");
    }
}

#[test]
fn admin_manages_users() {
    let map = derive_capabilities(&raw(json!({
        "account": "enabled",
        "role": "Administrator"
    })));
    assert!(map.allows("manageUsers"));
    assert!(map.allows("manageBilling"));
    assert!(map.allows("assistMembers"));
    assert!(!map.allows("accessPremium"));
}

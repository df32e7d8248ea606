//! # Capability Derivation
//!
//! Converts normalized facts into a complete [`CapabilityMap`].
//!
//! ## Post-Processing Order
//!
//! | Order | Stage | Fires when | Effect |
//! |-------|-------|------------|--------|
//! | 1 | `DeletionWipe` | account deleted | all false except `accessAppShell`, `reactivateAccount` |
//! | 2 | `VerificationPending` | verification pending | no responding or messaging; discovery and insights follow activation |
//! | 3 | `BillingUnpaid` | billing unpaid | `accessPremium` false |
//! | 4 | `ServerOverrides` | overrides supplied | each named key forced true |
//!
//! Each stage consumes the previous map and builds a new one; later stages
//! overwrite earlier ones for the same key. Stage 2 runs even after stage 1
//! has wiped a deleted account. The reset it performs there is redundant but
//! kept, so intermediate states stay identical for every caller.
//!
//! Unrecognized fact values fail every predicate, which yields the most
//! restrictive outcome for positive checks.

use super::{Capability, CapabilityMap};
use crate::facts::{NormalizedFacts, normalize_user_facts};
use crate::types::RawFacts;
use crate::vocabulary::{AccountStatus, BillingStatus, Role, VerificationStatus};
use serde::{Deserialize, Serialize};

// =============================================================================
// PREDICATES
// =============================================================================

/// Boolean facts the capability rules are written against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactPredicates {
    pub is_deleted: bool,
    pub is_activated: bool,
    pub is_deactivated: bool,
    pub is_verified: bool,
    pub is_verification_pending: bool,
    /// Paid, trial or grace.
    pub is_paid: bool,
    pub is_billing_past_due: bool,
    pub is_billing_unpaid: bool,
    pub is_admin: bool,
    pub is_support: bool,
    /// Moderator, admin or support.
    pub is_moderator: bool,
}

impl FactPredicates {
    /// Compute predicates from normalized facts. Absent roles act as guests.
    #[must_use]
    pub fn from_facts(facts: &NormalizedFacts) -> Self {
        let role = facts.effective_role();

        Self {
            is_deleted: facts.account == Some(AccountStatus::Deleted),
            is_activated: facts.account == Some(AccountStatus::Activated),
            is_deactivated: facts.account == Some(AccountStatus::Deactivated),
            is_verified: facts.verification == Some(VerificationStatus::Verified),
            is_verification_pending: facts.verification == Some(VerificationStatus::Pending),
            is_paid: facts
                .billing
                .as_ref()
                .is_some_and(BillingStatus::is_in_good_standing),
            is_billing_past_due: facts.billing == Some(BillingStatus::PastDue),
            is_billing_unpaid: facts.billing == Some(BillingStatus::Unpaid),
            is_admin: role == Role::Admin,
            is_support: role == Role::Support,
            is_moderator: role.is_moderator(),
        }
    }
}

// =============================================================================
// POST-PROCESSING STAGES
// =============================================================================

/// Post-processing stages, applied strictly in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostProcessStage {
    DeletionWipe,
    VerificationPending,
    BillingUnpaid,
    ServerOverrides,
}

impl PostProcessStage {
    /// Every stage, in application order.
    pub const ORDER: [PostProcessStage; 4] = [
        PostProcessStage::DeletionWipe,
        PostProcessStage::VerificationPending,
        PostProcessStage::BillingUnpaid,
        PostProcessStage::ServerOverrides,
    ];

    /// Get the stage name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            PostProcessStage::DeletionWipe => "Deletion Wipe",
            PostProcessStage::VerificationPending => "Verification Pending",
            PostProcessStage::BillingUnpaid => "Billing Unpaid",
            PostProcessStage::ServerOverrides => "Server Overrides",
        }
    }

    /// Check whether this stage fires for the given facts.
    #[must_use]
    pub fn fires(&self, predicates: &FactPredicates, facts: &NormalizedFacts) -> bool {
        match self {
            PostProcessStage::DeletionWipe => predicates.is_deleted,
            PostProcessStage::VerificationPending => predicates.is_verification_pending,
            PostProcessStage::BillingUnpaid => predicates.is_billing_unpaid,
            PostProcessStage::ServerOverrides => !facts.capabilities.is_empty(),
        }
    }

    /// Build the next map from `map`. Callers check [`Self::fires`] first.
    #[must_use]
    fn apply(
        &self,
        map: CapabilityMap,
        predicates: &FactPredicates,
        overrides: &[String],
    ) -> CapabilityMap {
        match self {
            PostProcessStage::DeletionWipe => map
                .into_iter()
                .map(|(name, allowed)| {
                    let survives =
                        Capability::from_name(&name).is_some_and(|c| c.survives_deletion());
                    (name, survives && allowed)
                })
                .collect(),
            PostProcessStage::VerificationPending => overwrite(
                map,
                [
                    (Capability::RespondToMatchRequests, false),
                    (Capability::SendMessage, false),
                    (Capability::BrowseDiscovery, predicates.is_activated),
                    (Capability::ViewInsights, predicates.is_activated),
                ],
            ),
            PostProcessStage::BillingUnpaid => {
                overwrite(map, [(Capability::AccessPremium, false)])
            }
            PostProcessStage::ServerOverrides => map
                .into_iter()
                .chain(overrides.iter().map(|name| (name.clone(), true)))
                .collect(),
        }
    }
}

impl std::fmt::Display for PostProcessStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// New map with `entries` replacing the values of existing keys.
fn overwrite<const N: usize>(
    map: CapabilityMap,
    entries: [(Capability, bool); N],
) -> CapabilityMap {
    map.into_iter()
        .chain(
            entries
                .into_iter()
                .map(|(capability, allowed)| (capability.as_str().to_string(), allowed)),
        )
        .collect()
}

/// Base table: every base capability, evaluated from predicates.
fn base_table(predicates: &FactPredicates) -> CapabilityMap {
    Capability::ALL
        .into_iter()
        .map(|capability| {
            (
                capability.as_str().to_string(),
                capability.base_rule(predicates),
            )
        })
        .collect()
}

// =============================================================================
// DERIVATION
// =============================================================================

/// Full record of one derivation, for explaining a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Derivation {
    pub facts: NormalizedFacts,
    pub predicates: FactPredicates,
    /// Stages that fired, in application order.
    pub stages: Vec<PostProcessStage>,
    pub capabilities: CapabilityMap,
}

impl Derivation {
    /// Run the deriver over normalized facts.
    #[must_use]
    pub fn run(facts: NormalizedFacts) -> Self {
        let predicates = FactPredicates::from_facts(&facts);

        let stages: Vec<PostProcessStage> = PostProcessStage::ORDER
            .into_iter()
            .filter(|stage| stage.fires(&predicates, &facts))
            .collect();

        let capabilities = stages
            .iter()
            .fold(base_table(&predicates), |map, stage| {
                stage.apply(map, &predicates, &facts.capabilities)
            });

        Self {
            facts,
            predicates,
            stages,
            capabilities,
        }
    }

    /// Check if a stage fired during this derivation.
    #[must_use]
    pub fn fired(&self, stage: PostProcessStage) -> bool {
        self.stages.contains(&stage)
    }
}

/// Derive the capability map for raw facts. Pure and total.
#[must_use]
pub fn derive_capabilities(raw: &RawFacts) -> CapabilityMap {
    derive_from_normalized(&normalize_user_facts(raw))
}

/// Derive the capability map for facts that are already normalized.
#[must_use]
pub fn derive_from_normalized(facts: &NormalizedFacts) -> CapabilityMap {
    Derivation::run(facts.clone()).capabilities
}

/// Derive with the full trace: facts, predicates, fired stages and result.
#[must_use]
pub fn derive_with_trace(raw: &RawFacts) -> Derivation {
    Derivation::run(normalize_user_facts(raw))
}

// =============================================================================
// TESTS
// =============================================================================

//! # matchgate-core
//!
//! The capability engine for Matchgate - THE LOGIC.
//!
//! Raw account, billing, verification and role facts about a member go in;
//! a complete map of boolean capabilities (`browseDiscovery`, `sendMessage`,
//! `accessPremium`, ...) comes out. UI callers use the map to gate buttons
//! and routes.
//!
//! ```text
//! RawFacts ──▶ normalize_user_facts ──▶ NormalizedFacts ──▶ derive ──▶ CapabilityMap
//! ```
//!
//! ## Architectural Constraints
//!
//! - Pure: no I/O, no logging, no ambient state. Session data must be passed
//!   in explicitly as part of the facts.
//! - Total: normalization and derivation never fail. Malformed input yields a
//!   well-formed, maximally restrictive result.
//! - Deterministic: BTreeMap ordering everywhere; identical input produces
//!   identical output.
//! - Stateless: safe to call from any number of threads without coordination.

// =============================================================================
// MODULES
// =============================================================================

pub mod capability;
pub mod facts;
pub mod gate;
pub mod primitives;
pub mod types;
pub mod vocabulary;

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use capability::{
    Capability, CapabilityMap, Derivation, FactPredicates, PostProcessStage, derive_capabilities,
    derive_from_normalized, derive_with_trace,
};
pub use facts::{NormalizedFacts, normalize_user_facts};
pub use gate::CapabilityGate;
pub use types::{MatchgateError, RawFacts};
pub use vocabulary::{AccountStatus, BillingStatus, Role, VerificationStatus};

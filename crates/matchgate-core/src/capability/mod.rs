//! # Capability Module
//!
//! The Capability Deriver and the types it produces.
//!
//! Derivation runs in three steps:
//! 1. Normalize the raw facts (see [`crate::facts`]).
//! 2. Compute [`FactPredicates`] and fill the base table from [`Capability::base_rule`].
//! 3. Apply the four [`PostProcessStage`]s in order, each producing a new map.
//!
//! The result is a [`CapabilityMap`]: a string-keyed snapshot, because server
//! overrides may introduce keys outside the base set.

mod catalog;
mod derive;
mod map;

pub use catalog::*;
pub use derive::*;
pub use map::*;

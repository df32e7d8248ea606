//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers. Every handler is
//! a thin wrapper around a pure `matchgate-core` call; no member state is
//! kept between requests.

use super::types::{
    CapabilitiesResponse, CatalogResponse, CheckRequest, CheckResponse, ErrorResponse,
    HealthResponse,
};
use axum::{
    Json,
    http::{StatusCode, Uri},
    response::IntoResponse,
};
use matchgate_core::{
    CapabilityGate, Derivation, NormalizedFacts, RawFacts, derive_capabilities, derive_with_trace,
    normalize_user_facts,
};

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// CATALOG HANDLER
// =============================================================================

/// List the base capability set.
pub async fn catalog_handler() -> impl IntoResponse {
    Json(CatalogResponse::default())
}

// =============================================================================
// NORMALIZE HANDLER
// =============================================================================

/// Normalize raw facts into the canonical vocabulary.
pub async fn normalize_handler(Json(facts): Json<RawFacts>) -> Json<NormalizedFacts> {
    Json(normalize_user_facts(&facts))
}

// =============================================================================
// DERIVE HANDLERS
// =============================================================================

/// Derive the capability map for raw facts.
pub async fn derive_handler(Json(facts): Json<RawFacts>) -> impl IntoResponse {
    let capabilities = derive_capabilities(&facts);
    tracing::debug!(
        keys = facts.len(),
        granted = capabilities.granted().count(),
        "Derived capabilities"
    );
    (StatusCode::OK, Json(CapabilitiesResponse { capabilities }))
}

/// Derive with the full trace: facts, predicates, fired stages and result.
pub async fn explain_handler(Json(facts): Json<RawFacts>) -> Json<Derivation> {
    let derivation = derive_with_trace(&facts);
    tracing::debug!(stages = ?derivation.stages, "Derivation traced");
    Json(derivation)
}

// =============================================================================
// CHECK HANDLER
// =============================================================================

/// Check a gate. Responds 403 when any required capability is missing.
pub async fn check_handler(Json(request): Json<CheckRequest>) -> impl IntoResponse {
    let capabilities = derive_capabilities(&request.facts);
    let gate = CapabilityGate::new(request.require);
    let response = CheckResponse::from_missing(gate.missing(&capabilities));

    if response.allowed {
        (StatusCode::OK, Json(response))
    } else {
        tracing::debug!(missing = ?response.missing, "Capability gate denied");
        (StatusCode::FORBIDDEN, Json(response))
    }
}

// =============================================================================
// FALLBACK
// =============================================================================

/// JSON 404 for unknown routes.
pub async fn not_found_handler(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new(format!("No route for {}", uri.path()))),
    )
}

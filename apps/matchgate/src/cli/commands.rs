//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use matchgate::api::{self, CatalogResponse, CheckResponse};
use matchgate::config::ServerConfig;
use matchgate_core::{
    CapabilityGate, CapabilityMap, MatchgateError, RawFacts, derive_capabilities,
    derive_with_trace, normalize_user_facts,
};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};

// =============================================================================
// INPUT LIMITS
// =============================================================================

/// Maximum size of a facts document (1 MiB), from a file or stdin.
const MAX_FACTS_SIZE: u64 = 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), MatchgateError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| MatchgateError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(MatchgateError::InvalidFacts(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Canonicalize a path and make sure it names a regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, MatchgateError> {
    let canonical = path.canonicalize().map_err(|e| {
        MatchgateError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(MatchgateError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Read raw facts from a file, or from stdin when no file is given.
pub fn read_facts(file: Option<&Path>) -> Result<RawFacts, MatchgateError> {
    let text = match file {
        Some(path) => {
            let path = validate_file_path(path)?;
            validate_file_size(&path, MAX_FACTS_SIZE)?;
            std::fs::read_to_string(&path)
                .map_err(|e| MatchgateError::IoError(format!("Read facts: {}", e)))?
        }
        None => {
            let mut text = String::new();
            std::io::stdin()
                .lock()
                .take(MAX_FACTS_SIZE.saturating_add(1))
                .read_to_string(&mut text)
                .map_err(|e| MatchgateError::IoError(format!("Read stdin: {}", e)))?;
            if text.len() as u64 > MAX_FACTS_SIZE {
                return Err(MatchgateError::InvalidFacts(format!(
                    "Input exceeds maximum allowed {} bytes",
                    MAX_FACTS_SIZE
                )));
            }
            text
        }
    };

    RawFacts::from_json_str(&text)
}

/// Pretty-print a value as JSON on stdout.
fn print_json<T: Serialize>(value: &T) -> Result<(), MatchgateError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| MatchgateError::SerializationError(e.to_string()))?;
    println!("{}", text);
    Ok(())
}

/// Print a capability map as an aligned table.
fn print_capability_table(map: &CapabilityMap) {
    let width = map.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    for (name, allowed) in map.iter() {
        let mark = if allowed { "yes" } else { "no" };
        println!("  {:<width$}  {}", name, mark, width = width);
    }
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(
    config_path: Option<&Path>,
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), MatchgateError> {
    let mut config = ServerConfig::load(config_path)?;
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }

    tracing::debug!(?config, "Resolved server configuration");

    println!("Matchgate Capability Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:       {}", config.host);
    println!("  Port:       {}", config.port);
    match config.rate_quota() {
        Some(quota) => println!(
            "  Rate limit: {} req/s (burst {})",
            config.rate_limit,
            quota.burst_size()
        ),
        None => println!("  Rate limit: disabled"),
    }
    println!(
        "  Auth:       {}",
        if config.api_key.is_some() { "api key" } else { "disabled" }
    );
    println!();
    println!("Endpoints:");
    println!("  GET  /health                - Health check");
    println!("  GET  /capabilities/catalog  - Base capability set");
    println!("  POST /facts/normalize       - Normalize raw facts");
    println!("  POST /capabilities          - Derive capabilities");
    println!("  POST /capabilities/explain  - Derive with trace");
    println!("  POST /capabilities/check    - Check a gate");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    api::run_server(config).await
}

// =============================================================================
// NORMALIZE COMMAND
// =============================================================================

/// Normalize raw facts.
pub fn cmd_normalize(file: Option<&Path>, json_mode: bool) -> Result<(), MatchgateError> {
    let facts = normalize_user_facts(&read_facts(file)?);

    if json_mode {
        return print_json(&facts);
    }

    let show = |value: Option<&str>| value.unwrap_or("(absent)").to_string();

    println!("Normalized Facts");
    println!("================");
    println!(
        "Account:      {}",
        show(facts.account.as_ref().map(|a| a.as_str()))
    );
    println!(
        "Billing:      {}",
        show(facts.billing.as_ref().map(|b| b.as_str()))
    );
    println!(
        "Verification: {}",
        show(facts.verification.as_ref().map(|v| v.as_str()))
    );
    println!(
        "Role:         {}",
        show(facts.role.as_ref().map(|r| r.as_str()))
    );
    if facts.capabilities.is_empty() {
        println!("Overrides:    (none)");
    } else {
        println!("Overrides:    {}", facts.capabilities.join(", "));
    }

    Ok(())
}

// =============================================================================
// DERIVE COMMAND
// =============================================================================

/// Derive the capability map.
pub fn cmd_derive(file: Option<&Path>, json_mode: bool) -> Result<(), MatchgateError> {
    let capabilities = derive_capabilities(&read_facts(file)?);

    if json_mode {
        return print_json(&capabilities);
    }

    println!("Capabilities");
    println!("============");
    print_capability_table(&capabilities);

    Ok(())
}

// =============================================================================
// EXPLAIN COMMAND
// =============================================================================

/// Show predicates, fired stages and the final map.
pub fn cmd_explain(file: Option<&Path>, json_mode: bool) -> Result<(), MatchgateError> {
    let derivation = derive_with_trace(&read_facts(file)?);

    if json_mode {
        return print_json(&derivation);
    }

    let p = &derivation.predicates;
    println!("Predicates");
    println!("==========");
    for (name, value) in [
        ("deleted", p.is_deleted),
        ("activated", p.is_activated),
        ("deactivated", p.is_deactivated),
        ("verified", p.is_verified),
        ("verification pending", p.is_verification_pending),
        ("paid", p.is_paid),
        ("billing past due", p.is_billing_past_due),
        ("billing unpaid", p.is_billing_unpaid),
        ("admin", p.is_admin),
        ("support", p.is_support),
        ("moderator", p.is_moderator),
    ] {
        println!("  {:<21} {}", name, value);
    }

    println!();
    println!("Stages Applied");
    println!("==============");
    if derivation.stages.is_empty() {
        println!("  (none)");
    }
    for (i, stage) in derivation.stages.iter().enumerate() {
        println!("  {}. {}", i.saturating_add(1), stage);
    }

    println!();
    println!("Capabilities");
    println!("============");
    print_capability_table(&derivation.capabilities);

    Ok(())
}

// =============================================================================
// CHECK COMMAND
// =============================================================================

/// Check that every required capability is allowed.
pub fn cmd_check(
    file: Option<&Path>,
    require: &[String],
    json_mode: bool,
) -> Result<(), MatchgateError> {
    let capabilities = derive_capabilities(&read_facts(file)?);
    let gate = CapabilityGate::new(require);
    let response = CheckResponse::from_missing(gate.missing(&capabilities));

    if json_mode {
        print_json(&response)?;
    } else if response.allowed {
        println!("Allowed: {}", gate.required().collect::<Vec<_>>().join(", "));
    }

    gate.check(&capabilities)
}

// =============================================================================
// CATALOG COMMAND
// =============================================================================

/// List the base capabilities.
pub fn cmd_catalog(json_mode: bool) -> Result<(), MatchgateError> {
    let catalog = CatalogResponse::default();

    if json_mode {
        return print_json(&catalog);
    }

    println!("Base Capabilities");
    println!("=================");
    for entry in &catalog.capabilities {
        let note = if entry.survives_deletion {
            " (kept on deletion)"
        } else {
            ""
        };
        println!("  {:<24} {}{}", entry.name, entry.description, note);
    }

    Ok(())
}

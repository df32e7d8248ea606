//! # Canonical Vocabulary
//!
//! One enum per fact dimension. Upstream services spell the same state many
//! ways ("Active", "enabled", "open"); each enum folds those synonyms into a
//! single canonical token.
//!
//! | Dimension | Canonical tokens |
//! |-----------|------------------|
//! | account | `activated`, `deactivated`, `deleted` |
//! | billing | `paid`, `trial`, `grace`, `past_due`, `unpaid` |
//! | verification | `verified`, `pending`, `unverified` |
//! | role | `admin`, `support`, `moderator`, `user`, `guest` |
//!
//! Values outside the synonym tables are not rejected. They are kept as
//! `Other(token)` with the trimmed, lower-cased spelling, so a new upstream
//! state flows through instead of failing. Such a value never matches a
//! predicate in the deriver.

use crate::primitives::UNKNOWN_TOKEN;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

// =============================================================================
// TOKEN HELPERS
// =============================================================================

/// Coerce a raw JSON value into its display string.
///
/// Strings are taken as-is, numbers and booleans use their JSON text. Null,
/// arrays and objects carry no usable status and become the unknown sentinel.
///
/// Containers are never unwrapped: `["active"]` is unknown, not "active".
#[must_use]
pub fn display_token(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => UNKNOWN_TOKEN.to_string(),
    }
}

/// Trim and lower-case a raw token.
///
/// Returns `None` for the unknown sentinel and for blank input, so the
/// dimension is reported as absent rather than as the string "unknown".
#[must_use]
pub fn canonical_token(raw: &str) -> Option<String> {
    let token = raw.trim().to_lowercase();
    if token.is_empty() || token == UNKNOWN_TOKEN {
        None
    } else {
        Some(token)
    }
}

/// A dimension enum that can be built from a canonical token.
pub(crate) trait FromToken: Sized {
    fn from_canonical(token: &str) -> Self;
}

/// Deserialize an optional dimension the same way raw facts are normalized.
///
/// The value goes through [`display_token`] and [`canonical_token`], so null,
/// blank and "unknown" (in any case) come back as `None`.
pub(crate) fn optional_dimension<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromToken,
{
    let value = Value::deserialize(deserializer)?;
    Ok(canonical_token(&display_token(&value)).map(|token| T::from_canonical(&token)))
}

/// Serialize a vocabulary enum as its token and parse it back through the
/// synonym table.
macro_rules! token_serde {
    ($ty:ty) => {
        impl FromToken for $ty {
            fn from_canonical(token: &str) -> Self {
                Self::from_token(token)
            }
        }

        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                Ok(Self::from_token(&raw.trim().to_lowercase()))
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

// =============================================================================
// ACCOUNT STATUS
// =============================================================================

/// Account lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AccountStatus {
    /// Visible and usable.
    Activated,
    /// Hidden by the member or suspended; can be reactivated.
    Deactivated,
    /// Removed; only the app shell and reactivation remain.
    Deleted,
    /// Unmapped upstream value (trimmed, lower-cased).
    Other(String),
}

impl AccountStatus {
    /// Map an already trimmed, lower-cased token through the synonym table.
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        match token {
            "activated" | "active" | "visible" | "available" | "reactivated" | "enabled"
            | "open" => Self::Activated,
            "deactivated" | "inactive" | "hidden" | "disabled" | "suspended" => Self::Deactivated,
            "deleted" | "archived" | "removed" | "closed" => Self::Deleted,
            other => Self::Other(other.to_string()),
        }
    }

    /// Get the canonical token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Activated => "activated",
            Self::Deactivated => "deactivated",
            Self::Deleted => "deleted",
            Self::Other(token) => token,
        }
    }
}

token_serde!(AccountStatus);

// =============================================================================
// BILLING STATUS
// =============================================================================

/// Subscription billing state.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BillingStatus {
    Paid,
    Trial,
    Grace,
    PastDue,
    Unpaid,
    /// Unmapped upstream value (trimmed, lower-cased).
    Other(String),
}

impl BillingStatus {
    /// Map an already trimmed, lower-cased token through the synonym table.
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        match token {
            "paid" | "active" | "current" | "good_standing" => Self::Paid,
            "trial" | "trialing" | "free_trial" => Self::Trial,
            "grace" | "grace_period" => Self::Grace,
            "past_due" | "pastdue" | "overdue" => Self::PastDue,
            "unpaid" | "none" | "canceled" | "cancelled" | "expired" => Self::Unpaid,
            other => Self::Other(other.to_string()),
        }
    }

    /// Get the canonical token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Paid => "paid",
            Self::Trial => "trial",
            Self::Grace => "grace",
            Self::PastDue => "past_due",
            Self::Unpaid => "unpaid",
            Self::Other(token) => token,
        }
    }

    /// Paid, trialing, or inside the grace period.
    #[must_use]
    pub fn is_in_good_standing(&self) -> bool {
        matches!(self, Self::Paid | Self::Trial | Self::Grace)
    }
}

token_serde!(BillingStatus);

// =============================================================================
// VERIFICATION STATUS
// =============================================================================

/// Identity verification state.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VerificationStatus {
    Verified,
    Pending,
    Unverified,
    /// Unmapped upstream value (trimmed, lower-cased).
    Other(String),
}

impl VerificationStatus {
    /// Map an already trimmed, lower-cased token through the synonym table.
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        match token {
            "verified" | "complete" | "approved" | "confirmed" => Self::Verified,
            "pending" | "processing" | "review" => Self::Pending,
            "unverified" | "incomplete" | "rejected" | "failed" => Self::Unverified,
            other => Self::Other(other.to_string()),
        }
    }

    /// Get the canonical token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Verified => "verified",
            Self::Pending => "pending",
            Self::Unverified => "unverified",
            Self::Other(token) => token,
        }
    }
}

token_serde!(VerificationStatus);

// =============================================================================
// ROLE
// =============================================================================

/// Member role. Absent roles are treated as [`Role::Guest`] by the deriver.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    Admin,
    Support,
    Moderator,
    User,
    Guest,
    /// Unmapped upstream value (trimmed, lower-cased).
    Other(String),
}

impl Role {
    /// Map an already trimmed, lower-cased token through the synonym table.
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        match token {
            "admin" | "superadmin" | "owner" | "administrator" => Self::Admin,
            "support" | "agent" => Self::Support,
            "moderator" | "mod" => Self::Moderator,
            "user" | "member" | "standard" => Self::User,
            "guest" | "anonymous" => Self::Guest,
            other => Self::Other(other.to_string()),
        }
    }

    /// Get the canonical token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => "admin",
            Self::Support => "support",
            Self::Moderator => "moderator",
            Self::User => "user",
            Self::Guest => "guest",
            Self::Other(token) => token,
        }
    }

    /// Moderators, plus the staff roles that inherit moderation.
    #[must_use]
    pub fn is_moderator(&self) -> bool {
        matches!(self, Self::Moderator | Self::Admin | Self::Support)
    }
}

token_serde!(Role);

// =============================================================================
// TESTS
// =============================================================================

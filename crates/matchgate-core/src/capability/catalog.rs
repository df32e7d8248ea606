//! # Capability Catalog
//!
//! The fixed base set of capabilities and the rule that computes each one.
//!
//! | Capability | Rule |
//! |------------|------|
//! | `accessAppShell` | not deleted |
//! | `browseDiscovery` | activated and verified |
//! | `viewMatchRequests` | not deleted |
//! | `respondToMatchRequests` | activated and verified and not past due |
//! | `sendMessage` | activated and verified and not past due |
//! | `readMessages` | not deleted |
//! | `accessPremium` | activated and paid |
//! | `manageBilling` | activated and (paid or past due or admin or support) |
//! | `editProfile` | activated |
//! | `manageUsers` | admin |
//! | `assistMembers` | moderator |
//! | `viewInsights` | activated and verified |
//! | `reactivateAccount` | deactivated |
//! | `requestVerification` | not verified |
//! | `overrideBlocks` | moderator |

use super::FactPredicates;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A capability from the base table.
///
/// Overrides may name capabilities outside this set; those only exist as
/// string keys in a [`super::CapabilityMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    AccessAppShell,
    BrowseDiscovery,
    ViewMatchRequests,
    RespondToMatchRequests,
    SendMessage,
    ReadMessages,
    AccessPremium,
    ManageBilling,
    EditProfile,
    ManageUsers,
    AssistMembers,
    ViewInsights,
    ReactivateAccount,
    RequestVerification,
    OverrideBlocks,
}

impl Capability {
    /// Every base capability, in table order.
    pub const ALL: [Capability; 15] = [
        Capability::AccessAppShell,
        Capability::BrowseDiscovery,
        Capability::ViewMatchRequests,
        Capability::RespondToMatchRequests,
        Capability::SendMessage,
        Capability::ReadMessages,
        Capability::AccessPremium,
        Capability::ManageBilling,
        Capability::EditProfile,
        Capability::ManageUsers,
        Capability::AssistMembers,
        Capability::ViewInsights,
        Capability::ReactivateAccount,
        Capability::RequestVerification,
        Capability::OverrideBlocks,
    ];

    /// Wire name of this capability.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::AccessAppShell => "accessAppShell",
            Capability::BrowseDiscovery => "browseDiscovery",
            Capability::ViewMatchRequests => "viewMatchRequests",
            Capability::RespondToMatchRequests => "respondToMatchRequests",
            Capability::SendMessage => "sendMessage",
            Capability::ReadMessages => "readMessages",
            Capability::AccessPremium => "accessPremium",
            Capability::ManageBilling => "manageBilling",
            Capability::EditProfile => "editProfile",
            Capability::ManageUsers => "manageUsers",
            Capability::AssistMembers => "assistMembers",
            Capability::ViewInsights => "viewInsights",
            Capability::ReactivateAccount => "reactivateAccount",
            Capability::RequestVerification => "requestVerification",
            Capability::OverrideBlocks => "overrideBlocks",
        }
    }

    /// Look up a base capability by its exact wire name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Capability> {
        Capability::ALL.into_iter().find(|c| c.as_str() == name)
    }

    /// Evaluate the base-table rule for this capability.
    #[must_use]
    pub fn base_rule(&self, p: &FactPredicates) -> bool {
        match self {
            Capability::AccessAppShell
            | Capability::ViewMatchRequests
            | Capability::ReadMessages => !p.is_deleted,
            Capability::BrowseDiscovery | Capability::ViewInsights => {
                p.is_activated && p.is_verified
            }
            Capability::RespondToMatchRequests | Capability::SendMessage => {
                p.is_activated && p.is_verified && !p.is_billing_past_due
            }
            Capability::AccessPremium => p.is_activated && p.is_paid,
            Capability::ManageBilling => {
                p.is_activated && (p.is_paid || p.is_billing_past_due || p.is_admin || p.is_support)
            }
            Capability::EditProfile => p.is_activated,
            Capability::ManageUsers => p.is_admin,
            Capability::AssistMembers | Capability::OverrideBlocks => p.is_moderator,
            Capability::ReactivateAccount => p.is_deactivated,
            Capability::RequestVerification => !p.is_verified,
        }
    }

    /// Whether this capability keeps its base value when the account is deleted.
    #[must_use]
    pub fn survives_deletion(&self) -> bool {
        matches!(
            self,
            Capability::AccessAppShell | Capability::ReactivateAccount
        )
    }

    /// Short human description, used by the catalog listing.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Capability::AccessAppShell => "Open the application shell",
            Capability::BrowseDiscovery => "Browse the discovery feed",
            Capability::ViewMatchRequests => "See incoming match requests",
            Capability::RespondToMatchRequests => "Accept or decline match requests",
            Capability::SendMessage => "Send chat messages",
            Capability::ReadMessages => "Read existing conversations",
            Capability::AccessPremium => "Use premium features",
            Capability::ManageBilling => "Open the billing portal",
            Capability::EditProfile => "Edit the member profile",
            Capability::ManageUsers => "Administer member accounts",
            Capability::AssistMembers => "Assist members as staff",
            Capability::ViewInsights => "View profile insights",
            Capability::ReactivateAccount => "Reactivate a deactivated account",
            Capability::RequestVerification => "Start identity verification",
            Capability::OverrideBlocks => "Override member blocks",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::from_name(s).ok_or_else(|| format!("Unknown base capability: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn names_are_unique_and_round_trip() {
        let names: BTreeSet<&str> = Capability::ALL.iter().map(Capability::as_str).collect();
        assert_eq!(names.len(), Capability::ALL.len());
        for capability in Capability::ALL {
            assert_eq!(Capability::from_name(capability.as_str()), Some(capability));
        }
    }

    #[test]
    fn serde_name_matches_as_str() {
        for capability in Capability::ALL {
            let json = serde_json::to_string(&capability).expect("serialize");
            assert_eq!(json, format!("\"{}\"", capability.as_str()));
        }
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert_eq!(Capability::from_name("SendMessage"), None);
        assert!("sendmessage".parse::<Capability>().is_err());
    }

    #[test]
    fn only_shell_and_reactivation_survive_deletion() {
        let survivors: Vec<Capability> = Capability::ALL
            .into_iter()
            .filter(Capability::survives_deletion)
            .collect();
        assert_eq!(
            survivors,
            vec![Capability::AccessAppShell, Capability::ReactivateAccount]
        );
    }
}

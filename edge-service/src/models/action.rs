//! Guardable actions.
//!
//! Every operation that touches organization-scoped data is named by one
//! `Action`. The string form is what is stored in the `actions`,
//! `user_actions` and `role_actions` tables.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Closed set of operations that can be granted to users or roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    CreateOrg,
    DeleteOrg,
    GetOrg,
    ListOrgs,
    UpdateOrg,
    CreateSite,
    DeleteSite,
    GetSite,
    ListSites,
    UpdateSite,
    CreateResource,
    DeleteResource,
    GetResource,
    ListResources,
    UpdateResource,
    CreateTarget,
    DeleteTarget,
    GetTarget,
    ListTargets,
    UpdateTarget,
    GetUser,
    DeleteUser,
    ListUsers,
}

impl Action {
    /// Every action, in catalogue order.
    pub const ALL: [Action; 23] = [
        Self::CreateOrg,
        Self::DeleteOrg,
        Self::GetOrg,
        Self::ListOrgs,
        Self::UpdateOrg,
        Self::CreateSite,
        Self::DeleteSite,
        Self::GetSite,
        Self::ListSites,
        Self::UpdateSite,
        Self::CreateResource,
        Self::DeleteResource,
        Self::GetResource,
        Self::ListResources,
        Self::UpdateResource,
        Self::CreateTarget,
        Self::DeleteTarget,
        Self::GetTarget,
        Self::ListTargets,
        Self::UpdateTarget,
        Self::GetUser,
        Self::DeleteUser,
        Self::ListUsers,
    ];

    /// Get string representation for database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateOrg => "createOrg",
            Self::DeleteOrg => "deleteOrg",
            Self::GetOrg => "getOrg",
            Self::ListOrgs => "listOrgs",
            Self::UpdateOrg => "updateOrg",
            Self::CreateSite => "createSite",
            Self::DeleteSite => "deleteSite",
            Self::GetSite => "getSite",
            Self::ListSites => "listSites",
            Self::UpdateSite => "updateSite",
            Self::CreateResource => "createResource",
            Self::DeleteResource => "deleteResource",
            Self::GetResource => "getResource",
            Self::ListResources => "listResources",
            Self::UpdateResource => "updateResource",
            Self::CreateTarget => "createTarget",
            Self::DeleteTarget => "deleteTarget",
            Self::GetTarget => "getTarget",
            Self::ListTargets => "listTargets",
            Self::UpdateTarget => "updateTarget",
            Self::GetUser => "getUser",
            Self::DeleteUser => "deleteUser",
            Self::ListUsers => "listUsers",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when a string does not name a known action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown action: {0}")]
pub struct UnknownAction(pub String);

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_action_identifiers_are_unique() {
        let ids: HashSet<&str> = Action::ALL.iter().map(|a| a.as_str()).collect();
        assert_eq!(ids.len(), Action::ALL.len());
    }

    #[test]
    fn test_parse_known_action() {
        assert_eq!("updateResource".parse::<Action>(), Ok(Action::UpdateResource));
        assert_eq!("listUsers".parse::<Action>(), Ok(Action::ListUsers));
    }

    #[test]
    fn test_parse_unknown_action() {
        let err = "dropDatabase".parse::<Action>().unwrap_err();
        assert_eq!(err, UnknownAction("dropDatabase".to_string()));
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert!("CreateSite".parse::<Action>().is_err());
    }

    #[test]
    fn test_serde_uses_stored_identifier() {
        let json = serde_json::to_string(&Action::CreateSite).unwrap();
        assert_eq!(json, "\"createSite\"");
        let parsed: Action = serde_json::from_str("\"deleteTarget\"").unwrap();
        assert_eq!(parsed, Action::DeleteTarget);
    }
}

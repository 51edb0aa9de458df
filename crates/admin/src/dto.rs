use serde::Deserialize;

use journal_auth::RoleRank;
use journal_core::RoleId;

// ─────────────────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role_id: RoleId,
}

/// Admin-side edit of another account. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Self-service edit from the profile settings page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Roles
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct NewRole {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub rank: RoleRank,
    #[serde(default)]
    pub permissions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_role_defaults_optional_fields() {
        let input: NewRole = serde_json::from_value(serde_json::json!({
            "name": "Reviewer",
            "rank": 140,
        }))
        .unwrap();

        assert_eq!(input.rank, RoleRank::TOP);
        assert!(input.permissions.is_empty());
        assert!(input.description.is_none());
    }
}

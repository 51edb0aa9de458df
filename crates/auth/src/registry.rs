//! Default roles and the audit registry of roles/permissions.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{Role, RoleRank, catalog, resolver, tokens};

pub const SUPER_ADMIN_RANK: RoleRank = RoleRank::TOP;
pub const ADMIN_RANK: RoleRank = RoleRank::new(80);
pub const EDITOR_RANK: RoleRank = RoleRank::new(50);
pub const AUTHOR_RANK: RoleRank = RoleRank::new(20);
pub const VIEWER_RANK: RoleRank = RoleRank::new(10);

/// Role presets a fresh installation is seeded with.
///
/// Deployments may rename or re-permission any of them; only `rank` and
/// `is_system` carry security meaning.
pub fn default_roles() -> Vec<Role> {
    vec![
        Role::new("Super Admin", SUPER_ADMIN_RANK)
            .system()
            .with_description("Full access; protected from changes by lower ranks")
            .with_permissions([tokens::SYSTEM_ADMIN]),
        Role::new("Admin", ADMIN_RANK)
            .with_description("Manages users and all journal content")
            .with_permissions([
                tokens::SYSTEM_USER_MANAGEMENT,
                tokens::SYSTEM_CONTENT_MANAGEMENT,
                tokens::ROLE_READ,
            ]),
        Role::new("Editor", EDITOR_RANK)
            .with_description("Runs issues, articles and the editorial board")
            .with_permissions([tokens::SYSTEM_CONTENT_MANAGEMENT, tokens::USER_READ]),
        Role::new("Author", AUTHOR_RANK)
            .with_description("Writes articles and follows calls for papers")
            .with_permissions([
                tokens::ARTICLE_CREATE,
                tokens::ARTICLE_READ,
                tokens::ARTICLE_UPDATE,
                tokens::AUTHOR_READ,
                tokens::ISSUE_READ,
                tokens::CFP_READ,
                tokens::NOTIFICATION_READ,
            ]),
        Role::new("Viewer", VIEWER_RANK)
            .with_description("Read-only access to published content")
            .with_permissions([
                tokens::ARTICLE_READ,
                tokens::ISSUE_READ,
                tokens::CFP_READ,
                tokens::BOARD_MEMBER_READ,
            ]),
    ]
}

/// Role definition with its effective permissions (for audit/display).
#[derive(Debug, Clone, Serialize)]
pub struct RoleDefinition {
    pub name: String,
    pub rank: RoleRank,
    pub is_system: bool,
    pub permissions: Vec<String>,
    pub description: Option<String>,
}

/// Permission definition (for audit/display).
#[derive(Debug, Clone, Serialize)]
pub struct PermissionDefinition {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub implies: Vec<String>,
}

/// Complete view of the roles in use and the permission catalog.
#[derive(Debug, Clone, Serialize)]
pub struct RbacRegistry {
    pub roles: BTreeMap<String, RoleDefinition>,
    pub permissions: BTreeMap<String, PermissionDefinition>,
}

impl RbacRegistry {
    pub fn from_roles(roles: &[Role]) -> Self {
        let roles = roles
            .iter()
            .map(|role| {
                let permissions = resolver::effective_permissions(role)
                    .into_iter()
                    .map(|p| p.as_str().to_string())
                    .collect();
                (
                    role.name.clone(),
                    RoleDefinition {
                        name: role.name.clone(),
                        rank: role.effective_rank(),
                        is_system: role.is_system,
                        permissions,
                        description: role.description.clone(),
                    },
                )
            })
            .collect();

        let permissions = catalog::all_permissions()
            .into_iter()
            .map(|p| {
                let name = p.as_str().to_string();
                let definition = PermissionDefinition {
                    description: catalog::describe(&name),
                    category: catalog::category(&name).map(str::to_string),
                    implies: catalog::expand_system_permission(&name)
                        .into_iter()
                        .map(|i| i.as_str().to_string())
                        .collect(),
                    name: name.clone(),
                };
                (name, definition)
            })
            .collect();

        Self { roles, permissions }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_preset_is_protected() {
        let roles = default_roles();
        let protected: Vec<_> = roles.iter().filter(|r| r.is_protected()).collect();
        assert_eq!(protected.len(), 1);
        assert!(protected[0].is_system);
    }

    #[test]
    fn presets_only_reference_catalog_tokens() {
        for role in default_roles() {
            for p in &role.permissions {
                assert!(catalog::is_valid_permission(p.as_str()), "{} on {}", p, role.name);
            }
        }
    }

    #[test]
    fn registry_lists_whole_catalog() {
        let registry = RbacRegistry::from_roles(&default_roles());
        assert_eq!(registry.permissions.len(), catalog::all_permissions().len());
        assert_eq!(registry.roles.len(), 5);

        let editor = &registry.roles["Editor"];
        assert!(editor.permissions.contains(&"issue.DELETE".to_string()));
        assert!(!editor.permissions.contains(&"user.DELETE".to_string()));

        let user_mgmt = &registry.permissions["SYSTEM.USER_MANAGEMENT"];
        assert_eq!(user_mgmt.category.as_deref(), Some("system"));
        assert_eq!(user_mgmt.implies.len(), 4);
    }
}

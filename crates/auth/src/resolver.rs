//! Role → effective permission resolution.

use crate::catalog::{self, CatalogEntry};
use crate::{Permission, PermissionSet, Role};

/// Compute the effective permission set of a role.
///
/// - System roles receive the whole catalog.
/// - Stored system tokens are kept and expanded into what they imply.
/// - Unknown tokens are dropped (logged), never granted.
/// - No stored permissions and no system flag resolves to the empty set.
pub fn effective_permissions(role: &Role) -> PermissionSet {
    if role.is_system {
        return catalog::all_permissions().into_iter().collect();
    }

    let mut effective = PermissionSet::new();
    for permission in &role.permissions {
        match catalog::parse(permission.as_str()) {
            Some(CatalogEntry::Scoped(..)) => {
                effective.insert(permission.clone());
            }
            Some(CatalogEntry::System(_)) => {
                effective.insert(permission.clone());
                effective.extend(catalog::expand_system_permission(permission.as_str()));
            }
            None => {
                tracing::warn!(
                    role_id = %role.id,
                    permission = %permission,
                    "ignoring unknown permission on role"
                );
            }
        }
    }

    effective
}

/// Whether `effective` grants `token`, directly or through a subsuming system token.
///
/// Returns the token that actually matched.
pub fn granting_permission(effective: &PermissionSet, token: &str) -> Option<Permission> {
    if !catalog::is_valid_permission(token) {
        return None;
    }

    effective
        .iter()
        .find(|p| p.as_str() == token)
        .cloned()
        .or_else(|| {
            catalog::subsuming_system_permissions(token)
                .into_iter()
                .find(|system| effective.contains(system))
        })
}

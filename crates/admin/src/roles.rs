//! Role administration.
//!
//! Besides the role.* permission checks, two rules keep role editing from
//! becoming a privilege escalation path:
//! - an actor can only grant permissions it currently holds
//! - system roles are fixed: their grants cannot be edited and they cannot
//!   be deleted

use chrono::Utc;

use journal_auth::{
    AccessDenied, AccessGuard, AccessRequest, DenialKind, DirectoryMut, Permission, RequestScope, Role, tokens,
};
use journal_core::{DomainError, RoleId};

use crate::dto::NewRole;
use crate::errors::AdminResult;
use crate::validate;

#[derive(Debug, Clone)]
pub struct RoleAdmin<D, G> {
    directory: D,
    guard: G,
}

impl<D, G> RoleAdmin<D, G>
where
    D: DirectoryMut,
    G: AccessGuard,
{
    pub fn new(directory: D, guard: G) -> Self {
        Self { directory, guard }
    }

    /// Roles ordered by rank, highest first.
    pub fn list_roles(&self, scope: &RequestScope) -> AdminResult<Vec<Role>> {
        self.guard.ensure(scope, &AccessRequest::new(tokens::ROLE_READ))?;
        Ok(self.directory.list_roles()?)
    }

    pub fn get_role(&self, scope: &RequestScope, id: RoleId) -> AdminResult<Role> {
        self.guard
            .ensure(scope, &AccessRequest::new(tokens::ROLE_READ).on_role(id))?;
        self.load(id)
    }

    pub fn create_role(&self, scope: &RequestScope, input: NewRole) -> AdminResult<Role> {
        self.guard.ensure(
            scope,
            &AccessRequest::new(tokens::ROLE_CREATE).with_proposed_rank(input.rank),
        )?;

        let name = validate::name("role name", &input.name)?;
        let permissions = validate::permissions(&input.permissions)?;
        self.ensure_grantable(scope, &permissions)?;

        let mut role = Role::new(name, input.rank).with_permissions(permissions);
        role.description = input
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        self.directory.insert_role(role.clone())?;

        tracing::info!(
            actor = ?scope.actor_id(),
            role_id = %role.id,
            role = %role.name,
            rank = %role.rank,
            "role created"
        );
        Ok(role)
    }

    /// Replace a role's stored permission list. Takes effect on the next
    /// check made by any holder of the role.
    pub fn update_role_permissions(
        &self,
        scope: &RequestScope,
        id: RoleId,
        permissions: &[String],
    ) -> AdminResult<Role> {
        self.guard
            .ensure(scope, &AccessRequest::new(tokens::ROLE_UPDATE).on_role(id))?;

        let role = self.load(id)?;
        if role.is_system {
            return Err(DomainError::conflict(format!("system role '{}' cannot be modified", role.name)).into());
        }

        let permissions = validate::permissions(permissions)?;
        let added: Vec<Permission> = permissions
            .iter()
            .filter(|p| !role.permissions.contains(p))
            .cloned()
            .collect();
        self.ensure_grantable(scope, &added)?;

        let updated = Role {
            permissions,
            updated_at: Utc::now(),
            ..role
        };
        self.directory.update_role(updated.clone())?;

        tracing::info!(
            actor = ?scope.actor_id(),
            role_id = %id,
            added = added.len(),
            "role permissions updated"
        );
        Ok(updated)
    }

    pub fn delete_role(&self, scope: &RequestScope, id: RoleId) -> AdminResult<()> {
        self.guard
            .ensure(scope, &AccessRequest::new(tokens::ROLE_DELETE).on_role(id))?;

        let role = self.load(id)?;
        if role.is_system {
            return Err(DomainError::conflict(format!("system role '{}' cannot be deleted", role.name)).into());
        }
        let assigned = self.directory.count_users_with_role(id)?;
        if assigned > 0 {
            return Err(DomainError::conflict(format!(
                "role '{}' is still assigned to {assigned} user(s)",
                role.name
            ))
            .into());
        }
        if !self.directory.remove_role(id)? {
            return Err(DomainError::not_found().into());
        }

        tracing::info!(actor = ?scope.actor_id(), role_id = %id, role = %role.name, "role deleted");
        Ok(())
    }

    fn ensure_grantable(&self, scope: &RequestScope, permissions: &[Permission]) -> AdminResult<()> {
        for permission in permissions {
            let result = self.guard.authorize(scope, &AccessRequest::new(permission.clone()));
            if result.allowed {
                continue;
            }
            if result.denial == Some(DenialKind::LookupFailed) {
                result.ensure()?;
            }

            tracing::debug!(actor = ?scope.actor_id(), %permission, "refused to grant unheld permission");
            return Err(AccessDenied {
                kind: DenialKind::InsufficientPermission,
                reason: format!("cannot grant {permission}: you do not hold it"),
            }
            .into());
        }
        Ok(())
    }

    fn load(&self, id: RoleId) -> AdminResult<Role> {
        self.directory
            .find_role(id)?
            .ok_or_else(|| DomainError::not_found().into())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use journal_auth::{Authorizer, Directory, RoleRank, User, UserRecord};
    use journal_infra::InMemoryDirectory;

    type Admin = RoleAdmin<Arc<InMemoryDirectory>, Authorizer<Arc<InMemoryDirectory>>>;

    fn setup() -> (Admin, Arc<InMemoryDirectory>, RequestScope) {
        let dir = Arc::new(InMemoryDirectory::new());
        let curator = Role::new("Curator", RoleRank::new(60)).with_permissions([
            tokens::ROLE_CREATE,
            tokens::ROLE_READ,
            tokens::ROLE_UPDATE,
            tokens::ROLE_DELETE,
            tokens::ARTICLE_READ,
            tokens::ARTICLE_UPDATE,
        ]);
        dir.insert_role(curator.clone()).unwrap();
        let actor = User::new("Cleo", "cleo@example.org", curator);
        dir.insert_user(actor.record()).unwrap();

        (RoleAdmin::new(dir.clone(), Authorizer::new(dir.clone())), dir, RequestScope::authenticated(actor))
    }

    fn new_role(name: &str, rank: u8, permissions: &[&str]) -> NewRole {
        NewRole {
            name: name.into(),
            description: None,
            rank: RoleRank::new(rank),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn creates_role_with_held_permissions() {
        let (admin, dir, scope) = setup();
        let role = admin
            .create_role(&scope, new_role(" Copy Editor ", 30, &["article.READ", "article.UPDATE"]))
            .unwrap();

        assert_eq!(role.name, "Copy Editor");
        assert_eq!(dir.find_role(role.id).unwrap(), Some(role));
    }

    #[test]
    fn cannot_grant_unheld_permission() {
        let (admin, dir, scope) = setup();
        let err = admin
            .create_role(&scope, new_role("Sneaky", 30, &["article.READ", "user.DELETE"]))
            .unwrap_err();

        assert!(err.is_denied());
        assert_eq!(err.to_string(), "cannot grant user.DELETE: you do not hold it");
        assert_eq!(dir.list_roles().unwrap().len(), 1);
    }

    #[test]
    fn cannot_create_role_above_own_rank() {
        let (admin, _, scope) = setup();
        let err = admin.create_role(&scope, new_role("Boss", 90, &[])).unwrap_err();
        assert_eq!(err.to_string(), "cannot modify a user with a higher-privileged role");
    }

    #[test]
    fn existing_grants_may_be_kept_when_editing() {
        let (admin, dir, scope) = setup();
        let legacy = Role::new("Legacy", RoleRank::new(20)).with_permissions([tokens::ISSUE_DELETE]);
        dir.insert_role(legacy.clone()).unwrap();

        let updated = admin
            .update_role_permissions(&scope, legacy.id, &["issue.DELETE".into(), "article.READ".into()])
            .unwrap();
        assert_eq!(updated.permissions, vec![tokens::ISSUE_DELETE, tokens::ARTICLE_READ]);

        let err = admin
            .update_role_permissions(&scope, legacy.id, &["notification.DELETE".into()])
            .unwrap_err();
        assert!(err.is_denied());
    }

    #[test]
    fn assigned_role_cannot_be_deleted() {
        let (admin, dir, scope) = setup();
        let role = admin.create_role(&scope, new_role("Guest", 5, &[])).unwrap();
        dir.insert_user(UserRecord::new("Gus", "gus@example.org", role.id)).unwrap();

        let err = admin.delete_role(&scope, role.id).unwrap_err();
        assert_eq!(err.to_string(), "conflict: role 'Guest' is still assigned to 1 user(s)");
    }
}

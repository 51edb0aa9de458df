//! Directory-backed authorization.
//!
//! Pages and actions depend on [`AccessGuard`]; [`Authorizer`] is the
//! implementation that loads the facts a check needs and hands them to the
//! pure checker.

use std::collections::BTreeMap;

use uuid::Uuid;

use journal_core::{RoleId, UserId};

use crate::check::{AccessDenied, DenialKind, PermissionCheckResult, check_permission};
use crate::{
    AccessPath, Directory, DirectoryError, Permission, PermissionContext, RequestScope, RoleRank, TargetFacts,
};

/// What a request acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Target {
    #[default]
    None,
    User(UserId),
    Role(RoleId),
    /// Any other record (article, issue, notification, ...).
    Resource(Uuid),
}

impl Target {
    pub fn resource_id(self) -> Option<Uuid> {
        match self {
            Target::None => None,
            Target::User(id) => Some(*id.as_uuid()),
            Target::Role(id) => Some(*id.as_uuid()),
            Target::Resource(id) => Some(id),
        }
    }
}

/// A permission to check plus what it is checked against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRequest {
    pub permission: Permission,
    pub target: Target,
    pub path: AccessPath,
    /// Rank the target would have after the operation (new role, role change).
    pub proposed_rank: Option<RoleRank>,
}

impl AccessRequest {
    pub fn new(permission: impl Into<Permission>) -> Self {
        Self {
            permission: permission.into(),
            target: Target::None,
            path: AccessPath::Admin,
            proposed_rank: None,
        }
    }

    pub fn on(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    pub fn on_user(self, id: UserId) -> Self {
        self.on(Target::User(id))
    }

    pub fn on_role(self, id: RoleId) -> Self {
        self.on(Target::Role(id))
    }

    pub fn via(mut self, path: AccessPath) -> Self {
        self.path = path;
        self
    }

    pub fn with_proposed_rank(mut self, rank: RoleRank) -> Self {
        self.proposed_rank = Some(rank);
        self
    }
}

/// The interface page and action code depends on for every authorization
/// decision.
pub trait AccessGuard: Send + Sync {
    /// Never allows when the underlying data could not be read.
    fn authorize(&self, scope: &RequestScope, request: &AccessRequest) -> PermissionCheckResult;

    fn ensure(&self, scope: &RequestScope, request: &AccessRequest) -> Result<(), AccessDenied> {
        self.authorize(scope, request).ensure()
    }

    /// Decide a batch of target-less permissions, e.g. which buttons to render.
    fn affordances(&self, scope: &RequestScope, permissions: &[Permission]) -> BTreeMap<Permission, bool> {
        permissions
            .iter()
            .map(|p| {
                let allowed = self.authorize(scope, &AccessRequest::new(p.clone())).allowed;
                (p.clone(), allowed)
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct Authorizer<D> {
    directory: D,
}

impl<D: Directory> Authorizer<D> {
    pub fn new(directory: D) -> Self {
        Self { directory }
    }

    /// Run a check, surfacing lookup failures to the caller.
    ///
    /// The acting user is re-read on every check, so a role change, a role
    /// edit or a deletion made mid-session takes effect on the next check. An
    /// actor that no longer exists is treated as unauthenticated.
    pub fn check(
        &self,
        scope: &RequestScope,
        request: &AccessRequest,
    ) -> Result<PermissionCheckResult, DirectoryError> {
        let Some(actor_id) = scope.actor_id() else {
            return Ok(check_permission(None, &request.permission, None));
        };

        let Some(actor) = self.directory.find_user(actor_id)? else {
            tracing::debug!(user_id = %actor_id, "session user no longer exists");
            return Ok(check_permission(None, &request.permission, None));
        };

        let ctx = PermissionContext {
            resource_id: request.target.resource_id(),
            actor_id: Some(actor.id),
            target: self.target_facts(request)?,
            path: request.path,
        };

        Ok(check_permission(Some(&actor), &request.permission, Some(&ctx)))
    }

    /// Run a check, turning lookup failures into a denial.
    pub fn decide(&self, scope: &RequestScope, request: &AccessRequest) -> PermissionCheckResult {
        match self.check(scope, request) {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    permission = %request.permission,
                    user_id = scope.actor_id().map(|id| id.to_string()),
                    "permission lookup failed; denying"
                );
                PermissionCheckResult::deny(DenialKind::LookupFailed)
            }
        }
    }

    fn target_facts(&self, request: &AccessRequest) -> Result<Option<TargetFacts>, DirectoryError> {
        let current = match request.target {
            Target::User(id) => self.directory.find_user(id)?.map(|u| u.role.effective_rank()),
            Target::Role(id) => self.directory.find_role(id)?.map(|r| r.effective_rank()),
            Target::None | Target::Resource(_) => None,
        };

        let rank = match (current, request.proposed_rank) {
            (Some(current), Some(proposed)) => Some(current.max(proposed)),
            (current, proposed) => current.or(proposed),
        };

        match rank {
            Some(rank) => Ok(Some(TargetFacts {
                rank,
                top_rank_holders: self.directory.count_top_rank_users()?,
            })),
            None => Ok(None),
        }
    }
}

impl<D: Directory> AccessGuard for Authorizer<D> {
    fn authorize(&self, scope: &RequestScope, request: &AccessRequest) -> PermissionCheckResult {
        self.decide(scope, request)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::{Role, User, UserRecord, tokens};

    /// Fixed directory with a switch to simulate an outage.
    #[derive(Default)]
    struct FixedDirectory {
        users: HashMap<UserId, UserRecord>,
        roles: HashMap<RoleId, Role>,
        down: AtomicBool,
    }

    impl FixedDirectory {
        fn with(mut self, user: &User) -> Self {
            self.roles.insert(user.role.id, user.role.clone());
            self.users.insert(user.id, user.record());
            self
        }

        fn available(&self) -> Result<(), DirectoryError> {
            if self.down.load(Ordering::SeqCst) {
                Err(DirectoryError::Unavailable("connection refused".into()))
            } else {
                Ok(())
            }
        }
    }

    impl Directory for FixedDirectory {
        fn find_user(&self, id: UserId) -> Result<Option<User>, DirectoryError> {
            self.available()?;
            Ok(self.users.get(&id).and_then(|record| {
                let role = self.roles.get(&record.role_id)?.clone();
                Some(record.clone().with_role(role))
            }))
        }

        fn find_role(&self, id: RoleId) -> Result<Option<Role>, DirectoryError> {
            self.available()?;
            Ok(self.roles.get(&id).cloned())
        }

        fn count_top_rank_users(&self) -> Result<usize, DirectoryError> {
            self.available()?;
            Ok(self
                .users
                .values()
                .filter(|u| self.roles.get(&u.role_id).is_some_and(Role::is_protected))
                .count())
        }

        fn count_users_with_role(&self, role_id: RoleId) -> Result<usize, DirectoryError> {
            self.available()?;
            Ok(self.users.values().filter(|u| u.role_id == role_id).count())
        }

        fn list_users(&self) -> Result<Vec<User>, DirectoryError> {
            self.available()?;
            Ok(Vec::new())
        }

        fn list_roles(&self) -> Result<Vec<Role>, DirectoryError> {
            self.available()?;
            Ok(self.roles.values().cloned().collect())
        }
    }

    fn super_admin(name: &str) -> User {
        User::new(name, format!("{name}@example.org"), Role::new("Super Admin", RoleRank::TOP).system())
    }

    #[test]
    fn lookup_failure_denies() {
        let admin = super_admin("root");
        let directory = FixedDirectory::default().with(&admin);
        directory.down.store(true, Ordering::SeqCst);
        let authorizer = Authorizer::new(directory);
        let scope = RequestScope::authenticated(admin);

        let request = AccessRequest::new(tokens::ARTICLE_READ);
        assert!(authorizer.check(&scope, &request).is_err());

        let result = authorizer.decide(&scope, &request);
        assert!(!result.allowed);
        assert_eq!(result.denial, Some(DenialKind::LookupFailed));
    }

    #[test]
    fn peer_super_admin_may_be_deleted_while_another_remains() {
        let first = super_admin("first");
        let second = super_admin("second");

        let both = Authorizer::new(FixedDirectory::default().with(&first).with(&second));
        let scope = RequestScope::authenticated(second);
        let result = both.decide(&scope, &AccessRequest::new(tokens::USER_DELETE).on_user(first.id));
        assert!(result.allowed);
    }

    #[test]
    fn demoted_actor_loses_access_on_next_check() {
        let root = super_admin("root");
        let viewer_role = Role::new("Viewer", RoleRank::new(10)).with_permissions([tokens::ARTICLE_READ]);
        let scope = RequestScope::authenticated(root.clone());
        let request = AccessRequest::new(tokens::USER_DELETE).on_user(UserId::new());

        let mut directory = FixedDirectory::default().with(&root);
        directory.roles.insert(viewer_role.id, viewer_role.clone());
        let demoted = UserRecord {
            role_id: viewer_role.id,
            ..root.record()
        };
        directory.users.insert(root.id, demoted);

        let result = Authorizer::new(directory).decide(&scope, &request);
        assert_eq!(result.denial, Some(DenialKind::InsufficientPermission));
    }

    #[test]
    fn deleted_actor_is_treated_as_unauthenticated() {
        let root = super_admin("root");
        let scope = RequestScope::authenticated(root);
        let authorizer = Authorizer::new(FixedDirectory::default());

        let result = authorizer.decide(&scope, &AccessRequest::new(tokens::ARTICLE_READ));
        assert_eq!(result.denial, Some(DenialKind::Unauthenticated));
    }

    #[test]
    fn system_role_holder_is_protected_whatever_its_stored_rank() {
        let admin = User::new(
            "adm",
            "adm@example.org",
            Role::new("Admin", RoleRank::new(80)).with_permissions([tokens::SYSTEM_USER_MANAGEMENT]),
        );
        let holder = User::new(
            "ops",
            "ops@example.org",
            Role {
                is_system: true,
                ..Role::new("Operations", RoleRank::new(50))
            },
        );
        let authorizer = Authorizer::new(FixedDirectory::default().with(&admin).with(&holder));
        let scope = RequestScope::authenticated(admin);

        let result = authorizer.decide(&scope, &AccessRequest::new(tokens::USER_DELETE).on_user(holder.id));
        assert_eq!(result.denial, Some(DenialKind::ProtectedRole));
    }

    #[test]
    fn role_edits_apply_on_next_check() {
        let editor = User::new(
            "ed",
            "ed@example.org",
            Role::new("Editor", RoleRank::new(50)).with_permissions([tokens::ARTICLE_READ]),
        );
        let mut directory = FixedDirectory::default().with(&editor);
        let scope = RequestScope::authenticated(editor.clone());
        let request = AccessRequest::new(tokens::ARTICLE_CREATE);

        assert!(!Authorizer::new(FixedDirectory::default().with(&editor)).decide(&scope, &request).allowed);

        let mut widened = editor.role.clone();
        widened.permissions.push(tokens::ARTICLE_CREATE);
        directory.roles.insert(widened.id, widened);
        assert!(Authorizer::new(directory).decide(&scope, &request).allowed);
    }

    #[test]
    fn proposed_rank_blocks_granting_above_self() {
        let admin = User::new(
            "adm",
            "adm@example.org",
            Role::new("Admin", RoleRank::new(80)).with_permissions([tokens::SYSTEM_ROLE_MANAGEMENT]),
        );
        let authorizer = Authorizer::new(FixedDirectory::default().with(&admin));
        let scope = RequestScope::authenticated(admin);

        let create_top = AccessRequest::new(tokens::ROLE_CREATE).with_proposed_rank(RoleRank::TOP);
        assert_eq!(
            authorizer.decide(&scope, &create_top).denial,
            Some(DenialKind::ProtectedRole)
        );

        let create_low = AccessRequest::new(tokens::ROLE_CREATE).with_proposed_rank(RoleRank::new(20));
        assert!(authorizer.decide(&scope, &create_low).allowed);
    }

    #[test]
    fn affordances_for_anonymous_are_all_false() {
        let authorizer = Authorizer::new(FixedDirectory::default());
        let map = authorizer.affordances(
            &RequestScope::anonymous(),
            &[tokens::ARTICLE_READ, tokens::ARTICLE_CREATE],
        );
        assert_eq!(map.len(), 2);
        assert!(map.values().all(|allowed| !allowed));
    }
}

//! User account administration.

use chrono::Utc;

use journal_auth::{
    AccessDenied, AccessGuard, AccessPath, AccessRequest, DenialKind, DirectoryMut, RequestScope, User,
    UserRecord, tokens,
};
use journal_core::{DomainError, RoleId, UserId};

use crate::dto::{NewUser, ProfileUpdate, UserUpdate};
use crate::errors::AdminResult;
use crate::validate;

/// User management actions.
///
/// `directory` is written to; `guard` decides. They are usually backed by the
/// same store, e.g. `UserAdmin::new(dir.clone(), Authorizer::new(dir))`.
#[derive(Debug, Clone)]
pub struct UserAdmin<D, G> {
    directory: D,
    guard: G,
}

impl<D, G> UserAdmin<D, G>
where
    D: DirectoryMut,
    G: AccessGuard,
{
    pub fn new(directory: D, guard: G) -> Self {
        Self { directory, guard }
    }

    pub fn get_user(&self, scope: &RequestScope, id: UserId) -> AdminResult<User> {
        self.guard
            .ensure(scope, &AccessRequest::new(tokens::USER_READ).on_user(id))?;
        self.load(id)
    }

    pub fn list_users(&self, scope: &RequestScope) -> AdminResult<Vec<User>> {
        self.guard.ensure(scope, &AccessRequest::new(tokens::USER_READ))?;
        Ok(self.directory.list_users()?)
    }

    pub fn create_user(&self, scope: &RequestScope, input: NewUser) -> AdminResult<User> {
        let role = self.directory.find_role(input.role_id)?;

        let mut request = AccessRequest::new(tokens::USER_CREATE);
        if let Some(role) = &role {
            request = request.with_proposed_rank(role.effective_rank());
        }
        self.guard.ensure(scope, &request)?;

        let role = role.ok_or_else(|| DomainError::validation(format!("unknown role {}", input.role_id)))?;

        let record = UserRecord::new(
            validate::name("name", &input.name)?,
            validate::email(&input.email)?,
            role.id,
        );
        self.directory.insert_user(record.clone())?;

        tracing::info!(
            actor = ?scope.actor_id(),
            user_id = %record.id,
            role = %role.name,
            "user created"
        );
        Ok(record.with_role(role))
    }

    /// Edit another account's name or email from the admin tables.
    pub fn update_user(&self, scope: &RequestScope, id: UserId, input: UserUpdate) -> AdminResult<User> {
        self.guard
            .ensure(scope, &AccessRequest::new(tokens::USER_UPDATE).on_user(id))?;

        let user = self.load(id)?;
        let record = apply(user.record(), input.name, input.email)?;
        self.directory.update_user(record)?;

        tracing::info!(actor = ?scope.actor_id(), user_id = %id, "user updated");
        self.load(id)
    }

    pub fn change_role(&self, scope: &RequestScope, id: UserId, role_id: RoleId) -> AdminResult<User> {
        let role = self.directory.find_role(role_id)?;

        let mut request = AccessRequest::new(tokens::USER_UPDATE).on_user(id);
        if let Some(role) = &role {
            request = request.with_proposed_rank(role.effective_rank());
        }
        self.guard.ensure(scope, &request)?;

        let role = role.ok_or_else(|| DomainError::validation(format!("unknown role {role_id}")))?;

        let user = self.load(id)?;
        let previous = user.role.name.clone();
        let record = UserRecord {
            role_id,
            updated_at: Utc::now(),
            ..user.record()
        };
        self.directory.update_user(record)?;

        tracing::info!(
            actor = ?scope.actor_id(),
            user_id = %id,
            from = %previous,
            to = %role.name,
            "user role changed"
        );
        self.load(id)
    }

    pub fn delete_user(&self, scope: &RequestScope, id: UserId) -> AdminResult<()> {
        self.guard
            .ensure(scope, &AccessRequest::new(tokens::USER_DELETE).on_user(id))?;

        if !self.directory.remove_user(id)? {
            return Err(DomainError::not_found().into());
        }

        tracing::info!(actor = ?scope.actor_id(), user_id = %id, "user deleted");
        Ok(())
    }

    /// Self-service edit of the signed-in account. The role cannot be changed
    /// here.
    pub fn update_own_profile(&self, scope: &RequestScope, input: ProfileUpdate) -> AdminResult<User> {
        let Some(id) = scope.actor_id() else {
            return Err(AccessDenied {
                kind: DenialKind::Unauthenticated,
                reason: DenialKind::Unauthenticated.reason().to_string(),
            }
            .into());
        };

        self.guard.ensure(
            scope,
            &AccessRequest::new(tokens::USER_UPDATE)
                .on_user(id)
                .via(AccessPath::ProfileSettings),
        )?;

        let user = self.load(id)?;
        let record = apply(user.record(), input.name, input.email)?;
        self.directory.update_user(record)?;

        tracing::info!(user_id = %id, "profile updated");
        self.load(id)
    }

    fn load(&self, id: UserId) -> AdminResult<User> {
        self.directory
            .find_user(id)?
            .ok_or_else(|| DomainError::not_found().into())
    }
}

fn apply(mut record: UserRecord, name: Option<String>, email: Option<String>) -> AdminResult<UserRecord> {
    if let Some(name) = name {
        record.name = validate::name("name", &name)?;
    }
    if let Some(email) = email {
        record.email = validate::email(&email)?;
    }
    record.updated_at = Utc::now();
    Ok(record)
}

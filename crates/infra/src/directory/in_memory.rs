use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use journal_auth::{Directory, DirectoryError, DirectoryMut, Role, User, UserRecord};
use journal_core::{RoleId, UserId};

#[derive(Debug, Default)]
struct State {
    roles: HashMap<RoleId, Role>,
    users: HashMap<UserId, UserRecord>,
}

impl State {
    fn join(&self, record: &UserRecord) -> Option<User> {
        let role = self.roles.get(&record.role_id)?.clone();
        Some(record.clone().with_role(role))
    }

    fn top_rank_users(&self) -> usize {
        self.users
            .values()
            .filter(|u| self.roles.get(&u.role_id).is_some_and(Role::is_protected))
            .count()
    }

    fn email_taken(&self, email: &str, except: UserId) -> bool {
        self.users
            .values()
            .any(|u| u.id != except && u.email.eq_ignore_ascii_case(email))
    }

    fn role_name_taken(&self, name: &str, except: RoleId) -> bool {
        self.roles
            .values()
            .any(|r| r.id != except && r.name.eq_ignore_ascii_case(name))
    }
}

/// In-memory user/role directory for tests/dev.
///
/// The top-rank invariant is checked under the same write lock as the
/// mutation, so a count-then-delete race cannot remove the last super admin.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    inner: RwLock<State>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, DirectoryError> {
        self.inner
            .read()
            .map_err(|_| DirectoryError::Unavailable("directory lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, DirectoryError> {
        self.inner
            .write()
            .map_err(|_| DirectoryError::Unavailable("directory lock poisoned".into()))
    }

    fn lost_last_top_rank(before: usize, state: &State) -> bool {
        before > 0 && state.top_rank_users() == 0
    }
}

impl Directory for InMemoryDirectory {
    fn find_user(&self, id: UserId) -> Result<Option<User>, DirectoryError> {
        let state = self.read()?;
        Ok(state.users.get(&id).and_then(|record| state.join(record)))
    }

    fn find_role(&self, id: RoleId) -> Result<Option<Role>, DirectoryError> {
        Ok(self.read()?.roles.get(&id).cloned())
    }

    fn count_top_rank_users(&self) -> Result<usize, DirectoryError> {
        Ok(self.read()?.top_rank_users())
    }

    fn count_users_with_role(&self, role_id: RoleId) -> Result<usize, DirectoryError> {
        Ok(self
            .read()?
            .users
            .values()
            .filter(|u| u.role_id == role_id)
            .count())
    }

    fn list_users(&self) -> Result<Vec<User>, DirectoryError> {
        let state = self.read()?;
        let mut users: Vec<User> = state.users.values().filter_map(|r| state.join(r)).collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(users)
    }

    fn list_roles(&self) -> Result<Vec<Role>, DirectoryError> {
        let mut roles: Vec<Role> = self.read()?.roles.values().cloned().collect();
        roles.sort_by(|a, b| {
            b.effective_rank()
                .cmp(&a.effective_rank())
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(roles)
    }
}

impl DirectoryMut for InMemoryDirectory {
    fn insert_role(&self, role: Role) -> Result<(), DirectoryError> {
        let mut state = self.write()?;
        if state.roles.contains_key(&role.id) {
            return Err(DirectoryError::Conflict(format!("role {} already exists", role.id)));
        }
        if state.role_name_taken(&role.name, role.id) {
            return Err(DirectoryError::Conflict(format!("role name '{}' is taken", role.name)));
        }
        state.roles.insert(role.id, role);
        Ok(())
    }

    fn update_role(&self, role: Role) -> Result<(), DirectoryError> {
        let mut state = self.write()?;
        if !state.roles.contains_key(&role.id) {
            return Err(DirectoryError::NotFound);
        }
        if state.role_name_taken(&role.name, role.id) {
            return Err(DirectoryError::Conflict(format!("role name '{}' is taken", role.name)));
        }

        let id = role.id;
        let before = state.top_rank_users();
        let previous = state.roles.insert(id, role);
        if Self::lost_last_top_rank(before, &state) {
            if let Some(previous) = previous {
                state.roles.insert(id, previous);
            }
            return Err(DirectoryError::LastProtectedUser);
        }
        Ok(())
    }

    fn remove_role(&self, id: RoleId) -> Result<bool, DirectoryError> {
        let mut state = self.write()?;
        let assigned = state.users.values().filter(|u| u.role_id == id).count();
        if assigned > 0 {
            return Err(DirectoryError::Conflict(format!(
                "role is assigned to {assigned} user(s)"
            )));
        }
        Ok(state.roles.remove(&id).is_some())
    }

    fn insert_user(&self, user: UserRecord) -> Result<(), DirectoryError> {
        let mut state = self.write()?;
        if state.users.contains_key(&user.id) {
            return Err(DirectoryError::Conflict(format!("user {} already exists", user.id)));
        }
        if !state.roles.contains_key(&user.role_id) {
            return Err(DirectoryError::UnknownRole(user.role_id));
        }
        if state.email_taken(&user.email, user.id) {
            return Err(DirectoryError::Conflict(format!("email '{}' is taken", user.email)));
        }
        state.users.insert(user.id, user);
        Ok(())
    }

    fn update_user(&self, user: UserRecord) -> Result<(), DirectoryError> {
        let mut state = self.write()?;
        if !state.users.contains_key(&user.id) {
            return Err(DirectoryError::NotFound);
        }
        if !state.roles.contains_key(&user.role_id) {
            return Err(DirectoryError::UnknownRole(user.role_id));
        }
        if state.email_taken(&user.email, user.id) {
            return Err(DirectoryError::Conflict(format!("email '{}' is taken", user.email)));
        }

        let id = user.id;
        let before = state.top_rank_users();
        let previous = state.users.insert(id, user);
        if Self::lost_last_top_rank(before, &state) {
            if let Some(previous) = previous {
                state.users.insert(id, previous);
            }
            return Err(DirectoryError::LastProtectedUser);
        }
        Ok(())
    }

    fn remove_user(&self, id: UserId) -> Result<bool, DirectoryError> {
        let mut state = self.write()?;
        let before = state.top_rank_users();
        let Some(removed) = state.users.remove(&id) else {
            return Ok(false);
        };
        if Self::lost_last_top_rank(before, &state) {
            state.users.insert(id, removed);
            return Err(DirectoryError::LastProtectedUser);
        }
        Ok(true)
    }
}

//! Data-access contracts for users and roles.
//!
//! The authorization layer only depends on these traits; storage lives in
//! `journal-infra` (or whatever ORM-backed adapter a deployment provides).

use std::sync::Arc;

use thiserror::Error;

use journal_core::{RoleId, UserId};

use crate::{Role, User, UserRecord};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("directory unavailable: {0}")]
    Unavailable(String),

    #[error("not found")]
    NotFound,

    #[error("unknown role {0}")]
    UnknownRole(RoleId),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("at least one super admin must remain")]
    LastProtectedUser,
}

/// Read side. Every call observes the current store state; nothing is cached.
pub trait Directory: Send + Sync {
    /// Load a user joined with the current state of its role.
    fn find_user(&self, id: UserId) -> Result<Option<User>, DirectoryError>;
    fn find_role(&self, id: RoleId) -> Result<Option<Role>, DirectoryError>;
    fn count_top_rank_users(&self) -> Result<usize, DirectoryError>;
    fn count_users_with_role(&self, role_id: RoleId) -> Result<usize, DirectoryError>;
    fn list_users(&self) -> Result<Vec<User>, DirectoryError>;
    fn list_roles(&self) -> Result<Vec<Role>, DirectoryError>;
}

/// Write side.
///
/// Implementations must reject any write that would leave zero top-rank
/// users while at least one exists, atomically with the write itself.
pub trait DirectoryMut: Directory {
    fn insert_role(&self, role: Role) -> Result<(), DirectoryError>;
    fn update_role(&self, role: Role) -> Result<(), DirectoryError>;
    /// Fails with `Conflict` while any user still holds the role.
    fn remove_role(&self, id: RoleId) -> Result<bool, DirectoryError>;
    fn insert_user(&self, user: UserRecord) -> Result<(), DirectoryError>;
    fn update_user(&self, user: UserRecord) -> Result<(), DirectoryError>;
    fn remove_user(&self, id: UserId) -> Result<bool, DirectoryError>;
}

impl<S> Directory for Arc<S>
where
    S: Directory + ?Sized,
{
    fn find_user(&self, id: UserId) -> Result<Option<User>, DirectoryError> {
        (**self).find_user(id)
    }

    fn find_role(&self, id: RoleId) -> Result<Option<Role>, DirectoryError> {
        (**self).find_role(id)
    }

    fn count_top_rank_users(&self) -> Result<usize, DirectoryError> {
        (**self).count_top_rank_users()
    }

    fn count_users_with_role(&self, role_id: RoleId) -> Result<usize, DirectoryError> {
        (**self).count_users_with_role(role_id)
    }

    fn list_users(&self) -> Result<Vec<User>, DirectoryError> {
        (**self).list_users()
    }

    fn list_roles(&self) -> Result<Vec<Role>, DirectoryError> {
        (**self).list_roles()
    }
}

impl<S> DirectoryMut for Arc<S>
where
    S: DirectoryMut + ?Sized,
{
    fn insert_role(&self, role: Role) -> Result<(), DirectoryError> {
        (**self).insert_role(role)
    }

    fn update_role(&self, role: Role) -> Result<(), DirectoryError> {
        (**self).update_role(role)
    }

    fn remove_role(&self, id: RoleId) -> Result<bool, DirectoryError> {
        (**self).remove_role(id)
    }

    fn insert_user(&self, user: UserRecord) -> Result<(), DirectoryError> {
        (**self).insert_user(user)
    }

    fn update_user(&self, user: UserRecord) -> Result<(), DirectoryError> {
        (**self).update_user(user)
    }

    fn remove_user(&self, id: UserId) -> Result<bool, DirectoryError> {
        (**self).remove_user(id)
    }
}

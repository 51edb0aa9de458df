//! User accounts as seen by the authorization layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use journal_core::{Entity, RoleId, UserId};

use crate::Role;

/// Stored shape of a user account: the role is referenced, not embedded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role_id: RoleId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn new(name: impl Into<String>, email: impl Into<String>, role_id: RoleId) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            name: name.into(),
            email: email.into(),
            role_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_id(mut self, id: UserId) -> Self {
        self.id = id;
        self
    }
}

/// A user joined with the current state of its role.
///
/// This is what the checker evaluates. It is produced fresh by each directory
/// read, so role edits are visible on the next request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        UserRecord::new(name, email, role.id).with_role(role)
    }

    pub fn with_id(mut self, id: UserId) -> Self {
        self.id = id;
        self
    }

    pub fn record(&self) -> UserRecord {
        UserRecord {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role_id: self.role.id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl UserRecord {
    pub fn with_role(self, role: Role) -> User {
        User {
            id: self.id,
            name: self.name,
            email: self.email,
            role,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

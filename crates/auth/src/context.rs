use serde::{Deserialize, Serialize};
use uuid::Uuid;

use journal_core::UserId;

use crate::{RoleRank, User};

/// Which surface a request came through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessPath {
    /// The admin tables and forms.
    #[default]
    Admin,
    /// The signed-in user's own profile settings page.
    ProfileSettings,
}

/// Facts about the record being acted on, loaded by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetFacts {
    /// Rank of the target role (or of the target user's role).
    pub rank: RoleRank,
    /// Number of users currently holding a top-rank role.
    pub top_rank_holders: usize,
}

/// Ephemeral inputs to a single permission check. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionContext {
    pub resource_id: Option<Uuid>,
    pub actor_id: Option<UserId>,
    pub target: Option<TargetFacts>,
    #[serde(default)]
    pub path: AccessPath,
}

impl PermissionContext {
    pub fn for_resource(resource_id: Uuid) -> Self {
        Self {
            resource_id: Some(resource_id),
            ..Default::default()
        }
    }

    pub fn for_user(user_id: UserId) -> Self {
        Self::for_resource(*user_id.as_uuid())
    }

    pub fn with_actor(mut self, actor_id: UserId) -> Self {
        self.actor_id = Some(actor_id);
        self
    }

    pub fn with_target(mut self, target: TargetFacts) -> Self {
        self.target = Some(target);
        self
    }

    pub fn via(mut self, path: AccessPath) -> Self {
        self.path = path;
        self
    }

    /// The resource being acted on is the user's own account.
    pub fn is_self(&self, user: &User) -> bool {
        self.resource_id.as_ref() == Some(user.id.as_uuid())
    }

    pub fn actor_matches(&self, user: &User) -> bool {
        self.actor_id.is_none_or(|actor| actor == user.id)
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use journal_core::{Entity, RoleId};

use crate::Permission;

/// Ordinal privilege rank of a role.
///
/// Security decisions compare ranks, never display names: a role can be
/// renamed freely without changing who may modify whom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct RoleRank(u8);

impl RoleRank {
    pub const MIN: RoleRank = RoleRank(0);
    /// The protected, Super-Admin-equivalent rank.
    pub const TOP: RoleRank = RoleRank(100);

    /// Ranks above [`RoleRank::TOP`] are clamped to it.
    pub const fn new(value: u8) -> Self {
        if value > Self::TOP.0 { Self::TOP } else { Self(value) }
    }

    pub fn is_top(self) -> bool {
        self >= Self::TOP
    }
}

impl From<u8> for RoleRank {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

impl From<RoleRank> for u8 {
    fn from(rank: RoleRank) -> Self {
        rank.0
    }
}

impl Default for RoleRank {
    fn default() -> Self {
        Self::MIN
    }
}

impl core::fmt::Display for RoleRank {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Named bundle of permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// System roles resolve to the full catalog and cannot be deleted.
    #[serde(default)]
    pub is_system: bool,
    #[serde(default)]
    pub rank: RoleRank,
    /// Stored permission list, in the order an admin saved it.
    #[serde(default)]
    pub permissions: Vec<Permission>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Role {
    pub fn new(name: impl Into<String>, rank: RoleRank) -> Self {
        let now = Utc::now();
        Self {
            id: RoleId::new(),
            name: name.into(),
            description: None,
            is_system: false,
            rank,
            permissions: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_id(mut self, id: RoleId) -> Self {
        self.id = id;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_permissions<I, P>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Permission>,
    {
        self.permissions = permissions.into_iter().map(Into::into).collect();
        self
    }

    /// Mark as a system role. System roles always hold the top rank.
    pub fn system(mut self) -> Self {
        self.is_system = true;
        self.rank = RoleRank::TOP;
        self
    }

    /// Rank used for every security comparison.
    ///
    /// A system role resolves to the full catalog, so it counts as top rank
    /// even when its stored rank says otherwise.
    pub fn effective_rank(&self) -> RoleRank {
        if self.is_system { RoleRank::TOP } else { self.rank }
    }

    /// Holders of a protected role may only be modified by peers of the same rank.
    pub fn is_protected(&self) -> bool {
        self.effective_rank().is_top()
    }
}

impl Entity for Role {
    type Id = RoleId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.name)
    }
}

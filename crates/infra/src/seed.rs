//! Loading a directory from a JSON seed document.
//!
//! ```json
//! { "roles": [ { "id": "...", "name": "Super Admin", "is_system": true, "rank": 100, ... } ],
//!   "users": [ { "id": "...", "name": "...", "email": "...", "role_id": "...", ... } ] }
//! ```

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use journal_auth::{Directory, DirectoryMut, Role, UserRecord, default_roles};

use crate::InMemoryDirectory;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub users: Vec<UserRecord>,
}

impl Seed {
    /// Default role presets and no users.
    pub fn defaults() -> Self {
        Self {
            roles: default_roles(),
            users: Vec::new(),
        }
    }

    pub fn into_directory(self) -> anyhow::Result<InMemoryDirectory> {
        let directory = InMemoryDirectory::new();

        for role in self.roles {
            let name = role.name.clone();
            directory
                .insert_role(role)
                .with_context(|| format!("seeding role '{name}'"))?;
        }
        for user in self.users {
            let email = user.email.clone();
            directory
                .insert_user(user)
                .with_context(|| format!("seeding user '{email}'"))?;
        }

        let users = directory.list_users()?.len();
        if users > 0 && directory.count_top_rank_users()? == 0 {
            tracing::warn!(users, "seeded directory has no top-rank user");
        }
        tracing::info!(
            roles = directory.list_roles()?.len(),
            users,
            "directory seeded"
        );

        Ok(directory)
    }
}

pub fn load_from_str(json: &str) -> anyhow::Result<InMemoryDirectory> {
    let seed: Seed = serde_json::from_str(json).context("parsing directory seed")?;
    seed.into_directory()
}

pub fn load_from_path(path: impl AsRef<Path>) -> anyhow::Result<InMemoryDirectory> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading directory seed {}", path.display()))?;
    load_from_str(&json)
}

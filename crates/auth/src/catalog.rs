//! Closed catalog of permission tokens.
//!
//! Every token the checker will ever grant is enumerated here. Anything that
//! does not parse against the catalog is treated as not granted.

use serde::{Deserialize, Serialize};

use crate::permissions::{Permission, PermissionSet, SYSTEM_PREFIX};

/// Resources managed through the journal's admin surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Article,
    Author,
    BoardMember,
    Issue,
    Cfp,
    Notification,
    User,
    Role,
}

impl Resource {
    pub const ALL: [Resource; 8] = [
        Resource::Article,
        Resource::Author,
        Resource::BoardMember,
        Resource::Issue,
        Resource::Cfp,
        Resource::Notification,
        Resource::User,
        Resource::Role,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Resource::Article => "article",
            Resource::Author => "author",
            Resource::BoardMember => "board_member",
            Resource::Issue => "issue",
            Resource::Cfp => "cfp",
            Resource::Notification => "notification",
            Resource::User => "user",
            Resource::Role => "role",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == s)
    }

    /// Published journal content (as opposed to accounts and roles).
    pub fn is_content(self) -> bool {
        !matches!(self, Resource::User | Resource::Role)
    }

    fn label(self) -> &'static str {
        match self {
            Resource::Article => "articles",
            Resource::Author => "authors",
            Resource::BoardMember => "editorial board members",
            Resource::Issue => "journal issues",
            Resource::Cfp => "call-for-papers notices",
            Resource::Notification => "notifications",
            Resource::User => "user accounts",
            Resource::Role => "roles",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Create, Action::Read, Action::Update, Action::Delete];

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Create => "CREATE",
            Action::Read => "READ",
            Action::Update => "UPDATE",
            Action::Delete => "DELETE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == s)
    }

    /// Anything but `READ` changes stored state.
    pub fn is_mutation(self) -> bool {
        !matches!(self, Action::Read)
    }
}

/// Coarse-grained permissions that imply sets of fine-grained tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SystemPermission {
    Admin,
    UserManagement,
    RoleManagement,
    ContentManagement,
}

impl SystemPermission {
    pub const ALL: [SystemPermission; 4] = [
        SystemPermission::Admin,
        SystemPermission::UserManagement,
        SystemPermission::RoleManagement,
        SystemPermission::ContentManagement,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SystemPermission::Admin => "SYSTEM.ADMIN",
            SystemPermission::UserManagement => "SYSTEM.USER_MANAGEMENT",
            SystemPermission::RoleManagement => "SYSTEM.ROLE_MANAGEMENT",
            SystemPermission::ContentManagement => "SYSTEM.CONTENT_MANAGEMENT",
        }
    }

    pub fn token(self) -> Permission {
        Permission::from_static(self.as_str())
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == s)
    }

    /// Whether this system permission implies every action on `resource`.
    pub fn covers(self, resource: Resource) -> bool {
        match self {
            SystemPermission::Admin => true,
            SystemPermission::UserManagement => resource == Resource::User,
            SystemPermission::RoleManagement => resource == Resource::Role,
            SystemPermission::ContentManagement => resource.is_content(),
        }
    }
}

/// A token that parsed against the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogEntry {
    Scoped(Resource, Action),
    System(SystemPermission),
}

pub fn parse(token: &str) -> Option<CatalogEntry> {
    if token.starts_with(SYSTEM_PREFIX) {
        return SystemPermission::parse(token).map(CatalogEntry::System);
    }

    let (resource, action) = token.split_once('.')?;
    Some(CatalogEntry::Scoped(Resource::parse(resource)?, Action::parse(action)?))
}

pub fn scoped(resource: Resource, action: Action) -> Permission {
    Permission::new(format!("{}.{}", resource.as_str(), action.as_str()))
}

pub fn is_valid_permission(token: &str) -> bool {
    parse(token).is_some()
}

/// Fine-grained (and, for `SYSTEM.ADMIN`, system) tokens implied by a system
/// token. Returns an empty set for anything that is not a known system token.
pub fn expand_system_permission(token: &str) -> PermissionSet {
    let Some(CatalogEntry::System(system)) = parse(token) else {
        return PermissionSet::new();
    };

    let mut expanded: PermissionSet = Resource::ALL
        .into_iter()
        .filter(|r| system.covers(*r))
        .flat_map(|r| Action::ALL.into_iter().map(move |a| scoped(r, a)))
        .collect();

    if system == SystemPermission::Admin {
        expanded.extend(
            SystemPermission::ALL
                .into_iter()
                .filter(|s| *s != SystemPermission::Admin)
                .map(SystemPermission::token),
        );
    }

    expanded
}

/// System tokens whose holders implicitly hold `token`.
pub fn subsuming_system_permissions(token: &str) -> Vec<Permission> {
    match parse(token) {
        Some(CatalogEntry::Scoped(resource, _)) => SystemPermission::ALL
            .into_iter()
            .filter(|s| s.covers(resource))
            .map(SystemPermission::token)
            .collect(),
        Some(CatalogEntry::System(SystemPermission::Admin)) | None => Vec::new(),
        Some(CatalogEntry::System(_)) => vec![SystemPermission::Admin.token()],
    }
}

/// Every token in the catalog, scoped tokens first, in catalog order.
pub fn all_permissions() -> Vec<Permission> {
    Resource::ALL
        .into_iter()
        .flat_map(|r| Action::ALL.into_iter().map(move |a| scoped(r, a)))
        .chain(SystemPermission::ALL.into_iter().map(SystemPermission::token))
        .collect()
}

pub fn describe(token: &str) -> Option<String> {
    match parse(token)? {
        CatalogEntry::Scoped(resource, action) => {
            let verb = match action {
                Action::Create => "Create new",
                Action::Read => "View/list",
                Action::Update => "Edit existing",
                Action::Delete => "Delete",
            };
            Some(format!("{verb} {}", resource.label()))
        }
        CatalogEntry::System(SystemPermission::Admin) => {
            Some("Full system administration (implies every permission)".to_string())
        }
        CatalogEntry::System(system) => {
            let covered: Vec<&str> = Resource::ALL
                .into_iter()
                .filter(|r| system.covers(*r))
                .map(Resource::label)
                .collect();
            Some(format!("Manage {}", covered.join(", ")))
        }
    }
}

pub fn category(token: &str) -> Option<&'static str> {
    match parse(token)? {
        CatalogEntry::Scoped(resource, _) => Some(resource.as_str()),
        CatalogEntry::System(_) => Some("system"),
    }
}

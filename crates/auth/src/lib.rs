//! `journal-auth` — permission catalog, role resolution and the single
//! permission checker used by every page and admin action.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod authorizer;
pub mod catalog;
pub mod check;
pub mod context;
pub mod directory;
pub mod explain;
pub mod overrides;
pub mod permissions;
pub mod registry;
pub mod resolver;
pub mod roles;
pub mod scope;
pub mod user;

pub use authorizer::{AccessGuard, AccessRequest, Authorizer, Target};
pub use catalog::{Action, Resource, SystemPermission, expand_system_permission, is_valid_permission};
pub use check::{AccessDenied, DenialKind, Grant, PermissionCheckResult, check_permission, has_permission};
pub use context::{AccessPath, PermissionContext, TargetFacts};
pub use directory::{Directory, DirectoryError, DirectoryMut};
pub use explain::{CheckExplanation, explain_check};
pub use permissions::{Permission, PermissionSet, tokens};
pub use registry::{RbacRegistry, default_roles};
pub use resolver::effective_permissions;
pub use roles::{Role, RoleRank};
pub use scope::RequestScope;
pub use user::{User, UserRecord};

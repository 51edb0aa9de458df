//! `journal-admin` — user and role administration.
//!
//! Every action asks an [`journal_auth::AccessGuard`] first and only touches
//! the directory once the guard allowed it.

pub mod dto;
pub mod errors;
pub mod roles;
pub mod users;
pub mod validate;

pub use dto::{NewRole, NewUser, ProfileUpdate, UserUpdate};
pub use errors::{AdminError, AdminResult};
pub use roles::RoleAdmin;
pub use users::UserAdmin;

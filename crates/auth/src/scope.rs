use journal_core::UserId;

use crate::{Directory, DirectoryError, User};

/// Request-scoped identity.
///
/// Resolved once from the session's user id at the start of a request and then
/// passed explicitly to every check made while serving it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestScope {
    actor: Option<User>,
}

impl RequestScope {
    pub fn anonymous() -> Self {
        Self { actor: None }
    }

    pub fn authenticated(user: User) -> Self {
        Self { actor: Some(user) }
    }

    /// Load the session user from the directory.
    ///
    /// A session pointing at a user that no longer exists yields an anonymous
    /// scope; a failed lookup is returned as an error.
    pub fn resolve<D>(directory: &D, session_user: Option<UserId>) -> Result<Self, DirectoryError>
    where
        D: Directory + ?Sized,
    {
        let Some(user_id) = session_user else {
            return Ok(Self::anonymous());
        };

        match directory.find_user(user_id)? {
            Some(user) => Ok(Self::authenticated(user)),
            None => {
                tracing::debug!(%user_id, "session user not found; treating as anonymous");
                Ok(Self::anonymous())
            }
        }
    }

    pub fn actor(&self) -> Option<&User> {
        self.actor.as_ref()
    }

    pub fn actor_id(&self) -> Option<UserId> {
        self.actor.as_ref().map(|u| u.id)
    }
}

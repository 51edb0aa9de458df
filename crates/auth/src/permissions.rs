use std::borrow::Cow;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use journal_core::ValueObject;

/// Permission token.
///
/// Tokens are `resource.ACTION` (e.g. `"article.CREATE"`) or coarse system
/// tokens (`"SYSTEM.USER_MANAGEMENT"`). The type itself accepts any string so
/// stored role data round-trips unchanged; validity is decided by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

/// Deduplicated, ordered set of permission tokens.
pub type PermissionSet = BTreeSet<Permission>;

pub(crate) const SYSTEM_PREFIX: &str = "SYSTEM.";

impl Permission {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_system(&self) -> bool {
        self.as_str().starts_with(SYSTEM_PREFIX)
    }
}

impl ValueObject for Permission {}

impl AsRef<str> for Permission {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<&'static str> for Permission {
    fn from(value: &'static str) -> Self {
        Self::from_static(value)
    }
}

impl From<String> for Permission {
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Well-known tokens, so call sites never spell permission strings by hand.
pub mod tokens {
    use super::Permission;

    macro_rules! tokens {
        ($($name:ident => $token:literal),* $(,)?) => {
            $(pub const $name: Permission = Permission::from_static($token);)*
        };
    }

    tokens! {
        ARTICLE_CREATE => "article.CREATE",
        ARTICLE_READ => "article.READ",
        ARTICLE_UPDATE => "article.UPDATE",
        ARTICLE_DELETE => "article.DELETE",
        AUTHOR_CREATE => "author.CREATE",
        AUTHOR_READ => "author.READ",
        AUTHOR_UPDATE => "author.UPDATE",
        AUTHOR_DELETE => "author.DELETE",
        BOARD_MEMBER_CREATE => "board_member.CREATE",
        BOARD_MEMBER_READ => "board_member.READ",
        BOARD_MEMBER_UPDATE => "board_member.UPDATE",
        BOARD_MEMBER_DELETE => "board_member.DELETE",
        ISSUE_CREATE => "issue.CREATE",
        ISSUE_READ => "issue.READ",
        ISSUE_UPDATE => "issue.UPDATE",
        ISSUE_DELETE => "issue.DELETE",
        CFP_CREATE => "cfp.CREATE",
        CFP_READ => "cfp.READ",
        CFP_UPDATE => "cfp.UPDATE",
        CFP_DELETE => "cfp.DELETE",
        NOTIFICATION_CREATE => "notification.CREATE",
        NOTIFICATION_READ => "notification.READ",
        NOTIFICATION_UPDATE => "notification.UPDATE",
        NOTIFICATION_DELETE => "notification.DELETE",
        USER_CREATE => "user.CREATE",
        USER_READ => "user.READ",
        USER_UPDATE => "user.UPDATE",
        USER_DELETE => "user.DELETE",
        ROLE_CREATE => "role.CREATE",
        ROLE_READ => "role.READ",
        ROLE_UPDATE => "role.UPDATE",
        ROLE_DELETE => "role.DELETE",

        SYSTEM_ADMIN => "SYSTEM.ADMIN",
        SYSTEM_USER_MANAGEMENT => "SYSTEM.USER_MANAGEMENT",
        SYSTEM_ROLE_MANAGEMENT => "SYSTEM.ROLE_MANAGEMENT",
        SYSTEM_CONTENT_MANAGEMENT => "SYSTEM.CONTENT_MANAGEMENT",
    }
}

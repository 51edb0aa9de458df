//! The single authorization decision point.
//!
//! - No IO
//! - No panics
//! - Denial is a return value, not an error

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog;
use crate::{Permission, PermissionContext, PermissionSet, User, overrides, resolver};

/// Why a check was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    Unauthenticated,
    UnknownPermission,
    InsufficientPermission,
    ActorMismatch,
    SelfMutation,
    ProtectedRole,
    LastAdmin,
    LookupFailed,
}

impl DenialKind {
    /// User-presentable reason, shown verbatim by pages and actions.
    pub fn reason(self) -> &'static str {
        match self {
            DenialKind::Unauthenticated => "authentication required",
            DenialKind::UnknownPermission => "unknown permission",
            DenialKind::InsufficientPermission => "insufficient permissions",
            DenialKind::ActorMismatch => "request actor does not match the signed-in user",
            DenialKind::SelfMutation => "use your profile settings to change your own account",
            DenialKind::ProtectedRole => "cannot modify a user with a higher-privileged role",
            DenialKind::LastAdmin => "cannot delete the last super admin",
            DenialKind::LookupFailed => "permission lookup failed",
        }
    }

    /// Denials raised by a contextual rule rather than a missing grant.
    pub fn is_contextual(self) -> bool {
        matches!(
            self,
            DenialKind::ActorMismatch
                | DenialKind::SelfMutation
                | DenialKind::ProtectedRole
                | DenialKind::LastAdmin
        )
    }
}

impl core::fmt::Display for DenialKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.reason())
    }
}

/// How an allowed check was satisfied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "via", content = "permission")]
pub enum Grant {
    /// The role holds the token itself.
    Direct(Permission),
    /// A system token held by the role subsumes the requested one.
    Implied(Permission),
    /// The self-access exception applied.
    SelfAccess,
}

/// Outcome of a single check. Produced fresh per call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionCheckResult {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub denial: Option<DenialKind>,
}

impl PermissionCheckResult {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
            denial: None,
        }
    }

    pub fn deny(kind: DenialKind) -> Self {
        Self {
            allowed: false,
            reason: Some(kind.reason().to_string()),
            denial: Some(kind),
        }
    }

    /// Convert into a `Result` for callers that propagate with `?`.
    pub fn ensure(self) -> Result<(), AccessDenied> {
        match self.denial {
            None if self.allowed => Ok(()),
            kind => {
                let kind = kind.unwrap_or(DenialKind::InsufficientPermission);
                Err(AccessDenied {
                    kind,
                    reason: self.reason.unwrap_or_else(|| kind.reason().to_string()),
                })
            }
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct AccessDenied {
    pub kind: DenialKind,
    pub reason: String,
}

pub(crate) struct Evaluation {
    pub result: PermissionCheckResult,
    pub effective: Option<PermissionSet>,
    pub grant: Option<Grant>,
}

impl Evaluation {
    fn denied(kind: DenialKind, effective: Option<PermissionSet>) -> Self {
        Self {
            result: PermissionCheckResult::deny(kind),
            effective,
            grant: None,
        }
    }
}

pub(crate) fn evaluate(
    user: Option<&User>,
    token: &str,
    ctx: Option<&PermissionContext>,
) -> Evaluation {
    let Some(user) = user else {
        return Evaluation::denied(DenialKind::Unauthenticated, None);
    };

    let effective = resolver::effective_permissions(&user.role);

    let Some(entry) = catalog::parse(token) else {
        return Evaluation::denied(DenialKind::UnknownPermission, Some(effective));
    };

    let default_ctx = PermissionContext::default();
    let ctx = ctx.unwrap_or(&default_ctx);

    let grant = match resolver::granting_permission(&effective, token) {
        Some(p) if p.as_str() == token => Some(Grant::Direct(p)),
        Some(p) => Some(Grant::Implied(p)),
        None if overrides::self_access(user, entry, ctx) => Some(Grant::SelfAccess),
        None => None,
    };

    if let Some(kind) = overrides::first_denial(user, entry, ctx) {
        return Evaluation::denied(kind, Some(effective));
    }

    match grant {
        Some(grant) => Evaluation {
            result: PermissionCheckResult::allow(),
            effective: Some(effective),
            grant: Some(grant),
        },
        None => Evaluation::denied(DenialKind::InsufficientPermission, Some(effective)),
    }
}

/// Decide whether `user` may perform `token` in `ctx`.
///
/// `None` for `user` means unauthenticated. Safe to call speculatively, e.g.
/// once per button to decide whether to render it.
pub fn check_permission(
    user: Option<&User>,
    token: impl AsRef<str>,
    ctx: Option<&PermissionContext>,
) -> PermissionCheckResult {
    let token = token.as_ref();
    let result = evaluate(user, token, ctx).result;

    tracing::debug!(
        user_id = user.map(|u| u.id.to_string()),
        permission = token,
        allowed = result.allowed,
        reason = result.reason.as_deref(),
        contextual = result.denial.is_some_and(DenialKind::is_contextual),
        "permission check"
    );

    result
}

/// Boolean shorthand over [`check_permission`] with no context.
pub fn has_permission(user: Option<&User>, token: impl AsRef<str>) -> bool {
    check_permission(user, token, None).allowed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AccessPath, Role, RoleRank, TargetFacts, tokens};
    use journal_core::UserId;
    use proptest::prelude::*;

    fn user_with(role: Role) -> User {
        User::new("Test User", "test@example.org", role)
    }

    fn viewer() -> User {
        user_with(Role::new("Viewer", RoleRank::new(10)).with_permissions(["article.READ"]))
    }

    fn super_admin() -> User {
        user_with(Role::new("Super Admin", RoleRank::TOP).system())
    }

    fn editor_with_user_update() -> User {
        user_with(
            Role::new("Editor", RoleRank::new(50))
                .with_permissions([tokens::USER_UPDATE, tokens::USER_READ]),
        )
    }

    #[test]
    fn unauthenticated_is_denied() {
        let result = check_permission(None, tokens::ARTICLE_READ, None);
        assert!(!result.allowed);
        assert_eq!(result.reason.as_deref(), Some("authentication required"));
        assert_eq!(result.denial, Some(DenialKind::Unauthenticated));
    }

    #[test]
    fn only_override_denials_are_contextual() {
        assert!(DenialKind::SelfMutation.is_contextual());
        assert!(DenialKind::LastAdmin.is_contextual());
        assert!(!DenialKind::InsufficientPermission.is_contextual());
        assert!(!DenialKind::LookupFailed.is_contextual());
    }

    #[test]
    fn viewer_cannot_create_articles() {
        let result = check_permission(Some(&viewer()), "article.CREATE", None);
        assert_eq!(
            result,
            PermissionCheckResult {
                allowed: false,
                reason: Some("insufficient permissions".to_string()),
                denial: Some(DenialKind::InsufficientPermission),
            }
        );
    }

    #[test]
    fn super_admin_can_delete_notifications() {
        let result = check_permission(Some(&super_admin()), "notification.DELETE", None);
        assert!(result.allowed);
        assert_eq!(result.reason, None);
    }

    #[test]
    fn unknown_tokens_fail_closed_even_for_super_admin() {
        let result = check_permission(Some(&super_admin()), "article.PUBLISH", None);
        assert!(!result.allowed);
        assert_eq!(result.denial, Some(DenialKind::UnknownPermission));
    }

    #[test]
    fn self_read_without_base_permission() {
        let user = user_with(Role::new("Nobody", RoleRank::MIN));
        let ctx = PermissionContext::for_user(user.id);
        assert!(check_permission(Some(&user), "user.READ", Some(&ctx)).allowed);
        assert!(!check_permission(Some(&user), "user.READ", None).allowed);
    }

    #[test]
    fn self_delete_is_denied_with_specific_reason() {
        let admin = super_admin();
        let ctx = PermissionContext::for_user(admin.id);
        let result = check_permission(Some(&admin), tokens::USER_DELETE, Some(&ctx));
        assert!(!result.allowed);
        assert_eq!(result.denial, Some(DenialKind::SelfMutation));
    }

    #[test]
    fn self_update_goes_through_profile_settings() {
        let user = viewer();
        let admin_ctx = PermissionContext::for_user(user.id);
        let profile_ctx = admin_ctx.clone().via(AccessPath::ProfileSettings);

        let via_admin = check_permission(Some(&user), tokens::USER_UPDATE, Some(&admin_ctx));
        assert_eq!(via_admin.denial, Some(DenialKind::SelfMutation));

        assert!(check_permission(Some(&user), tokens::USER_UPDATE, Some(&profile_ctx)).allowed);
    }

    #[test]
    fn editor_cannot_update_super_admin() {
        let editor = editor_with_user_update();
        let target = super_admin();
        let ctx = PermissionContext::for_user(target.id).with_target(TargetFacts {
            rank: target.role.rank,
            top_rank_holders: 2,
        });

        let result = check_permission(Some(&editor), "user.UPDATE", Some(&ctx));
        assert!(!result.allowed);
        assert_eq!(result.denial, Some(DenialKind::ProtectedRole));

        assert!(check_permission(Some(&editor), "user.READ", Some(&ctx)).allowed);
    }

    #[test]
    fn sole_super_admin_cannot_be_deleted_by_another_super_admin() {
        let actor = super_admin();
        let target_ctx = |holders| {
            PermissionContext::for_user(UserId::new()).with_target(TargetFacts {
                rank: RoleRank::TOP,
                top_rank_holders: holders,
            })
        };

        let sole = check_permission(Some(&actor), tokens::USER_DELETE, Some(&target_ctx(1)));
        assert_eq!(sole.denial, Some(DenialKind::LastAdmin));

        assert!(check_permission(Some(&actor), tokens::USER_DELETE, Some(&target_ctx(2))).allowed);
    }

    #[test]
    fn implied_grant_through_system_token() {
        let user = user_with(
            Role::new("Admin", RoleRank::new(80))
                .with_permissions([tokens::SYSTEM_CONTENT_MANAGEMENT]),
        );
        assert!(has_permission(Some(&user), tokens::CFP_DELETE));
        assert!(!has_permission(Some(&user), tokens::ROLE_UPDATE));
    }

    #[test]
    fn ensure_maps_denial_to_error() {
        let err = check_permission(Some(&viewer()), tokens::ISSUE_CREATE, None)
            .ensure()
            .unwrap_err();
        assert_eq!(err.kind, DenialKind::InsufficientPermission);
        assert_eq!(err.to_string(), "insufficient permissions");

        assert!(PermissionCheckResult::allow().ensure().is_ok());
    }

    #[test]
    fn serializes_without_empty_fields() {
        let json = serde_json::to_value(PermissionCheckResult::allow()).unwrap();
        assert_eq!(json, serde_json::json!({ "allowed": true }));
    }

    fn catalog_token() -> impl Strategy<Value = Permission> {
        let all = catalog::all_permissions();
        (0..all.len()).prop_map(move |i| all[i].clone())
    }

    fn arbitrary_role() -> impl Strategy<Value = Role> {
        (
            any::<bool>(),
            0u8..=100,
            prop::collection::vec(catalog_token(), 0..8),
        )
            .prop_map(|(is_system, rank, permissions)| {
                let role = Role::new("Generated", RoleRank::new(rank)).with_permissions(permissions);
                if is_system { role.system() } else { role }
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// An empty, non-system role is denied everything outside self-read.
        #[test]
        fn empty_role_denies_everything(token in catalog_token(), rank in 0u8..=100) {
            let user = user_with(Role::new("Empty", RoleRank::new(rank)));
            prop_assert!(!check_permission(Some(&user), &token, None).allowed);
        }

        /// A system role holds every catalog token.
        #[test]
        fn system_role_allows_whole_catalog(token in catalog_token()) {
            prop_assert!(check_permission(Some(&super_admin()), &token, None).allowed);
        }

        /// Nobody can delete their own account, on any path.
        #[test]
        fn self_delete_always_denied(role in arbitrary_role(), profile in any::<bool>()) {
            let user = user_with(role);
            let path = if profile { AccessPath::ProfileSettings } else { AccessPath::Admin };
            let ctx = PermissionContext::for_user(user.id).via(path);
            prop_assert!(!check_permission(Some(&user), tokens::USER_DELETE, Some(&ctx)).allowed);
        }

        /// Identical inputs yield identical decisions.
        #[test]
        fn checks_are_idempotent(role in arbitrary_role(), token in catalog_token(), self_target in any::<bool>()) {
            let user = user_with(role);
            let ctx = if self_target {
                PermissionContext::for_user(user.id)
            } else {
                PermissionContext::for_user(UserId::new())
            };
            let first = check_permission(Some(&user), &token, Some(&ctx));
            let second = check_permission(Some(&user), &token, Some(&ctx));
            prop_assert_eq!(first, second);
        }

        /// Every denial carries a reason, every allow carries none.
        #[test]
        fn reason_present_iff_denied(role in arbitrary_role(), token in catalog_token()) {
            let user = user_with(role);
            let result = check_permission(Some(&user), &token, None);
            prop_assert_eq!(result.reason.is_some(), !result.allowed);
        }
    }
}

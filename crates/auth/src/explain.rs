// ─────────────────────────────────────────────────────────────────────────────
// Authorization Explanation (Audit Trail)
// ─────────────────────────────────────────────────────────────────────────────

use serde::Serialize;

use journal_core::{RoleId, UserId};

use crate::catalog;
use crate::check::{self, DenialKind, Grant};
use crate::{PermissionContext, RoleRank, User};

/// Detailed explanation of an authorization decision.
///
/// Answers "why was this allowed/denied?" for admin tooling and logs. The
/// decision always matches [`check::check_permission`] for the same inputs.
#[derive(Debug, Clone, Serialize)]
pub struct CheckExplanation {
    pub required_permission: String,
    pub allowed: bool,
    /// Human-readable reason for the decision.
    pub reason: String,
    pub granted_via: Option<Grant>,
    pub actor: Option<ActorState>,
    pub denial: Option<DenialDetail>,
}

/// Snapshot of the acting user at decision time.
#[derive(Debug, Clone, Serialize)]
pub struct ActorState {
    pub user_id: UserId,
    pub role_id: RoleId,
    pub role_name: String,
    pub role_rank: RoleRank,
    pub is_system_role: bool,
    pub effective_permissions: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DenialDetail {
    pub kind: DenialKind,
    pub message: String,
    pub suggestions: Vec<String>,
}

pub fn explain_check(
    user: Option<&User>,
    token: &str,
    ctx: Option<&PermissionContext>,
) -> CheckExplanation {
    let evaluation = check::evaluate(user, token, ctx);

    let actor = user.map(|u| ActorState {
        user_id: u.id,
        role_id: u.role.id,
        role_name: u.role.name.clone(),
        role_rank: u.role.effective_rank(),
        is_system_role: u.role.is_system,
        effective_permissions: evaluation
            .effective
            .iter()
            .flatten()
            .map(|p| p.as_str().to_string())
            .collect(),
    });

    let reason = match (&evaluation.grant, evaluation.result.denial) {
        (_, Some(kind)) => kind.reason().to_string(),
        (Some(Grant::Direct(p)), None) => format!("role holds '{p}'"),
        (Some(Grant::Implied(p)), None) => format!("'{token}' is implied by '{p}'"),
        (Some(Grant::SelfAccess), None) => "own account".to_string(),
        (None, None) => "allowed".to_string(),
    };

    CheckExplanation {
        required_permission: token.to_string(),
        allowed: evaluation.result.allowed,
        reason,
        granted_via: evaluation.grant,
        actor,
        denial: evaluation.result.denial.map(|kind| DenialDetail {
            kind,
            message: denial_message(kind, token),
            suggestions: suggestions(kind, token),
        }),
    }
}

fn denial_message(kind: DenialKind, token: &str) -> String {
    match kind {
        DenialKind::InsufficientPermission => format!("missing required permission '{token}'"),
        DenialKind::UnknownPermission => format!("'{token}' is not in the permission catalog"),
        other => other.reason().to_string(),
    }
}

fn suggestions(kind: DenialKind, token: &str) -> Vec<String> {
    match kind {
        DenialKind::Unauthenticated => vec!["Sign in and retry".to_string()],
        DenialKind::UnknownPermission => {
            vec!["Check the token spelling: tokens are 'resource.ACTION' or 'SYSTEM.<NAME>'".to_string()]
        }
        DenialKind::InsufficientPermission => {
            let mut out = vec![format!("Assign a role that grants '{token}'")];
            out.extend(
                catalog::subsuming_system_permissions(token)
                    .into_iter()
                    .map(|system| format!("Or grant '{system}', which implies it")),
            );
            out
        }
        DenialKind::SelfMutation => vec!["Use the profile settings page".to_string()],
        DenialKind::ProtectedRole => {
            vec!["Ask a user of equal or higher rank to make this change".to_string()]
        }
        DenialKind::LastAdmin => vec!["Promote another user to super admin first".to_string()],
        DenialKind::ActorMismatch | DenialKind::LookupFailed => Vec::new(),
    }
}

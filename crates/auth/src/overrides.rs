//! Contextual rules layered on top of the base permission lookup.
//!
//! Each rule is an independent predicate. The checker consults the single
//! allow-upgrade first, then the denials in the order of [`first_denial`].

use crate::catalog::{Action, CatalogEntry, Resource};
use crate::check::DenialKind;
use crate::{AccessPath, PermissionContext, User};

/// Reading one's own records is always allowed, and so is editing one's own
/// account through the profile-settings flow.
pub fn self_access(user: &User, entry: CatalogEntry, ctx: &PermissionContext) -> bool {
    if !ctx.is_self(user) {
        return false;
    }

    match entry {
        CatalogEntry::Scoped(_, Action::Read) => true,
        CatalogEntry::Scoped(Resource::User, Action::Update) => ctx.path == AccessPath::ProfileSettings,
        _ => false,
    }
}

/// Users cannot delete themselves, and cannot edit themselves through the
/// admin tables.
pub fn self_mutation(user: &User, entry: CatalogEntry, ctx: &PermissionContext) -> bool {
    if !ctx.is_self(user) {
        return false;
    }

    match entry {
        CatalogEntry::Scoped(Resource::User, Action::Delete) => true,
        CatalogEntry::Scoped(Resource::User, Action::Update) => ctx.path == AccessPath::Admin,
        _ => false,
    }
}

/// Accounts and roles ranked above the actor cannot be created, edited or
/// deleted by that actor.
pub fn higher_ranked_target(user: &User, entry: CatalogEntry, ctx: &PermissionContext) -> bool {
    let CatalogEntry::Scoped(resource @ (Resource::User | Resource::Role), action) = entry else {
        return false;
    };
    if !action.is_mutation() {
        return false;
    }

    match ctx.target {
        Some(target) => {
            let actor_rank = user.role.effective_rank();
            let outranked = target.rank > actor_rank;
            if outranked {
                tracing::debug!(
                    user_id = %user.id,
                    resource = resource.as_str(),
                    actor_rank = %actor_rank,
                    target_rank = %target.rank,
                    "target outranks actor"
                );
            }
            outranked
        }
        None => false,
    }
}

/// The sole holder of the top rank cannot be deleted, by anyone.
pub fn last_admin(entry: CatalogEntry, ctx: &PermissionContext) -> bool {
    if entry != CatalogEntry::Scoped(Resource::User, Action::Delete) {
        return false;
    }

    ctx.target
        .is_some_and(|target| target.rank.is_top() && target.top_rank_holders <= 1)
}

pub fn first_denial(user: &User, entry: CatalogEntry, ctx: &PermissionContext) -> Option<DenialKind> {
    if !ctx.actor_matches(user) {
        return Some(DenialKind::ActorMismatch);
    }
    if self_mutation(user, entry, ctx) {
        return Some(DenialKind::SelfMutation);
    }
    if higher_ranked_target(user, entry, ctx) {
        return Some(DenialKind::ProtectedRole);
    }
    if last_admin(entry, ctx) {
        return Some(DenialKind::LastAdmin);
    }
    None
}

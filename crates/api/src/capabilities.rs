// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Capability computation for authorization-aware UI gating.
//!
//! Capabilities expose what actions an operator is permitted to perform.
//! They are advisory only and do not replace backend authorization checks.

use repatria_domain::Role;

use crate::auth::AuthenticatedActor;
use crate::request_response::{Capabilities, Capability};

/// Computes the capabilities of an authenticated operator from its role.
#[must_use]
pub const fn compute_capabilities(actor: &AuthenticatedActor) -> Capabilities {
    let role: Role = actor.role;
    let admin: Capability = Capability::from_bool(role.is_admin());

    Capabilities {
        can_register_repatriants: Capability::from_bool(role.can_register_repatriants()),
        can_view_social: Capability::from_bool(role.can_view_social()),
        can_view_housing: Capability::from_bool(role.can_view_housing()),
        can_manage_housing_queue: Capability::from_bool(role.can_view_housing()),
        can_manage_users: admin,
        can_view_logs: admin,
        can_view_reports: admin,
        can_export: admin,
        can_view_storage: admin,
        can_restore_records: admin,
    }
}

/// Computes whether `actor` may toggle or delete `target_user_id`.
///
/// Admins may act on every account except their own.
#[must_use]
pub const fn compute_user_capabilities(
    actor: &AuthenticatedActor,
    target_user_id: i64,
) -> (Capability, Capability) {
    let allowed: bool = actor.role.is_admin() && actor.user_id != target_user_id;
    (Capability::from_bool(allowed), Capability::from_bool(allowed))
}

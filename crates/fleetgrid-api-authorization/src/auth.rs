//! Caller identity and the capability guard for management endpoints.
//!
//! Identity resolution is external: the surrounding application's session
//! middleware authenticates the request and installs an [`AuthContext`]
//! extension with the resolved user and organization. This crate only
//! consumes it.

use fleetgrid_core::{OrganizationId, UserId};
use fleetgrid_db::AccessLevel;

use crate::error::{ApiError, ApiResult};
use crate::router::AuthorizationState;

/// The resolved caller: who is acting, and in which organization.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// The authenticated user.
    pub user_id: UserId,

    /// The organization the request is scoped to.
    pub organization_id: OrganizationId,
}

impl AuthContext {
    /// Build a context from resolved identifiers.
    #[must_use]
    pub fn new(user_id: UserId, organization_id: OrganizationId) -> Self {
        Self {
            user_id,
            organization_id,
        }
    }
}

/// Require the caller to hold `capability_key` at `required_level`.
///
/// The guard runs through the same evaluator as every other check, so the
/// management surface is governed by the engine it manages.
pub async fn require_capability(
    state: &AuthorizationState,
    ctx: &AuthContext,
    capability_key: &str,
    required_level: AccessLevel,
) -> ApiResult<()> {
    let allowed = state
        .evaluator
        .check(
            *ctx.user_id.as_uuid(),
            *ctx.organization_id.as_uuid(),
            capability_key,
            required_level,
        )
        .await;

    if allowed {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

/// Require a bypass role (owner / super_admin).
///
/// Only the catalog-seeding bootstrap uses this: seeding must be possible
/// before any grant rows exist, so it cannot be governed by a capability.
pub async fn require_bypass(state: &AuthorizationState, ctx: &AuthContext) -> ApiResult<()> {
    let allowed = state
        .evaluator
        .has_bypass_role(*ctx.user_id.as_uuid(), *ctx.organization_id.as_uuid())
        .await?;

    if allowed {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

//! The evaluation hot path.
//!
//! [`AccessEvaluator::check`] answers allow/deny for one capability check
//! and never errors across its boundary: any storage failure degrades to
//! deny with a warning, never to allow. There is no cache in front of the
//! grant store; the only staleness is the store's own read-committed
//! isolation window.

use std::collections::BTreeMap;

use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use fleetgrid_db::{AccessLevel, Capability, RoleCapabilityGrant, UserOrganization};

use crate::error::Result;

/// Role keys that pass every capability check without grant rows.
///
/// If full grants are also seeded for these roles for audit purposes, the
/// seeded rows and this bypass must agree; the bypass is checked first so
/// they cannot disagree in effect.
pub const BYPASS_ROLE_KEYS: [&str; 2] = ["owner", "super_admin"];

/// Where a decision came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    /// The caller's role bypasses per-capability checks.
    BypassRole,
    /// A grant row was found and compared against the required level.
    Grant,
    /// The caller has no active role in the organization.
    NoAssignment,
    /// The caller's role holds no grant for the capability.
    NoGrant,
    /// A storage failure forced a fail-closed deny.
    StorageFailure,
}

impl std::fmt::Display for DecisionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BypassRole => write!(f, "bypass_role"),
            Self::Grant => write!(f, "grant"),
            Self::NoAssignment => write!(f, "no_assignment"),
            Self::NoGrant => write!(f, "no_grant"),
            Self::StorageFailure => write!(f, "storage_failure"),
        }
    }
}

/// The outcome of a capability check, with enough context for audit logs.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AccessDecision {
    /// Whether the action is allowed.
    pub allowed: bool,

    /// Human-readable reason for the decision.
    pub reason: String,

    /// What produced the decision.
    pub source: DecisionSource,
}

impl AccessDecision {
    fn deny(reason: impl Into<String>, source: DecisionSource) -> Self {
        Self {
            allowed: false,
            reason: reason.into(),
            source,
        }
    }

    fn allow(reason: impl Into<String>, source: DecisionSource) -> Self {
        Self {
            allowed: true,
            reason: reason.into(),
            source,
        }
    }
}

/// A user's effective strength for one capability.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct EffectiveCapability {
    /// Effective access level.
    pub access_level: AccessLevel,

    /// Opaque constraints attached to the grant, if any.
    pub constraints: Option<serde_json::Value>,
}

/// Read-only evaluator over the role-assignment mapping and grant store.
#[derive(Clone)]
pub struct AccessEvaluator {
    pool: PgPool,
}

impl AccessEvaluator {
    /// Create a new evaluator.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Answer one capability check. Fail-closed: storage errors deny.
    pub async fn check(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
        capability_key: &str,
        required_level: AccessLevel,
    ) -> bool {
        self.check_detailed(user_id, organization_id, capability_key, required_level)
            .await
            .allowed
    }

    /// Answer one capability check with the reason attached.
    ///
    /// Never returns an error: a storage failure produces a deny decision
    /// with [`DecisionSource::StorageFailure`] and a warning log.
    pub async fn check_detailed(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
        capability_key: &str,
        required_level: AccessLevel,
    ) -> AccessDecision {
        let role =
            match UserOrganization::resolve_active_role(&self.pool, user_id, organization_id).await
            {
                Ok(Some(role)) => role,
                Ok(None) => {
                    return AccessDecision::deny(
                        "No active role in this organization",
                        DecisionSource::NoAssignment,
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        target: "authorization",
                        user_id = %user_id,
                        organization_id = %organization_id,
                        error = %e,
                        "Role resolution failed; denying"
                    );
                    return AccessDecision::deny(
                        "Authorization data unavailable",
                        DecisionSource::StorageFailure,
                    );
                }
            };

        if BYPASS_ROLE_KEYS.contains(&role.role_key.as_str()) {
            return AccessDecision::allow(
                format!("Role '{}' bypasses capability checks", role.role_key),
                DecisionSource::BypassRole,
            );
        }

        let grant = match RoleCapabilityGrant::find(&self.pool, role.id, capability_key).await {
            Ok(Some(grant)) => grant,
            Ok(None) => {
                return AccessDecision::deny(
                    format!("Role '{}' holds no grant for '{capability_key}'", role.role_key),
                    DecisionSource::NoGrant,
                );
            }
            Err(e) => {
                tracing::warn!(
                    target: "authorization",
                    role_id = %role.id,
                    capability_key = %capability_key,
                    error = %e,
                    "Grant lookup failed; denying"
                );
                return AccessDecision::deny(
                    "Authorization data unavailable",
                    DecisionSource::StorageFailure,
                );
            }
        };

        if grant.access_level.satisfies(required_level) {
            AccessDecision::allow(
                format!(
                    "Granted at '{}', required '{required_level}'",
                    grant.access_level
                ),
                DecisionSource::Grant,
            )
        } else {
            AccessDecision::deny(
                format!(
                    "Granted at '{}', required '{required_level}'",
                    grant.access_level
                ),
                DecisionSource::Grant,
            )
        }
    }

    /// Whether the caller holds a bypass role in the organization.
    ///
    /// Used to gate the catalog-seeding bootstrap endpoint, which must work
    /// before any grant rows exist.
    pub async fn has_bypass_role(&self, user_id: Uuid, organization_id: Uuid) -> Result<bool> {
        let role =
            UserOrganization::resolve_active_role(&self.pool, user_id, organization_id).await?;

        Ok(role
            .map(|r| BYPASS_ROLE_KEYS.contains(&r.role_key.as_str()))
            .unwrap_or(false))
    }

    /// The caller's full effective capability map, for introspection UIs.
    ///
    /// Derived from the same tables as [`check`](Self::check): the
    /// assignment mapping, the grant store, and (for bypass roles) the
    /// persisted catalog, where every capability is reported at Full.
    pub async fn effective_capabilities(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> Result<BTreeMap<String, EffectiveCapability>> {
        let Some(role) =
            UserOrganization::resolve_active_role(&self.pool, user_id, organization_id).await?
        else {
            return Ok(BTreeMap::new());
        };

        if BYPASS_ROLE_KEYS.contains(&role.role_key.as_str()) {
            let catalog = Capability::list_all(&self.pool).await?;
            return Ok(catalog
                .into_iter()
                .map(|c| {
                    (
                        c.key,
                        EffectiveCapability {
                            access_level: AccessLevel::Full,
                            constraints: None,
                        },
                    )
                })
                .collect());
        }

        let grants = RoleCapabilityGrant::list_for_role(&self.pool, role.id).await?;

        Ok(grants
            .into_iter()
            .map(|g| {
                (
                    g.capability_key,
                    EffectiveCapability {
                        access_level: g.access_level,
                        constraints: g.constraints,
                    },
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bypass_set_is_exactly_owner_and_super_admin() {
        assert!(BYPASS_ROLE_KEYS.contains(&"owner"));
        assert!(BYPASS_ROLE_KEYS.contains(&"super_admin"));
        assert!(!BYPASS_ROLE_KEYS.contains(&"admin"));
        assert_eq!(BYPASS_ROLE_KEYS.len(), 2);
    }

    #[test]
    fn decision_constructors_set_allowed() {
        let allow = AccessDecision::allow("ok", DecisionSource::Grant);
        let deny = AccessDecision::deny("no", DecisionSource::NoGrant);

        assert!(allow.allowed);
        assert!(!deny.allowed);
    }

    #[test]
    fn decision_source_serializes_snake_case() {
        let json = serde_json::to_string(&DecisionSource::BypassRole).unwrap();
        assert_eq!(json, "\"bypass_role\"");
        assert_eq!(DecisionSource::NoAssignment.to_string(), "no_assignment");
    }
}

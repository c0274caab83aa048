//! Validated write path for role capability grants.
//!
//! Every write checks the capability exists in the persisted catalog and
//! that the requested level is legal for it. Single grants and revokes run
//! as one statement each; [`GrantService::bulk_grant`] deliberately commits
//! per item so one bad entry cannot abort the rest, reporting failures
//! structurally instead of swallowing them.

use std::collections::BTreeMap;

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use fleetgrid_db::models::role_capability_grant::NewGrant;
use fleetgrid_db::{AccessLevel, Capability, Role, RoleCapabilityGrant};

use crate::error::{AuthorizationError, Result};

/// One requested grant in a single or bulk write.
#[derive(Debug, Clone)]
pub struct GrantEntry {
    /// Catalog key of the capability to grant.
    pub capability_key: String,

    /// Requested strength.
    pub access_level: AccessLevel,

    /// Opaque constraints payload, stored uninterpreted.
    pub constraints: Option<serde_json::Value>,
}

/// A per-item failure from a bulk grant.
#[derive(Debug, Clone, serde::Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BulkGrantFailure {
    /// The capability key that failed.
    pub capability_key: String,

    /// Why it failed.
    pub reason: String,
}

/// Structured result of a bulk grant: which entries landed, which did not.
#[derive(Debug, Default)]
pub struct BulkGrantOutcome {
    /// Grants written successfully.
    pub succeeded: Vec<RoleCapabilityGrant>,

    /// Entries rejected, with the reason per key.
    pub failed: Vec<BulkGrantFailure>,
}

/// Write path for role capability grants.
pub struct GrantService {
    pool: PgPool,
}

impl GrantService {
    /// Create a new grant service.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Validate an entry against the persisted catalog.
    async fn validate_entry(&self, entry: &GrantEntry) -> Result<()> {
        let capability = Capability::find_by_key(&self.pool, &entry.capability_key)
            .await?
            .ok_or_else(|| AuthorizationError::CapabilityNotFound(entry.capability_key.clone()))?;

        if !capability.allows(entry.access_level) {
            return Err(AuthorizationError::InvalidAccessLevel {
                key: entry.capability_key.clone(),
                level: entry.access_level,
            });
        }

        Ok(())
    }

    /// Write one grant, replacing any existing grant for the pair.
    pub async fn grant(
        &self,
        role_id: Uuid,
        entry: GrantEntry,
        granted_by: Option<Uuid>,
    ) -> Result<RoleCapabilityGrant> {
        Role::find_by_id(&self.pool, role_id)
            .await?
            .ok_or(AuthorizationError::RoleNotFound(role_id))?;

        self.validate_entry(&entry).await?;

        let grant = RoleCapabilityGrant::upsert(
            &self.pool,
            role_id,
            &NewGrant {
                capability_key: entry.capability_key,
                access_level: entry.access_level,
                constraints: entry.constraints,
                granted_by,
            },
        )
        .await?;

        Ok(grant)
    }

    /// Remove a grant. Idempotent: returns whether one existed.
    pub async fn revoke(&self, role_id: Uuid, capability_key: &str) -> Result<bool> {
        Role::find_by_id(&self.pool, role_id)
            .await?
            .ok_or(AuthorizationError::RoleNotFound(role_id))?;

        let existed = RoleCapabilityGrant::revoke(&self.pool, role_id, capability_key).await?;
        Ok(existed)
    }

    /// Write a batch of grants, validating and committing each entry
    /// independently.
    ///
    /// The transaction boundary is per item, not per batch: an invalid
    /// entry lands in `failed` without aborting the others.
    pub async fn bulk_grant(
        &self,
        role_id: Uuid,
        entries: Vec<GrantEntry>,
        granted_by: Option<Uuid>,
    ) -> Result<BulkGrantOutcome> {
        Role::find_by_id(&self.pool, role_id)
            .await?
            .ok_or(AuthorizationError::RoleNotFound(role_id))?;

        let mut outcome = BulkGrantOutcome::default();

        for entry in entries {
            let key = entry.capability_key.clone();
            match self.grant_one(role_id, entry, granted_by).await {
                Ok(grant) => outcome.succeeded.push(grant),
                Err(e) => {
                    tracing::warn!(
                        target: "authorization",
                        role_id = %role_id,
                        capability_key = %key,
                        error = %e,
                        "Bulk grant entry rejected"
                    );
                    outcome.failed.push(BulkGrantFailure {
                        capability_key: key,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(outcome)
    }

    async fn grant_one(
        &self,
        role_id: Uuid,
        entry: GrantEntry,
        granted_by: Option<Uuid>,
    ) -> Result<RoleCapabilityGrant> {
        self.validate_entry(&entry).await?;

        let grant = RoleCapabilityGrant::upsert(
            &self.pool,
            role_id,
            &NewGrant {
                capability_key: entry.capability_key,
                access_level: entry.access_level,
                constraints: entry.constraints,
                granted_by,
            },
        )
        .await?;

        Ok(grant)
    }
}

/// Validate a whole capability map against the catalog, then write it as a
/// role's grant set inside the caller's transaction.
///
/// Used by atomic role creation and the destructive capabilities replace:
/// unlike bulk grants, one illegal entry fails the entire operation.
pub async fn write_grant_set(
    tx: &mut Transaction<'_, Postgres>,
    role_id: Uuid,
    capabilities: &BTreeMap<String, AccessLevel>,
    granted_by: Option<Uuid>,
) -> Result<Vec<RoleCapabilityGrant>> {
    // Validate everything first so the transaction never half-applies.
    for (key, level) in capabilities {
        let capability = Capability::find_by_key(&mut **tx, key)
            .await?
            .ok_or_else(|| AuthorizationError::CapabilityNotFound(key.clone()))?;

        if !capability.allows(*level) {
            return Err(AuthorizationError::InvalidAccessLevel {
                key: key.clone(),
                level: *level,
            });
        }
    }

    let mut grants = Vec::with_capacity(capabilities.len());
    for (key, level) in capabilities {
        let grant = RoleCapabilityGrant::upsert(
            &mut **tx,
            role_id,
            &NewGrant {
                capability_key: key.clone(),
                access_level: *level,
                constraints: None,
                granted_by,
            },
        )
        .await?;
        grants.push(grant);
    }

    Ok(grants)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grant_entry_construction() {
        let entry = GrantEntry {
            capability_key: "vehicle.edit".to_string(),
            access_level: AccessLevel::Limited,
            constraints: None,
        };

        assert_eq!(entry.access_level, AccessLevel::Limited);
    }

    #[test]
    fn test_bulk_outcome_serializes_failures() {
        let failure = BulkGrantFailure {
            capability_key: "vehicle.fly".to_string(),
            reason: "Capability not found: vehicle.fly".to_string(),
        };

        let json = serde_json::to_string(&failure).unwrap();
        assert!(json.contains("vehicle.fly"));
        assert!(json.contains("not found"));
    }
}

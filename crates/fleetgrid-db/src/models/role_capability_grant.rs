//! Role capability grant model.
//!
//! The join table between roles and the capability catalog. At most one
//! active grant exists per `(role_id, capability_key)`; writing over an
//! existing pair replaces the previous grant entirely.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};
use uuid::Uuid;

use super::AccessLevel;

/// A single `(role, capability) -> access level` assignment record.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RoleCapabilityGrant {
    /// Unique identifier.
    pub id: Uuid,

    /// The role holding the grant.
    pub role_id: Uuid,

    /// The granted capability's catalog key.
    pub capability_key: String,

    /// Granted strength. Always a member of the capability's allowed levels.
    pub access_level: AccessLevel,

    /// Opaque constraints payload; the engine stores and returns it
    /// uninterpreted.
    pub constraints: Option<serde_json::Value>,

    /// When the grant was written.
    pub granted_at: DateTime<Utc>,

    /// Who wrote the grant, if known.
    pub granted_by: Option<Uuid>,
}

/// Input for writing a grant.
#[derive(Debug, Clone)]
pub struct NewGrant {
    pub capability_key: String,
    pub access_level: AccessLevel,
    pub constraints: Option<serde_json::Value>,
    pub granted_by: Option<Uuid>,
}

impl RoleCapabilityGrant {
    /// Write a grant, replacing any existing grant for the same
    /// `(role, capability)` pair. Replace, not merge: the previous
    /// constraints payload does not survive.
    pub async fn upsert<'e, E>(
        executor: E,
        role_id: Uuid,
        input: &NewGrant,
    ) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Self>(
            r"
            INSERT INTO role_capability_grants
                (role_id, capability_key, access_level, constraints, granted_by)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (role_id, capability_key) DO UPDATE SET
                access_level = EXCLUDED.access_level,
                constraints = EXCLUDED.constraints,
                granted_at = now(),
                granted_by = EXCLUDED.granted_by
            RETURNING *
            ",
        )
        .bind(role_id)
        .bind(&input.capability_key)
        .bind(input.access_level)
        .bind(&input.constraints)
        .bind(input.granted_by)
        .fetch_one(executor)
        .await
    }

    /// Remove a grant. Returns true if one existed.
    pub async fn revoke<'e, E>(
        executor: E,
        role_id: Uuid,
        capability_key: &str,
    ) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            r"
            DELETE FROM role_capability_grants
            WHERE role_id = $1 AND capability_key = $2
            ",
        )
        .bind(role_id)
        .bind(capability_key)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Look up the grant for one `(role, capability)` pair.
    pub async fn find<'e, E>(
        executor: E,
        role_id: Uuid,
        capability_key: &str,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Self>(
            r"
            SELECT * FROM role_capability_grants
            WHERE role_id = $1 AND capability_key = $2
            ",
        )
        .bind(role_id)
        .bind(capability_key)
        .fetch_optional(executor)
        .await
    }

    /// List a role's grants, ordered by capability key.
    pub async fn list_for_role<'e, E>(executor: E, role_id: Uuid) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Self>(
            r"
            SELECT * FROM role_capability_grants
            WHERE role_id = $1
            ORDER BY capability_key
            ",
        )
        .bind(role_id)
        .fetch_all(executor)
        .await
    }

    /// Remove every grant a role holds. Returns the number removed.
    pub async fn delete_all_for_role<'e, E>(executor: E, role_id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            r"
            DELETE FROM role_capability_grants
            WHERE role_id = $1
            ",
        )
        .bind(role_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    /// Number of grants a role holds.
    pub async fn count_for_role<'e, E>(executor: E, role_id: Uuid) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let row: (i64,) = sqlx::query_as(
            r"
            SELECT COUNT(*) FROM role_capability_grants
            WHERE role_id = $1
            ",
        )
        .bind(role_id)
        .fetch_one(executor)
        .await?;

        Ok(row.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grant_input() {
        let input = NewGrant {
            capability_key: "vehicle.edit".to_string(),
            access_level: AccessLevel::Limited,
            constraints: Some(serde_json::json!({"region": "north"})),
            granted_by: Some(Uuid::new_v4()),
        };

        assert_eq!(input.access_level, AccessLevel::Limited);
        assert!(input.constraints.is_some());
    }

    #[test]
    fn test_grant_serialization_keeps_constraints_opaque() {
        let grant = RoleCapabilityGrant {
            id: Uuid::new_v4(),
            role_id: Uuid::new_v4(),
            capability_key: "expense.approve".to_string(),
            access_level: AccessLevel::Full,
            constraints: Some(serde_json::json!({"max_amount": 5000})),
            granted_at: Utc::now(),
            granted_by: None,
        };

        let json = serde_json::to_string(&grant).unwrap();
        assert!(json.contains("expense.approve"));
        assert!(json.contains("max_amount"));
    }
}

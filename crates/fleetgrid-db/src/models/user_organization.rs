//! User-organization assignment model.
//!
//! Role assignment lives in the identity layer, outside the authorization
//! engine. The engine reads this mapping on the evaluation hot path, and
//! counts it for the delete guard and impact analysis.

use chrono::{DateTime, Utc};
use fleetgrid_core::{OrganizationId, UserId};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};
use uuid::Uuid;

use super::Role;

/// A user's active role within one organization.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserOrganization {
    /// Unique identifier.
    pub id: Uuid,

    /// The assigned user.
    pub user_id: Uuid,

    /// The organization the assignment is scoped to.
    pub organization_id: Uuid,

    /// The assigned role.
    pub role_id: Uuid,

    /// Whether the assignment is currently active.
    pub is_active: bool,

    /// When the assignment was created.
    pub created_at: DateTime<Utc>,
}

/// Per-organization affected-user count for impact analysis.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct OrganizationImpactRow {
    /// Organization holding active assignments of the role.
    pub organization_id: Uuid,

    /// Number of users assigned the role in that organization.
    pub user_count: i64,
}

/// Distinct-count totals for impact analysis.
#[derive(Debug, Clone, FromRow)]
pub struct ImpactTotals {
    /// Distinct users holding the role across all organizations.
    pub total_users: i64,

    /// Distinct organizations with at least one active assignment.
    pub total_organizations: i64,
}

impl UserOrganization {
    /// Get the user ID as a typed `UserId`.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        UserId::from_uuid(self.user_id)
    }

    /// Get the organization ID as a typed `OrganizationId`.
    #[must_use]
    pub fn organization_id(&self) -> OrganizationId {
        OrganizationId::from_uuid(self.organization_id)
    }

    /// Resolve the single active role a user holds within an organization.
    ///
    /// Returns the joined role row; `None` when the user has no active
    /// assignment there.
    pub async fn resolve_active_role<'e, E>(
        executor: E,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<Role>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Role>(
            r"
            SELECT r.* FROM roles r
            JOIN user_organizations uo ON uo.role_id = r.id
            WHERE uo.user_id = $1 AND uo.organization_id = $2 AND uo.is_active = true
            ",
        )
        .bind(user_id)
        .bind(organization_id)
        .fetch_optional(executor)
        .await
    }

    /// Count active assignments referencing a role.
    ///
    /// Used as the delete guard; must run inside the same transaction as
    /// the delete itself.
    pub async fn count_active_for_role<'e, E>(
        executor: E,
        role_id: Uuid,
    ) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let row: (i64,) = sqlx::query_as(
            r"
            SELECT COUNT(*) FROM user_organizations
            WHERE role_id = $1 AND is_active = true
            ",
        )
        .bind(role_id)
        .fetch_one(executor)
        .await?;

        Ok(row.0)
    }

    /// Remove inactive assignment rows referencing a role.
    ///
    /// Run inside the role-delete transaction: the guard only counts active
    /// assignments, but the FK would otherwise trip over dead rows.
    pub async fn delete_inactive_for_role<'e, E>(
        executor: E,
        role_id: Uuid,
    ) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            r"
            DELETE FROM user_organizations
            WHERE role_id = $1 AND is_active = false
            ",
        )
        .bind(role_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    /// Distinct user/organization totals for a role's active assignments.
    pub async fn impact_totals<'e, E>(executor: E, role_id: Uuid) -> Result<ImpactTotals, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, ImpactTotals>(
            r"
            SELECT COUNT(DISTINCT user_id) AS total_users,
                   COUNT(DISTINCT organization_id) AS total_organizations
            FROM user_organizations
            WHERE role_id = $1 AND is_active = true
            ",
        )
        .bind(role_id)
        .fetch_one(executor)
        .await
    }

    /// Per-organization breakdown of a role's active assignments.
    pub async fn impact_breakdown<'e, E>(
        executor: E,
        role_id: Uuid,
    ) -> Result<Vec<OrganizationImpactRow>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, OrganizationImpactRow>(
            r"
            SELECT organization_id, COUNT(*) AS user_count
            FROM user_organizations
            WHERE role_id = $1 AND is_active = true
            GROUP BY organization_id
            ORDER BY user_count DESC, organization_id
            ",
        )
        .bind(role_id)
        .fetch_all(executor)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_id_conversions() {
        let assignment = UserOrganization {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            role_id: Uuid::new_v4(),
            is_active: true,
            created_at: Utc::now(),
        };

        assert_eq!(*assignment.user_id().as_uuid(), assignment.user_id);
        assert_eq!(
            *assignment.organization_id().as_uuid(),
            assignment.organization_id
        );
    }
}

//! Custom role metadata model.
//!
//! One row per custom role, recording how it was created: which templates
//! contributed (lineage only, not a live reference), the customization
//! overlay applied at creation, and whether the role has been promoted for
//! reuse as a template.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};
use uuid::Uuid;

/// Creation-time metadata for a custom role.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CustomRoleMeta {
    /// The custom role this metadata belongs to.
    pub role_id: Uuid,

    /// Template keys the role was built from, in the order given at
    /// creation. Informational; later template changes never propagate.
    pub template_sources: Vec<String>,

    /// Whether the role has been promoted as a reusable template.
    pub is_template: bool,

    /// The override map applied at creation, kept for audit and diffing.
    pub customizations: serde_json::Value,

    /// Who created the role, if known.
    pub created_by: Option<Uuid>,

    /// When the role was created.
    pub created_at: DateTime<Utc>,
}

/// Input for recording custom role metadata.
#[derive(Debug, Clone)]
pub struct NewCustomRoleMeta {
    pub template_sources: Vec<String>,
    pub customizations: serde_json::Value,
    pub created_by: Option<Uuid>,
}

impl CustomRoleMeta {
    /// Record metadata for a freshly created custom role.
    pub async fn create<'e, E>(
        executor: E,
        role_id: Uuid,
        input: NewCustomRoleMeta,
    ) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Self>(
            r"
            INSERT INTO custom_role_meta
                (role_id, template_sources, customizations, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            ",
        )
        .bind(role_id)
        .bind(&input.template_sources)
        .bind(&input.customizations)
        .bind(input.created_by)
        .fetch_one(executor)
        .await
    }

    /// Fetch metadata for a custom role.
    pub async fn find_by_role<'e, E>(
        executor: E,
        role_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Self>(
            r"
            SELECT * FROM custom_role_meta
            WHERE role_id = $1
            ",
        )
        .bind(role_id)
        .fetch_optional(executor)
        .await
    }

    /// Mark a custom role as promoted for template reuse.
    pub async fn mark_as_template<'e, E>(executor: E, role_id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            r"
            UPDATE custom_role_meta SET is_template = true
            WHERE role_id = $1
            ",
        )
        .bind(role_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_meta_input() {
        let input = NewCustomRoleMeta {
            template_sources: vec!["dispatcher".to_string(), "accountant".to_string()],
            customizations: serde_json::json!({"vehicle.delete": {"action": "remove"}}),
            created_by: Some(Uuid::new_v4()),
        };

        assert_eq!(input.template_sources.len(), 2);
    }

    #[test]
    fn test_meta_serialization() {
        let meta = CustomRoleMeta {
            role_id: Uuid::new_v4(),
            template_sources: vec!["fleet_manager".to_string()],
            is_template: false,
            customizations: serde_json::json!({}),
            created_by: None,
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&meta).unwrap();
        assert!(json.contains("fleet_manager"));
        assert!(json.contains("\"is_template\":false"));
    }
}

//! Promoted role template model.
//!
//! Save-as-template snapshots a custom role's resolved grant set into this
//! table. Rows are insert-only: no update or delete operation exists, so a
//! saved template never changes after creation. The built-in template set
//! lives in code, not here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};
use uuid::Uuid;

/// An immutable, promoted capability bundle.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RoleTemplateRecord {
    /// Unique identifier.
    pub id: Uuid,

    /// Stable, unique template key (e.g. `"saved.weekend-dispatch.91c3"`).
    pub template_key: String,

    /// Display name.
    pub name: String,

    /// Optional description.
    pub description: Option<String>,

    /// Snapshot of the source role's grants: map of capability key to
    /// access level, stored as JSON.
    pub capabilities: serde_json::Value,

    /// The role the snapshot was taken from, if it still exists.
    pub source_role_id: Option<Uuid>,

    /// When the snapshot was taken.
    pub created_at: DateTime<Utc>,
}

/// Input for persisting a promoted template.
#[derive(Debug, Clone)]
pub struct NewRoleTemplate {
    pub template_key: String,
    pub name: String,
    pub description: Option<String>,
    pub capabilities: serde_json::Value,
    pub source_role_id: Option<Uuid>,
}

impl RoleTemplateRecord {
    /// Persist a promoted template snapshot.
    pub async fn insert<'e, E>(executor: E, input: NewRoleTemplate) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Self>(
            r"
            INSERT INTO role_templates
                (template_key, name, description, capabilities, source_role_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            ",
        )
        .bind(&input.template_key)
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.capabilities)
        .bind(input.source_role_id)
        .fetch_one(executor)
        .await
    }

    /// Look up a promoted template by key.
    pub async fn find_by_key<'e, E>(
        executor: E,
        template_key: &str,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Self>(
            r"
            SELECT * FROM role_templates
            WHERE template_key = $1
            ",
        )
        .bind(template_key)
        .fetch_optional(executor)
        .await
    }

    /// List all promoted templates.
    pub async fn list<'e, E>(executor: E) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Self>(
            r"
            SELECT * FROM role_templates
            ORDER BY name
            ",
        )
        .fetch_all(executor)
        .await
    }

    /// Whether a template key is already taken.
    pub async fn key_exists<'e, E>(executor: E, template_key: &str) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let row: (bool,) = sqlx::query_as(
            r"
            SELECT EXISTS(SELECT 1 FROM role_templates WHERE template_key = $1)
            ",
        )
        .bind(template_key)
        .fetch_one(executor)
        .await?;

        Ok(row.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_template_input() {
        let input = NewRoleTemplate {
            template_key: "saved.weekend-dispatch.91c3".to_string(),
            name: "Weekend Dispatch".to_string(),
            description: None,
            capabilities: serde_json::json!({"vehicle.view": "full", "vehicle.assign": "limited"}),
            source_role_id: Some(Uuid::new_v4()),
        };

        assert!(input.template_key.starts_with("saved."));
    }

    #[test]
    fn test_template_record_serialization() {
        let record = RoleTemplateRecord {
            id: Uuid::new_v4(),
            template_key: "saved.auditor.11aa".to_string(),
            name: "Auditor".to_string(),
            description: Some("Read-only audit bundle".to_string()),
            capabilities: serde_json::json!({"report.view": "view"}),
            source_role_id: None,
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("report.view"));
    }
}

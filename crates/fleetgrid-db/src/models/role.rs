//! Role model.
//!
//! Covers predefined system roles (seeded by migration) and user-created
//! custom roles. A `role_key` is never reused, even after its role is
//! deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};
use uuid::Uuid;

/// A named bundle of capability grants.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Role {
    /// Unique identifier.
    pub id: Uuid,

    /// Stable, unique key (e.g. `"owner"`, `"custom.night-dispatch.4f2a"`).
    pub role_key: String,

    /// Display name.
    pub name: String,

    /// Optional description.
    pub description: Option<String>,

    /// True for predefined roles; false for custom roles.
    pub is_system: bool,

    /// When the role was created.
    pub created_at: DateTime<Utc>,

    /// When the role was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a custom role.
#[derive(Debug, Clone)]
pub struct CreateRole {
    pub role_key: String,
    pub name: String,
    pub description: Option<String>,
}

/// Input for updating a custom role's display fields.
#[derive(Debug, Clone, Default)]
pub struct UpdateRole {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl Role {
    /// Create a new custom role.
    pub async fn create<'e, E>(executor: E, input: CreateRole) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Self>(
            r"
            INSERT INTO roles (role_key, name, description, is_system)
            VALUES ($1, $2, $3, false)
            RETURNING *
            ",
        )
        .bind(&input.role_key)
        .bind(&input.name)
        .bind(&input.description)
        .fetch_one(executor)
        .await
    }

    /// Find a role by ID.
    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Self>(
            r"
            SELECT * FROM roles
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Find a role by its stable key.
    pub async fn find_by_key<'e, E>(executor: E, role_key: &str) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Self>(
            r"
            SELECT * FROM roles
            WHERE role_key = $1
            ",
        )
        .bind(role_key)
        .fetch_optional(executor)
        .await
    }

    /// List all custom (non-system) roles.
    pub async fn list_custom<'e, E>(executor: E) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Self>(
            r"
            SELECT * FROM roles
            WHERE is_system = false
            ORDER BY name
            ",
        )
        .fetch_all(executor)
        .await
    }

    /// Update a custom role's name/description. System roles are immutable.
    pub async fn update<'e, E>(
        executor: E,
        id: Uuid,
        input: UpdateRole,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Self>(
            r"
            UPDATE roles
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                updated_at = now()
            WHERE id = $1 AND is_system = false
            RETURNING *
            ",
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .fetch_optional(executor)
        .await
    }

    /// Bump `updated_at` after a grant-set change.
    pub async fn touch<'e, E>(executor: E, id: Uuid) -> Result<(), sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query(
            r"
            UPDATE roles SET updated_at = now()
            WHERE id = $1
            ",
        )
        .bind(id)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Delete a custom role. System roles cannot be deleted.
    ///
    /// Callers must hold the active-assignment guard in the same
    /// transaction; the FK from `user_organizations` is only a backstop.
    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            r"
            DELETE FROM roles
            WHERE id = $1 AND is_system = false
            ",
        )
        .bind(id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Whether a role key is already taken.
    pub async fn key_exists<'e, E>(executor: E, role_key: &str) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let row: (bool,) = sqlx::query_as(
            r"
            SELECT EXISTS(SELECT 1 FROM roles WHERE role_key = $1)
            ",
        )
        .bind(role_key)
        .fetch_one(executor)
        .await?;

        Ok(row.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_role_input() {
        let input = CreateRole {
            role_key: "custom.night-dispatch.4f2a".to_string(),
            name: "Night Dispatch".to_string(),
            description: Some("Dispatchers on the night shift".to_string()),
        };

        assert!(input.role_key.starts_with("custom."));
        assert_eq!(input.name, "Night Dispatch");
    }

    #[test]
    fn test_role_serialization() {
        let role = Role {
            id: Uuid::new_v4(),
            role_key: "admin".to_string(),
            name: "Administrator".to_string(),
            description: None,
            is_system: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&role).unwrap();
        assert!(json.contains("Administrator"));
        assert!(json.contains("\"is_system\":true"));
    }
}

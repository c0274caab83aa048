//! Capability catalog model.
//!
//! The persisted catalog is authoritative at request time. Rows are created
//! by idempotent seeding and never mutated or removed afterwards, so
//! historical grants always reference a live catalog entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};
use uuid::Uuid;

use super::AccessLevel;

/// A capability in the catalog: one named, atomic permission unit.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Capability {
    /// Unique identifier.
    pub id: Uuid,

    /// Globally unique dotted key (e.g. `"vehicle.create"`).
    pub key: String,

    /// Grouping category (e.g. `"vehicles"`).
    pub category: String,

    /// Human-readable name.
    pub name: String,

    /// Description of what the capability governs.
    pub description: Option<String>,

    /// Access levels that may legally be granted for this capability.
    pub allowed_levels: Vec<AccessLevel>,

    /// Policy flag: deleting or weakening grants for this capability
    /// deserves extra scrutiny. Informational to callers.
    pub is_system_critical: bool,

    /// When the row was seeded.
    pub created_at: DateTime<Utc>,
}

/// Input for seeding a catalog row.
#[derive(Debug, Clone)]
pub struct NewCapability {
    pub key: String,
    pub category: String,
    pub name: String,
    pub description: Option<String>,
    pub allowed_levels: Vec<AccessLevel>,
    pub is_system_critical: bool,
}

/// Per-category capability count for the categories listing.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CategorySummary {
    /// Category name.
    pub category: String,

    /// Number of capabilities in the category.
    pub capability_count: i64,
}

impl Capability {
    /// Look up a capability by its key.
    pub async fn find_by_key<'e, E>(executor: E, key: &str) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Self>(
            r"
            SELECT * FROM capabilities
            WHERE key = $1
            ",
        )
        .bind(key)
        .fetch_optional(executor)
        .await
    }

    /// List the full catalog, ordered for stable display.
    pub async fn list_all<'e, E>(executor: E) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Self>(
            r"
            SELECT * FROM capabilities
            ORDER BY category, key
            ",
        )
        .fetch_all(executor)
        .await
    }

    /// List capabilities within one category.
    pub async fn list_by_category<'e, E>(
        executor: E,
        category: &str,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Self>(
            r"
            SELECT * FROM capabilities
            WHERE category = $1
            ORDER BY key
            ",
        )
        .bind(category)
        .fetch_all(executor)
        .await
    }

    /// Summarize categories with their capability counts.
    pub async fn list_categories<'e, E>(executor: E) -> Result<Vec<CategorySummary>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, CategorySummary>(
            r"
            SELECT category, COUNT(*) AS capability_count
            FROM capabilities
            GROUP BY category
            ORDER BY category
            ",
        )
        .fetch_all(executor)
        .await
    }

    /// Case-insensitive substring search over key, name, and description.
    pub async fn search<'e, E>(executor: E, keyword: &str) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Self>(
            r"
            SELECT * FROM capabilities
            WHERE key ILIKE '%' || $1 || '%'
               OR name ILIKE '%' || $1 || '%'
               OR description ILIKE '%' || $1 || '%'
            ORDER BY category, key
            ",
        )
        .bind(keyword)
        .fetch_all(executor)
        .await
    }

    /// Insert a catalog row if its key is not present yet.
    ///
    /// Existing rows are left untouched, so re-seeding can never invalidate
    /// grants that reference them. Returns true if a row was inserted.
    pub async fn insert_missing<'e, E>(
        executor: E,
        input: &NewCapability,
    ) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            r"
            INSERT INTO capabilities
                (key, category, name, description, allowed_levels, is_system_critical)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (key) DO NOTHING
            ",
        )
        .bind(&input.key)
        .bind(&input.category)
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.allowed_levels)
        .bind(input.is_system_critical)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Total number of catalog rows.
    pub async fn count<'e, E>(executor: E) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let row: (i64,) = sqlx::query_as(r"SELECT COUNT(*) FROM capabilities")
            .fetch_one(executor)
            .await?;

        Ok(row.0)
    }

    /// Whether `level` is a legal grant strength for this capability.
    #[must_use]
    pub fn allows(&self, level: AccessLevel) -> bool {
        self.allowed_levels.contains(&level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capability(allowed: Vec<AccessLevel>) -> Capability {
        Capability {
            id: Uuid::new_v4(),
            key: "vehicle.edit".to_string(),
            category: "vehicles".to_string(),
            name: "Edit vehicles".to_string(),
            description: Some("Modify vehicle records".to_string()),
            allowed_levels: allowed,
            is_system_critical: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn allows_checks_membership_not_rank() {
        let cap = capability(vec![AccessLevel::View, AccessLevel::Full]);
        assert!(cap.allows(AccessLevel::View));
        assert!(cap.allows(AccessLevel::Full));
        // Limited outranks View but is not listed, so it is not legal.
        assert!(!cap.allows(AccessLevel::Limited));
    }

    #[test]
    fn capability_serializes_levels_lowercase() {
        let cap = capability(vec![AccessLevel::Limited]);
        let json = serde_json::to_string(&cap).unwrap();
        assert!(json.contains("\"limited\""));
        assert!(json.contains("vehicle.edit"));
    }
}

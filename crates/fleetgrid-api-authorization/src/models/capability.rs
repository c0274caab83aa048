//! DTOs for capability catalog and introspection endpoints.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use fleetgrid_authorization::EffectiveCapability;
use fleetgrid_db::{AccessLevel, Capability};

/// A capability as exposed by the catalog endpoints.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CapabilityResponse {
    /// Globally unique dotted key.
    pub key: String,

    /// Grouping category.
    pub category: String,

    /// Human-readable name.
    pub name: String,

    /// What the capability governs.
    pub description: Option<String>,

    /// Legal grant strengths.
    pub allowed_levels: Vec<AccessLevel>,

    /// Whether grants deserve extra scrutiny.
    pub is_system_critical: bool,
}

impl From<Capability> for CapabilityResponse {
    fn from(c: Capability) -> Self {
        Self {
            key: c.key,
            category: c.category,
            name: c.name,
            description: c.description,
            allowed_levels: c.allowed_levels,
            is_system_critical: c.is_system_critical,
        }
    }
}

/// Query parameters for catalog search.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Case-insensitive substring matched against key, name, and description.
    pub keyword: String,
}

/// Query parameters for user-scoped introspection endpoints.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct UserOrgQuery {
    /// Organization to evaluate within.
    pub organization_id: Uuid,
}

/// Query parameters for a single capability check.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct CheckQuery {
    /// Organization to evaluate within.
    pub organization_id: Uuid,

    /// Level the action requires. Defaults to `view`.
    #[serde(default = "default_required_level")]
    pub required_level: AccessLevel,
}

fn default_required_level() -> AccessLevel {
    AccessLevel::View
}

/// A user's effective capability map within one organization.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EffectiveCapabilitiesResponse {
    /// The inspected user.
    pub user_id: Uuid,

    /// The organization evaluated.
    pub organization_id: Uuid,

    /// Capability key to effective grant.
    pub capabilities: BTreeMap<String, EffectiveCapability>,
}

/// Result of a catalog seeding run.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SeedResponse {
    /// Rows inserted by this run (zero when already seeded).
    pub inserted: u64,

    /// Size of the build-time definition table.
    pub total_defined: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn capability_response_from_model() {
        let model = Capability {
            id: Uuid::new_v4(),
            key: "vehicle.view".to_string(),
            category: "vehicles".to_string(),
            name: "View vehicles".to_string(),
            description: None,
            allowed_levels: vec![AccessLevel::View, AccessLevel::Full],
            is_system_critical: false,
            created_at: Utc::now(),
        };

        let response = CapabilityResponse::from(model);
        assert_eq!(response.key, "vehicle.view");
        assert_eq!(response.allowed_levels.len(), 2);
    }

    #[test]
    fn check_query_defaults_to_view() {
        let query: CheckQuery = serde_json::from_value(serde_json::json!({
            "organization_id": Uuid::new_v4(),
        }))
        .unwrap();

        assert_eq!(query.required_level, AccessLevel::View);
    }
}

//! DTOs for custom role management endpoints.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use fleetgrid_authorization::{BulkGrantFailure, CapabilityOverride, MergeStrategy};
use fleetgrid_db::{AccessLevel, OrganizationImpactRow, RoleCapabilityGrant};

/// Request to create a custom role from an explicit capability map.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct CreateCustomRoleRequest {
    /// Display name.
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    /// Optional description.
    #[validate(length(max = 500))]
    pub description: Option<String>,

    /// Capability key to access level.
    #[serde(default)]
    pub capabilities: BTreeMap<String, AccessLevel>,
}

/// Request to create a custom role by composing templates.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct CreateFromTemplatesRequest {
    /// Display name.
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    /// Optional description.
    #[validate(length(max = 500))]
    pub description: Option<String>,

    /// Templates to combine, built-in or promoted.
    #[validate(length(min = 1))]
    pub template_keys: Vec<String>,

    /// How the templates combine.
    pub strategy: MergeStrategy,

    /// Overlay applied after the merge.
    #[serde(default)]
    pub customizations: BTreeMap<String, CapabilityOverride>,
}

/// Request to patch a custom role.
///
/// A present `capabilities` map replaces the entire grant set
/// (delete-all-then-insert). Incremental changes should use the
/// per-capability endpoints instead.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct UpdateCustomRoleRequest {
    /// New display name.
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,

    /// New description.
    #[validate(length(max = 500))]
    pub description: Option<String>,

    /// Full replacement grant set.
    pub capabilities: Option<BTreeMap<String, AccessLevel>>,
}

/// Request to clone a custom role.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct CloneRoleRequest {
    /// Display name for the clone.
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

/// Request to promote a role's grant set into a reusable template.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct SaveAsTemplateRequest {
    /// Display name for the template.
    #[validate(length(min = 1, max = 100))]
    pub template_name: String,

    /// Optional description.
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

/// Request to grant one capability to a role.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct GrantCapabilityRequest {
    /// Catalog key of the capability.
    pub capability_key: String,

    /// Requested strength.
    pub access_level: AccessLevel,

    /// Opaque constraints payload.
    pub constraints: Option<serde_json::Value>,
}

/// Request body for a bulk grant.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BulkGrantRequest {
    /// Entries to write; each is validated and committed independently.
    pub grants: Vec<GrantCapabilityRequest>,
}

/// One grant in a role detail response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GrantResponse {
    /// Granted capability key.
    pub capability_key: String,

    /// Granted strength.
    pub access_level: AccessLevel,

    /// Opaque constraints payload.
    pub constraints: Option<serde_json::Value>,

    /// When the grant was written.
    pub granted_at: DateTime<Utc>,

    /// Who wrote the grant, if known.
    pub granted_by: Option<Uuid>,
}

impl From<RoleCapabilityGrant> for GrantResponse {
    fn from(g: RoleCapabilityGrant) -> Self {
        Self {
            capability_key: g.capability_key,
            access_level: g.access_level,
            constraints: g.constraints,
            granted_at: g.granted_at,
            granted_by: g.granted_by,
        }
    }
}

/// Full detail view of a custom role.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CustomRoleResponse {
    /// Role identifier.
    pub id: Uuid,

    /// Stable role key.
    pub role_key: String,

    /// Display name.
    pub name: String,

    /// Description.
    pub description: Option<String>,

    /// Template keys the role was built from, if any.
    pub template_sources: Vec<String>,

    /// Whether the role has been promoted as a template.
    pub is_template: bool,

    /// Current grant set.
    pub capabilities: Vec<GrantResponse>,

    /// When the role was created.
    pub created_at: DateTime<Utc>,

    /// When the role was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Listing of custom roles.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CustomRoleListResponse {
    /// All custom roles with their grants.
    pub items: Vec<CustomRoleResponse>,

    /// Total count.
    pub total: usize,
}

/// Structured result of a bulk grant.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BulkGrantResponse {
    /// Grants written successfully.
    pub succeeded: Vec<GrantResponse>,

    /// Entries rejected, with the reason per key.
    pub failed: Vec<BulkGrantFailure>,
}

/// Result of an idempotent capability revoke.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RemoveCapabilityResponse {
    /// Whether a grant existed and was removed.
    pub removed: bool,
}

/// Live impact analysis for a role.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ImpactAnalysisResponse {
    /// The analyzed role.
    pub role_id: Uuid,

    /// Its display name.
    pub role_name: String,

    /// Distinct users holding the role.
    pub total_users_affected: i64,

    /// Distinct organizations with at least one assignment.
    pub organizations_affected: i64,

    /// Per-organization breakdown.
    pub breakdown: Vec<OrganizationImpactRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_accepts_missing_capabilities() {
        let req: CreateCustomRoleRequest = serde_json::from_value(serde_json::json!({
            "name": "Night Dispatch",
        }))
        .unwrap();

        assert!(req.capabilities.is_empty());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn create_request_rejects_empty_name() {
        let req: CreateCustomRoleRequest = serde_json::from_value(serde_json::json!({
            "name": "",
        }))
        .unwrap();

        assert!(req.validate().is_err());
    }

    #[test]
    fn from_templates_request_parses_strategy_and_overrides() {
        let req: CreateFromTemplatesRequest = serde_json::from_value(serde_json::json!({
            "name": "Ops Lead",
            "template_keys": ["dispatcher", "accountant"],
            "strategy": "union",
            "customizations": {
                "vehicle.delete": {"action": "remove"},
                "report.view": {"action": "set", "level": "full"}
            }
        }))
        .unwrap();

        assert_eq!(req.strategy, MergeStrategy::Union);
        assert_eq!(req.customizations.len(), 2);
        assert_eq!(
            req.customizations["report.view"],
            CapabilityOverride::Set(AccessLevel::Full)
        );
    }

    #[test]
    fn from_templates_request_requires_template_keys() {
        let req: CreateFromTemplatesRequest = serde_json::from_value(serde_json::json!({
            "name": "Ops Lead",
            "template_keys": [],
            "strategy": "intersection",
        }))
        .unwrap();

        assert!(req.validate().is_err());
    }

    #[test]
    fn update_request_distinguishes_absent_and_empty_capabilities() {
        let absent: UpdateCustomRoleRequest =
            serde_json::from_value(serde_json::json!({"name": "Renamed"})).unwrap();
        assert!(absent.capabilities.is_none());

        let empty: UpdateCustomRoleRequest =
            serde_json::from_value(serde_json::json!({"capabilities": {}})).unwrap();
        assert_eq!(empty.capabilities, Some(BTreeMap::new()));
    }
}

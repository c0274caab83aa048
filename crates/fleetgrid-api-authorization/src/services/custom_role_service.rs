//! Custom role management service.
//!
//! Orchestrates creation (from scratch or templates), mutation, cloning,
//! deletion with its transactional usage guard, impact analysis, and
//! promotion to a reusable template.

use std::collections::BTreeMap;

use sqlx::PgPool;
use uuid::Uuid;

use fleetgrid_authorization::{
    apply_customizations, merge_templates, resolve_template, templates, write_grant_set,
    AuthorizationError, GrantEntry, GrantService, Template,
};
use fleetgrid_db::models::custom_role_meta::NewCustomRoleMeta;
use fleetgrid_db::models::role::{CreateRole, UpdateRole};
use fleetgrid_db::models::role_capability_grant::NewGrant;
use fleetgrid_db::models::role_template::NewRoleTemplate;
use fleetgrid_db::{
    AccessLevel, CustomRoleMeta, Role, RoleCapabilityGrant, RoleTemplateRecord, UserOrganization,
};

use crate::error::{ApiError, ApiResult};
use crate::models::{
    BulkGrantRequest, BulkGrantResponse, CloneRoleRequest, CreateCustomRoleRequest,
    CreateFromTemplatesRequest, CustomRoleListResponse, CustomRoleResponse,
    GrantCapabilityRequest, GrantResponse, ImpactAnalysisResponse, SaveAsTemplateRequest,
    TemplateResponse, UpdateCustomRoleRequest,
};

/// Service for managing custom roles.
pub struct CustomRoleService {
    pool: PgPool,
    grants: GrantService,
}

/// Reduce a display name to a url-safe slug for key generation.
fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    if slug.is_empty() {
        slug.push_str("role");
    }

    slug
}

/// Random suffix keeping generated keys unique without ever reusing one.
fn key_suffix() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

fn new_role_key(name: &str) -> String {
    format!("custom.{}.{}", slugify(name), key_suffix())
}

fn new_template_key(name: &str) -> String {
    format!("saved.{}.{}", slugify(name), key_suffix())
}

impl CustomRoleService {
    /// Create a new custom role service.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        let grants = GrantService::new(pool.clone());
        Self { pool, grants }
    }

    /// Load a custom role or fail with NotFound. System roles are not
    /// exposed through this surface.
    async fn load_custom_role(&self, id: Uuid) -> ApiResult<Role> {
        let role = Role::find_by_id(&self.pool, id)
            .await?
            .filter(|r| !r.is_system)
            .ok_or_else(|| ApiError::NotFound(format!("Custom role not found: {id}")))?;

        Ok(role)
    }

    /// Assemble the detail response for a role.
    async fn to_response(&self, role: Role) -> ApiResult<CustomRoleResponse> {
        let meta = CustomRoleMeta::find_by_role(&self.pool, role.id).await?;
        let grants = RoleCapabilityGrant::list_for_role(&self.pool, role.id).await?;

        let (template_sources, is_template) = match meta {
            Some(m) => (m.template_sources, m.is_template),
            None => (Vec::new(), false),
        };

        Ok(CustomRoleResponse {
            id: role.id,
            role_key: role.role_key,
            name: role.name,
            description: role.description,
            template_sources,
            is_template,
            capabilities: grants.into_iter().map(Into::into).collect(),
            created_at: role.created_at,
            updated_at: role.updated_at,
        })
    }

    /// Create a custom role from an explicit capability map.
    ///
    /// Atomic: one illegal capability entry fails the whole create.
    pub async fn create_from_scratch(
        &self,
        request: CreateCustomRoleRequest,
        created_by: Option<Uuid>,
    ) -> ApiResult<CustomRoleResponse> {
        let mut tx = self.pool.begin().await?;

        let role = Role::create(
            &mut *tx,
            CreateRole {
                role_key: new_role_key(&request.name),
                name: request.name,
                description: request.description,
            },
        )
        .await?;

        CustomRoleMeta::create(
            &mut *tx,
            role.id,
            NewCustomRoleMeta {
                template_sources: Vec::new(),
                customizations: serde_json::json!({}),
                created_by,
            },
        )
        .await?;

        write_grant_set(&mut tx, role.id, &request.capabilities, created_by).await?;

        tx.commit().await?;

        tracing::info!(
            target: "authorization",
            role_id = %role.id,
            role_key = %role.role_key,
            "Custom role created"
        );

        self.to_response(role).await
    }

    /// Create a custom role by merging templates and applying an overlay.
    pub async fn create_from_templates(
        &self,
        request: CreateFromTemplatesRequest,
        created_by: Option<Uuid>,
    ) -> ApiResult<CustomRoleResponse> {
        let mut resolved: Vec<Template> = Vec::with_capacity(request.template_keys.len());
        for key in &request.template_keys {
            resolved.push(resolve_template(&self.pool, key).await?);
        }

        let merged = merge_templates(&resolved, request.strategy);
        let capabilities = apply_customizations(&merged, &request.customizations);

        let customizations = serde_json::to_value(&request.customizations)
            .map_err(|e| ApiError::Validation(format!("Unserializable customizations: {e}")))?;

        let mut tx = self.pool.begin().await?;

        let role = Role::create(
            &mut *tx,
            CreateRole {
                role_key: new_role_key(&request.name),
                name: request.name,
                description: request.description,
            },
        )
        .await?;

        CustomRoleMeta::create(
            &mut *tx,
            role.id,
            NewCustomRoleMeta {
                template_sources: request.template_keys,
                customizations,
                created_by,
            },
        )
        .await?;

        write_grant_set(&mut tx, role.id, &capabilities, created_by).await?;

        tx.commit().await?;

        tracing::info!(
            target: "authorization",
            role_id = %role.id,
            role_key = %role.role_key,
            strategy = ?request.strategy,
            "Custom role created from templates"
        );

        self.to_response(role).await
    }

    /// Get one custom role with its grants.
    pub async fn get(&self, id: Uuid) -> ApiResult<CustomRoleResponse> {
        let role = self.load_custom_role(id).await?;
        self.to_response(role).await
    }

    /// List all custom roles with their grants.
    pub async fn list(&self) -> ApiResult<CustomRoleListResponse> {
        let roles = Role::list_custom(&self.pool).await?;

        let mut items = Vec::with_capacity(roles.len());
        for role in roles {
            items.push(self.to_response(role).await?);
        }

        let total = items.len();
        Ok(CustomRoleListResponse { items, total })
    }

    /// Patch a custom role.
    ///
    /// A present `capabilities` map replaces the entire grant set inside
    /// one transaction (delete-all-then-insert).
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateCustomRoleRequest,
    ) -> ApiResult<CustomRoleResponse> {
        let mut tx = self.pool.begin().await?;

        let role = Role::find_by_id(&mut *tx, id)
            .await?
            .filter(|r| !r.is_system)
            .ok_or_else(|| ApiError::NotFound(format!("Custom role not found: {id}")))?;

        let role = if request.name.is_some() || request.description.is_some() {
            Role::update(
                &mut *tx,
                id,
                UpdateRole {
                    name: request.name,
                    description: request.description,
                },
            )
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Custom role not found: {id}")))?
        } else {
            role
        };

        if let Some(capabilities) = &request.capabilities {
            RoleCapabilityGrant::delete_all_for_role(&mut *tx, id).await?;
            write_grant_set(&mut tx, id, capabilities, None).await?;
            Role::touch(&mut *tx, id).await?;
        }

        tx.commit().await?;

        // Reload to reflect the committed state, including updated_at.
        self.get(role.id).await
    }

    /// Clone a custom role, snapshotting its resolved grant set.
    ///
    /// Later edits to the source never propagate to the clone.
    pub async fn clone_role(
        &self,
        source_id: Uuid,
        request: CloneRoleRequest,
        created_by: Option<Uuid>,
    ) -> ApiResult<CustomRoleResponse> {
        let source = self.load_custom_role(source_id).await?;
        let source_meta = CustomRoleMeta::find_by_role(&self.pool, source_id).await?;
        let source_grants = RoleCapabilityGrant::list_for_role(&self.pool, source_id).await?;

        let mut tx = self.pool.begin().await?;

        let clone = Role::create(
            &mut *tx,
            CreateRole {
                role_key: new_role_key(&request.name),
                name: request.name,
                description: source.description.clone(),
            },
        )
        .await?;

        CustomRoleMeta::create(
            &mut *tx,
            clone.id,
            NewCustomRoleMeta {
                template_sources: source_meta.map(|m| m.template_sources).unwrap_or_default(),
                customizations: serde_json::json!({}),
                created_by,
            },
        )
        .await?;

        for grant in source_grants {
            RoleCapabilityGrant::upsert(
                &mut *tx,
                clone.id,
                &NewGrant {
                    capability_key: grant.capability_key,
                    access_level: grant.access_level,
                    constraints: grant.constraints,
                    granted_by: created_by,
                },
            )
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            target: "authorization",
            source_role_id = %source_id,
            clone_role_id = %clone.id,
            "Custom role cloned"
        );

        self.to_response(clone).await
    }

    /// Delete a custom role.
    ///
    /// The active-assignment count and the delete run inside one
    /// transaction, so a concurrently created assignment cannot slip past
    /// the guard. Refuses with `RoleInUse` rather than cascading.
    pub async fn delete(&self, id: Uuid) -> ApiResult<()> {
        let mut tx = self.pool.begin().await?;

        Role::find_by_id(&mut *tx, id)
            .await?
            .filter(|r| !r.is_system)
            .ok_or_else(|| ApiError::NotFound(format!("Custom role not found: {id}")))?;

        let in_use = UserOrganization::count_active_for_role(&mut *tx, id).await?;
        if in_use > 0 {
            return Err(AuthorizationError::RoleInUse(in_use).into());
        }

        // Inactive assignments are dead references once the role is gone;
        // the FK stays strict so a concurrently activated assignment still
        // aborts this transaction.
        UserOrganization::delete_inactive_for_role(&mut *tx, id).await?;
        Role::delete(&mut *tx, id).await?;

        tx.commit().await?;

        tracing::info!(target: "authorization", role_id = %id, "Custom role deleted");

        Ok(())
    }

    /// List a custom role's grants.
    pub async fn list_capabilities(&self, id: Uuid) -> ApiResult<Vec<GrantResponse>> {
        let role = self.load_custom_role(id).await?;
        let grants = RoleCapabilityGrant::list_for_role(&self.pool, role.id).await?;
        Ok(grants.into_iter().map(Into::into).collect())
    }

    /// Grant one capability, replacing any existing grant for the pair.
    pub async fn add_capability(
        &self,
        id: Uuid,
        request: GrantCapabilityRequest,
        granted_by: Option<Uuid>,
    ) -> ApiResult<GrantResponse> {
        self.load_custom_role(id).await?;

        let grant = self
            .grants
            .grant(
                id,
                GrantEntry {
                    capability_key: request.capability_key,
                    access_level: request.access_level,
                    constraints: request.constraints,
                },
                granted_by,
            )
            .await?;

        Role::touch(&self.pool, id).await?;

        Ok(grant.into())
    }

    /// Revoke one capability. Idempotent: returns whether a grant existed.
    pub async fn remove_capability(&self, id: Uuid, capability_key: &str) -> ApiResult<bool> {
        self.load_custom_role(id).await?;

        let existed = self.grants.revoke(id, capability_key).await?;
        if existed {
            Role::touch(&self.pool, id).await?;
        }

        Ok(existed)
    }

    /// Grant a batch of capabilities, committing each entry independently
    /// and reporting per-item failures.
    pub async fn bulk_grant(
        &self,
        id: Uuid,
        request: BulkGrantRequest,
        granted_by: Option<Uuid>,
    ) -> ApiResult<BulkGrantResponse> {
        self.load_custom_role(id).await?;

        let entries = request
            .grants
            .into_iter()
            .map(|g| GrantEntry {
                capability_key: g.capability_key,
                access_level: g.access_level,
                constraints: g.constraints,
            })
            .collect();

        let outcome = self.grants.bulk_grant(id, entries, granted_by).await?;

        if !outcome.succeeded.is_empty() {
            Role::touch(&self.pool, id).await?;
        }

        Ok(BulkGrantResponse {
            succeeded: outcome.succeeded.into_iter().map(Into::into).collect(),
            failed: outcome.failed,
        })
    }

    /// Live impact analysis: who would be affected by changing this role.
    /// Computed at call time, never cached.
    pub async fn impact_analysis(&self, id: Uuid) -> ApiResult<ImpactAnalysisResponse> {
        let role = self.load_custom_role(id).await?;

        let totals = UserOrganization::impact_totals(&self.pool, role.id).await?;
        let breakdown = UserOrganization::impact_breakdown(&self.pool, role.id).await?;

        Ok(ImpactAnalysisResponse {
            role_id: role.id,
            role_name: role.name,
            total_users_affected: totals.total_users,
            organizations_affected: totals.total_organizations,
            breakdown,
        })
    }

    /// Promote a role's current grant set into an immutable template.
    ///
    /// The snapshot is taken now; later edits to the role do not change
    /// the saved template.
    pub async fn save_as_template(
        &self,
        id: Uuid,
        request: SaveAsTemplateRequest,
    ) -> ApiResult<TemplateResponse> {
        let role = self.load_custom_role(id).await?;
        let grants = RoleCapabilityGrant::list_for_role(&self.pool, role.id).await?;

        let capabilities: BTreeMap<String, AccessLevel> = grants
            .into_iter()
            .map(|g| (g.capability_key, g.access_level))
            .collect();

        let capabilities_json = serde_json::to_value(&capabilities)
            .map_err(|e| ApiError::Validation(format!("Unserializable grant set: {e}")))?;

        let mut tx = self.pool.begin().await?;

        let record = RoleTemplateRecord::insert(
            &mut *tx,
            NewRoleTemplate {
                template_key: new_template_key(&request.template_name),
                name: request.template_name,
                description: request.description,
                capabilities: capabilities_json,
                source_role_id: Some(role.id),
            },
        )
        .await?;

        CustomRoleMeta::mark_as_template(&mut *tx, role.id).await?;

        tx.commit().await?;

        tracing::info!(
            target: "authorization",
            role_id = %role.id,
            template_key = %record.template_key,
            "Custom role promoted to template"
        );

        let template = templates::template_from_record(record)?;
        Ok(template.into())
    }
}

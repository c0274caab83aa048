//! Handlers for custom role management endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use fleetgrid_db::AccessLevel;

use crate::auth::{require_capability, AuthContext};
use crate::error::{ApiError, ApiResult};
use crate::models::{
    BulkGrantRequest, BulkGrantResponse, CloneRoleRequest, CreateCustomRoleRequest,
    CreateFromTemplatesRequest, CustomRoleListResponse, CustomRoleResponse,
    GrantCapabilityRequest, GrantResponse, ImpactAnalysisResponse, RemoveCapabilityResponse,
    SaveAsTemplateRequest, TemplateResponse, UpdateCustomRoleRequest,
};
use crate::router::AuthorizationState;

fn validated<T: Validate>(request: T) -> ApiResult<T> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    Ok(request)
}

/// List all custom roles.
#[utoipa::path(
    get,
    path = "/custom-roles",
    tag = "Authorization - Custom Roles",
    responses(
        (status = 200, description = "Custom roles", body = CustomRoleListResponse),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_custom_roles(
    State(state): State<AuthorizationState>,
    Extension(ctx): Extension<AuthContext>,
) -> ApiResult<Json<CustomRoleListResponse>> {
    require_capability(&state, &ctx, "role.custom.view", AccessLevel::View).await?;

    let roles = state.custom_role_service.list().await?;
    Ok(Json(roles))
}

/// Create a custom role from an explicit capability map.
#[utoipa::path(
    post,
    path = "/custom-roles",
    tag = "Authorization - Custom Roles",
    request_body = CreateCustomRoleRequest,
    responses(
        (status = 201, description = "Role created", body = CustomRoleResponse),
        (status = 400, description = "Invalid request"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_custom_role(
    State(state): State<AuthorizationState>,
    Extension(ctx): Extension<AuthContext>,
    Json(request): Json<CreateCustomRoleRequest>,
) -> ApiResult<(StatusCode, Json<CustomRoleResponse>)> {
    require_capability(&state, &ctx, "role.custom.create", AccessLevel::Full).await?;

    let request = validated(request)?;
    let role = state
        .custom_role_service
        .create_from_scratch(request, Some(*ctx.user_id.as_uuid()))
        .await?;

    Ok((StatusCode::CREATED, Json(role)))
}

/// Create a custom role by composing templates.
#[utoipa::path(
    post,
    path = "/custom-roles/from-template",
    tag = "Authorization - Custom Roles",
    request_body = CreateFromTemplatesRequest,
    responses(
        (status = 201, description = "Role created", body = CustomRoleResponse),
        (status = 400, description = "Invalid request"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Template not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_from_templates(
    State(state): State<AuthorizationState>,
    Extension(ctx): Extension<AuthContext>,
    Json(request): Json<CreateFromTemplatesRequest>,
) -> ApiResult<(StatusCode, Json<CustomRoleResponse>)> {
    require_capability(&state, &ctx, "role.custom.create", AccessLevel::Full).await?;

    let request = validated(request)?;
    let role = state
        .custom_role_service
        .create_from_templates(request, Some(*ctx.user_id.as_uuid()))
        .await?;

    Ok((StatusCode::CREATED, Json(role)))
}

/// Get one custom role.
#[utoipa::path(
    get,
    path = "/custom-roles/{id}",
    tag = "Authorization - Custom Roles",
    params(("id" = Uuid, Path, description = "Role ID")),
    responses(
        (status = 200, description = "Role details", body = CustomRoleResponse),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Role not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_custom_role(
    State(state): State<AuthorizationState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<CustomRoleResponse>> {
    require_capability(&state, &ctx, "role.custom.view", AccessLevel::View).await?;

    let role = state.custom_role_service.get(id).await?;
    Ok(Json(role))
}

/// Patch a custom role. A present `capabilities` map replaces the entire
/// grant set.
#[utoipa::path(
    put,
    path = "/custom-roles/{id}",
    tag = "Authorization - Custom Roles",
    params(("id" = Uuid, Path, description = "Role ID")),
    request_body = UpdateCustomRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = CustomRoleResponse),
        (status = 400, description = "Invalid request"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Role not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn update_custom_role(
    State(state): State<AuthorizationState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateCustomRoleRequest>,
) -> ApiResult<Json<CustomRoleResponse>> {
    require_capability(&state, &ctx, "role.custom.edit", AccessLevel::Full).await?;

    let request = validated(request)?;
    let role = state.custom_role_service.update(id, request).await?;
    Ok(Json(role))
}

/// Delete a custom role. Refuses while active assignments reference it.
#[utoipa::path(
    delete,
    path = "/custom-roles/{id}",
    tag = "Authorization - Custom Roles",
    params(("id" = Uuid, Path, description = "Role ID")),
    responses(
        (status = 204, description = "Role deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Role not found"),
        (status = 409, description = "Role still in use"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn delete_custom_role(
    State(state): State<AuthorizationState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    require_capability(&state, &ctx, "role.custom.delete", AccessLevel::Full).await?;

    state.custom_role_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Clone a custom role, snapshotting its grant set.
#[utoipa::path(
    post,
    path = "/custom-roles/{id}/clone",
    tag = "Authorization - Custom Roles",
    params(("id" = Uuid, Path, description = "Source role ID")),
    request_body = CloneRoleRequest,
    responses(
        (status = 201, description = "Clone created", body = CustomRoleResponse),
        (status = 400, description = "Invalid request"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Role not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn clone_custom_role(
    State(state): State<AuthorizationState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(request): Json<CloneRoleRequest>,
) -> ApiResult<(StatusCode, Json<CustomRoleResponse>)> {
    require_capability(&state, &ctx, "role.custom.create", AccessLevel::Full).await?;

    let request = validated(request)?;
    let role = state
        .custom_role_service
        .clone_role(id, request, Some(*ctx.user_id.as_uuid()))
        .await?;

    Ok((StatusCode::CREATED, Json(role)))
}

/// List a custom role's grants.
#[utoipa::path(
    get,
    path = "/custom-roles/{id}/capabilities",
    tag = "Authorization - Custom Roles",
    params(("id" = Uuid, Path, description = "Role ID")),
    responses(
        (status = 200, description = "Grants", body = Vec<GrantResponse>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Role not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_role_capabilities(
    State(state): State<AuthorizationState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<GrantResponse>>> {
    require_capability(&state, &ctx, "role.custom.view", AccessLevel::View).await?;

    let grants = state.custom_role_service.list_capabilities(id).await?;
    Ok(Json(grants))
}

/// Grant one capability to a custom role.
#[utoipa::path(
    post,
    path = "/custom-roles/{id}/capabilities",
    tag = "Authorization - Custom Roles",
    params(("id" = Uuid, Path, description = "Role ID")),
    request_body = GrantCapabilityRequest,
    responses(
        (status = 201, description = "Grant written", body = GrantResponse),
        (status = 400, description = "Invalid access level"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Role or capability not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn add_role_capability(
    State(state): State<AuthorizationState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(request): Json<GrantCapabilityRequest>,
) -> ApiResult<(StatusCode, Json<GrantResponse>)> {
    require_capability(&state, &ctx, "role.custom.edit", AccessLevel::Full).await?;

    let grant = state
        .custom_role_service
        .add_capability(id, request, Some(*ctx.user_id.as_uuid()))
        .await?;

    Ok((StatusCode::CREATED, Json(grant)))
}

/// Revoke one capability from a custom role (idempotent).
#[utoipa::path(
    delete,
    path = "/custom-roles/{id}/capabilities/{key}",
    tag = "Authorization - Custom Roles",
    params(
        ("id" = Uuid, Path, description = "Role ID"),
        ("key" = String, Path, description = "Capability key")
    ),
    responses(
        (status = 200, description = "Revoke result", body = RemoveCapabilityResponse),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Role not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn remove_role_capability(
    State(state): State<AuthorizationState>,
    Extension(ctx): Extension<AuthContext>,
    Path((id, key)): Path<(Uuid, String)>,
) -> ApiResult<Json<RemoveCapabilityResponse>> {
    require_capability(&state, &ctx, "role.custom.edit", AccessLevel::Full).await?;

    let removed = state.custom_role_service.remove_capability(id, &key).await?;
    Ok(Json(RemoveCapabilityResponse { removed }))
}

/// Grant a batch of capabilities; failures are reported per item.
#[utoipa::path(
    post,
    path = "/custom-roles/{id}/capabilities/bulk",
    tag = "Authorization - Custom Roles",
    params(("id" = Uuid, Path, description = "Role ID")),
    request_body = BulkGrantRequest,
    responses(
        (status = 200, description = "Per-item outcome", body = BulkGrantResponse),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Role not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn bulk_grant_capabilities(
    State(state): State<AuthorizationState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(request): Json<BulkGrantRequest>,
) -> ApiResult<Json<BulkGrantResponse>> {
    require_capability(&state, &ctx, "role.custom.edit", AccessLevel::Full).await?;

    let outcome = state
        .custom_role_service
        .bulk_grant(id, request, Some(*ctx.user_id.as_uuid()))
        .await?;

    Ok(Json(outcome))
}

/// Live impact analysis for a custom role.
#[utoipa::path(
    get,
    path = "/custom-roles/{id}/impact-analysis",
    tag = "Authorization - Custom Roles",
    params(("id" = Uuid, Path, description = "Role ID")),
    responses(
        (status = 200, description = "Impact analysis", body = ImpactAnalysisResponse),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Role not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn role_impact_analysis(
    State(state): State<AuthorizationState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ImpactAnalysisResponse>> {
    require_capability(&state, &ctx, "role.custom.view", AccessLevel::View).await?;

    let analysis = state.custom_role_service.impact_analysis(id).await?;
    Ok(Json(analysis))
}

/// Promote a custom role's grant set into a reusable template.
#[utoipa::path(
    post,
    path = "/custom-roles/{id}/save-as-template",
    tag = "Authorization - Custom Roles",
    params(("id" = Uuid, Path, description = "Role ID")),
    request_body = SaveAsTemplateRequest,
    responses(
        (status = 201, description = "Template saved", body = TemplateResponse),
        (status = 400, description = "Invalid request"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Role not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn save_role_as_template(
    State(state): State<AuthorizationState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(request): Json<SaveAsTemplateRequest>,
) -> ApiResult<(StatusCode, Json<TemplateResponse>)> {
    require_capability(&state, &ctx, "role.custom.create", AccessLevel::Full).await?;

    let request = validated(request)?;
    let template = state.custom_role_service.save_as_template(id, request).await?;

    Ok((StatusCode::CREATED, Json(template)))
}

//! Handlers for capability catalog and introspection endpoints.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use uuid::Uuid;

use fleetgrid_db::{AccessLevel, CategorySummary};

use crate::auth::{require_bypass, require_capability, AuthContext};
use crate::error::ApiResult;
use crate::models::{
    CapabilityResponse, CheckQuery, EffectiveCapabilitiesResponse, SearchQuery, SeedResponse,
    UserOrgQuery,
};
use crate::router::AuthorizationState;

/// List the full capability catalog.
#[utoipa::path(
    get,
    path = "/capabilities",
    tag = "Authorization - Capabilities",
    responses(
        (status = 200, description = "Catalog listing", body = Vec<CapabilityResponse>),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_capabilities(
    State(state): State<AuthorizationState>,
    Extension(ctx): Extension<AuthContext>,
) -> ApiResult<Json<Vec<CapabilityResponse>>> {
    require_capability(&state, &ctx, "capability.catalog.view", AccessLevel::View).await?;

    let capabilities = state.capability_service.list().await?;
    Ok(Json(capabilities))
}

/// Summarize catalog categories.
#[utoipa::path(
    get,
    path = "/capabilities/categories",
    tag = "Authorization - Capabilities",
    responses(
        (status = 200, description = "Category summaries", body = Vec<CategorySummary>),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_categories(
    State(state): State<AuthorizationState>,
    Extension(ctx): Extension<AuthContext>,
) -> ApiResult<Json<Vec<CategorySummary>>> {
    require_capability(&state, &ctx, "capability.catalog.view", AccessLevel::View).await?;

    let categories = state.capability_service.categories().await?;
    Ok(Json(categories))
}

/// List capabilities within one category.
#[utoipa::path(
    get,
    path = "/capabilities/category/{category}",
    tag = "Authorization - Capabilities",
    params(("category" = String, Path, description = "Category name")),
    responses(
        (status = 200, description = "Capabilities in the category", body = Vec<CapabilityResponse>),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_by_category(
    State(state): State<AuthorizationState>,
    Extension(ctx): Extension<AuthContext>,
    Path(category): Path<String>,
) -> ApiResult<Json<Vec<CapabilityResponse>>> {
    require_capability(&state, &ctx, "capability.catalog.view", AccessLevel::View).await?;

    let capabilities = state.capability_service.by_category(&category).await?;
    Ok(Json(capabilities))
}

/// Search the catalog by keyword.
#[utoipa::path(
    get,
    path = "/capabilities/search",
    tag = "Authorization - Capabilities",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching capabilities", body = Vec<CapabilityResponse>),
        (status = 400, description = "Empty keyword"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn search_capabilities(
    State(state): State<AuthorizationState>,
    Extension(ctx): Extension<AuthContext>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<CapabilityResponse>>> {
    require_capability(&state, &ctx, "capability.catalog.view", AccessLevel::View).await?;

    let capabilities = state.capability_service.search(&query.keyword).await?;
    Ok(Json(capabilities))
}

/// Get one capability by key.
#[utoipa::path(
    get,
    path = "/capabilities/{key}",
    tag = "Authorization - Capabilities",
    params(("key" = String, Path, description = "Capability key")),
    responses(
        (status = 200, description = "Capability details", body = CapabilityResponse),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Capability not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_capability(
    State(state): State<AuthorizationState>,
    Extension(ctx): Extension<AuthContext>,
    Path(key): Path<String>,
) -> ApiResult<Json<CapabilityResponse>> {
    require_capability(&state, &ctx, "capability.catalog.view", AccessLevel::View).await?;

    let capability = state.capability_service.get(&key).await?;
    Ok(Json(capability))
}

/// A user's effective capability map within an organization.
///
/// Callers may always inspect themselves; inspecting another user requires
/// `role.custom.view`.
#[utoipa::path(
    get,
    path = "/capabilities/user/{id}",
    tag = "Authorization - Introspection",
    params(
        ("id" = Uuid, Path, description = "User ID"),
        UserOrgQuery
    ),
    responses(
        (status = 200, description = "Effective capabilities", body = EffectiveCapabilitiesResponse),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn user_effective_capabilities(
    State(state): State<AuthorizationState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Query(query): Query<UserOrgQuery>,
) -> ApiResult<Json<EffectiveCapabilitiesResponse>> {
    if *ctx.user_id.as_uuid() != id {
        require_capability(&state, &ctx, "role.custom.view", AccessLevel::View).await?;
    }

    let capabilities = state
        .evaluator
        .effective_capabilities(id, query.organization_id)
        .await?;

    Ok(Json(EffectiveCapabilitiesResponse {
        user_id: id,
        organization_id: query.organization_id,
        capabilities,
    }))
}

/// Check one capability for a user.
#[utoipa::path(
    get,
    path = "/capabilities/user/{id}/check/{key}",
    tag = "Authorization - Introspection",
    params(
        ("id" = Uuid, Path, description = "User ID"),
        ("key" = String, Path, description = "Capability key"),
        CheckQuery
    ),
    responses(
        (status = 200, description = "Allow/deny decision", body = fleetgrid_authorization::AccessDecision),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn user_check_capability(
    State(state): State<AuthorizationState>,
    Extension(ctx): Extension<AuthContext>,
    Path((id, key)): Path<(Uuid, String)>,
    Query(query): Query<CheckQuery>,
) -> ApiResult<Json<fleetgrid_authorization::AccessDecision>> {
    if *ctx.user_id.as_uuid() != id {
        require_capability(&state, &ctx, "role.custom.view", AccessLevel::View).await?;
    }

    let decision = state
        .evaluator
        .check_detailed(id, query.organization_id, &key, query.required_level)
        .await;

    Ok(Json(decision))
}

/// Seed the capability catalog (privileged bootstrap, idempotent).
#[utoipa::path(
    post,
    path = "/capabilities/seed",
    tag = "Authorization - Capabilities",
    responses(
        (status = 200, description = "Seeding result", body = SeedResponse),
        (status = 403, description = "Bypass role required"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn seed_capabilities(
    State(state): State<AuthorizationState>,
    Extension(ctx): Extension<AuthContext>,
) -> ApiResult<Json<SeedResponse>> {
    require_bypass(&state, &ctx).await?;

    let result = state.capability_service.seed().await?;
    Ok(Json(result))
}

//! Handlers for template registry endpoints.

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use fleetgrid_authorization::templates;
use fleetgrid_db::AccessLevel;

use crate::auth::{require_capability, AuthContext};
use crate::error::ApiResult;
use crate::models::{TemplateListResponse, TemplateResponse};
use crate::router::AuthorizationState;

/// List every template: built-ins followed by promoted snapshots.
#[utoipa::path(
    get,
    path = "/capability-templates",
    tag = "Authorization - Templates",
    responses(
        (status = 200, description = "Templates", body = TemplateListResponse),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_templates(
    State(state): State<AuthorizationState>,
    Extension(ctx): Extension<AuthContext>,
) -> ApiResult<Json<TemplateListResponse>> {
    require_capability(&state, &ctx, "role.custom.view", AccessLevel::View).await?;

    let items: Vec<TemplateResponse> = templates::list_all(&state.pool)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    let total = items.len();
    Ok(Json(TemplateListResponse { items, total }))
}

/// Get one template by key.
#[utoipa::path(
    get,
    path = "/capability-templates/{key}",
    tag = "Authorization - Templates",
    params(("key" = String, Path, description = "Template key")),
    responses(
        (status = 200, description = "Template details", body = TemplateResponse),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Template not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_template(
    State(state): State<AuthorizationState>,
    Extension(ctx): Extension<AuthContext>,
    Path(key): Path<String>,
) -> ApiResult<Json<TemplateResponse>> {
    require_capability(&state, &ctx, "role.custom.view", AccessLevel::View).await?;

    let template = templates::resolve_template(&state.pool, &key).await?;
    Ok(Json(template.into()))
}

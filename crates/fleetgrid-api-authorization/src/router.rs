//! Router configuration for the authorization management API.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use sqlx::PgPool;

use fleetgrid_authorization::AccessEvaluator;

use crate::handlers;
use crate::services::{CapabilityService, CustomRoleService};

/// Shared state for all authorization API handlers.
#[derive(Clone)]
pub struct AuthorizationState {
    /// Database connection pool.
    pub pool: PgPool,

    /// The evaluation hot path; also governs this API's own endpoints.
    pub evaluator: AccessEvaluator,

    /// Service for browsing and seeding the capability catalog.
    pub capability_service: Arc<CapabilityService>,

    /// Service for managing custom roles.
    pub custom_role_service: Arc<CustomRoleService>,
}

/// Create the authorization router with all endpoints.
///
/// # Routes
///
/// ## Capability catalog
/// - `GET  /capabilities`                       - List the catalog
/// - `GET  /capabilities/categories`            - Category summaries
/// - `GET  /capabilities/category/:category`    - Capabilities in a category
/// - `GET  /capabilities/search?keyword=`       - Keyword search
/// - `GET  /capabilities/:key`                  - Single capability
/// - `POST /capabilities/seed`                  - Seed (privileged, idempotent)
///
/// ## Introspection
/// - `GET /capabilities/user/:id?organization_id=`            - Effective map
/// - `GET /capabilities/user/:id/check/:key?required_level=`  - Single check
///
/// ## Templates
/// - `GET /capability-templates`        - List built-in and promoted templates
/// - `GET /capability-templates/:key`   - Single template
///
/// ## Custom roles
/// - `GET|POST /custom-roles`, `GET|PUT|DELETE /custom-roles/:id`
/// - `POST /custom-roles/from-template`, `POST /custom-roles/:id/clone`
/// - `GET|POST /custom-roles/:id/capabilities`
/// - `DELETE /custom-roles/:id/capabilities/:key`
/// - `POST /custom-roles/:id/capabilities/bulk`
/// - `GET /custom-roles/:id/impact-analysis`
/// - `POST /custom-roles/:id/save-as-template`
pub fn authorization_router(pool: PgPool) -> Router {
    let evaluator = AccessEvaluator::new(pool.clone());
    let capability_service = Arc::new(CapabilityService::new(pool.clone()));
    let custom_role_service = Arc::new(CustomRoleService::new(pool.clone()));

    let state = AuthorizationState {
        pool,
        evaluator,
        capability_service,
        custom_role_service,
    };

    Router::new()
        // Capability catalog
        .route("/capabilities", get(handlers::capabilities::list_capabilities))
        .route(
            "/capabilities/categories",
            get(handlers::capabilities::list_categories),
        )
        .route(
            "/capabilities/category/:category",
            get(handlers::capabilities::list_by_category),
        )
        .route(
            "/capabilities/search",
            get(handlers::capabilities::search_capabilities),
        )
        .route(
            "/capabilities/seed",
            post(handlers::capabilities::seed_capabilities),
        )
        // Introspection
        .route(
            "/capabilities/user/:id",
            get(handlers::capabilities::user_effective_capabilities),
        )
        .route(
            "/capabilities/user/:id/check/:key",
            get(handlers::capabilities::user_check_capability),
        )
        .route(
            "/capabilities/:key",
            get(handlers::capabilities::get_capability),
        )
        // Templates
        .route(
            "/capability-templates",
            get(handlers::templates::list_templates),
        )
        .route(
            "/capability-templates/:key",
            get(handlers::templates::get_template),
        )
        // Custom roles
        .route(
            "/custom-roles",
            get(handlers::custom_roles::list_custom_roles)
                .post(handlers::custom_roles::create_custom_role),
        )
        .route(
            "/custom-roles/from-template",
            post(handlers::custom_roles::create_from_templates),
        )
        .route(
            "/custom-roles/:id",
            get(handlers::custom_roles::get_custom_role)
                .put(handlers::custom_roles::update_custom_role)
                .delete(handlers::custom_roles::delete_custom_role),
        )
        .route(
            "/custom-roles/:id/clone",
            post(handlers::custom_roles::clone_custom_role),
        )
        .route(
            "/custom-roles/:id/capabilities",
            get(handlers::custom_roles::list_role_capabilities)
                .post(handlers::custom_roles::add_role_capability),
        )
        .route(
            "/custom-roles/:id/capabilities/bulk",
            post(handlers::custom_roles::bulk_grant_capabilities),
        )
        .route(
            "/custom-roles/:id/capabilities/:key",
            axum::routing::delete(handlers::custom_roles::remove_role_capability),
        )
        .route(
            "/custom-roles/:id/impact-analysis",
            get(handlers::custom_roles::role_impact_analysis),
        )
        .route(
            "/custom-roles/:id/save-as-template",
            post(handlers::custom_roles::save_role_as_template),
        )
        .with_state(state)
}

//! fleetgrid Database Layer
//!
//! Persistence for the authorization engine: the capability catalog, roles,
//! capability grants, custom-role metadata, promoted templates, and the
//! user-organization assignment mapping.
//!
//! Models expose static async methods over a [`sqlx::PgPool`] (or any
//! `PgExecutor`, so callers can pass a transaction where atomicity matters).

pub mod error;
pub mod migrations;
pub mod models;

pub use error::DbError;
pub use migrations::run_migrations;
pub use models::{
    AccessLevel, Capability, CategorySummary, CustomRoleMeta, OrganizationImpactRow, Role,
    RoleCapabilityGrant, RoleTemplateRecord, UserOrganization,
};

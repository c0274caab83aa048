//! Database entity models for fleetgrid-db.
//!
//! These models represent the authorization tables and provide
//! type-safe interactions with PostgreSQL.

pub mod access_level;
pub mod capability;
pub mod custom_role_meta;
pub mod role;
pub mod role_capability_grant;
pub mod role_template;
pub mod user_organization;

pub use access_level::AccessLevel;
pub use capability::{Capability, CategorySummary, NewCapability};
pub use custom_role_meta::{CustomRoleMeta, NewCustomRoleMeta};
pub use role::{CreateRole, Role, UpdateRole};
pub use role_capability_grant::{NewGrant, RoleCapabilityGrant};
pub use role_template::{NewRoleTemplate, RoleTemplateRecord};
pub use user_organization::{ImpactTotals, OrganizationImpactRow, UserOrganization};

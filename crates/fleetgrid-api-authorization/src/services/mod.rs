//! Services backing the authorization management API.

pub mod capability_service;
pub mod custom_role_service;

pub use capability_service::CapabilityService;
pub use custom_role_service::CustomRoleService;

//! HTTP handlers for the authorization management API.

pub mod capabilities;
pub mod custom_roles;
pub mod templates;

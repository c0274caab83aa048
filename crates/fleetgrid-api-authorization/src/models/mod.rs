//! Request/response DTOs for the authorization management API.

pub mod capability;
pub mod custom_role;
pub mod template;

pub use capability::*;
pub use custom_role::*;
pub use template::*;

//! Management API for the fleetgrid authorization engine.
//!
//! Exposes the capability catalog, template registry, custom role
//! management, and per-user capability introspection over axum. Every
//! mutating endpoint is governed by this same engine's `role.custom.*`
//! capabilities; catalog seeding is the sole privileged-bypass bootstrap
//! operation.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use auth::AuthContext;
pub use error::{ApiError, ApiResult};
pub use router::{authorization_router, AuthorizationState};

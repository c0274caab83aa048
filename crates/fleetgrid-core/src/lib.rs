//! fleetgrid Core Library
//!
//! Shared types for fleetgrid services.
//!
//! # Modules
//!
//! - [`ids`] - Strongly typed identifiers (`UserId`, `OrganizationId`, `RoleId`)

pub mod ids;

pub use ids::{OrganizationId, RoleId, UserId};

//! Error types for the authorization engine.

use fleetgrid_db::AccessLevel;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised by authorization engine operations.
#[derive(Debug, Error)]
pub enum AuthorizationError {
    /// The capability key does not exist in the persisted catalog.
    #[error("Capability not found: {0}")]
    CapabilityNotFound(String),

    /// The role does not exist (or is not a custom role where one is required).
    #[error("Role not found: {0}")]
    RoleNotFound(Uuid),

    /// No built-in or promoted template carries this key.
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    /// The requested level is not legal for that capability.
    #[error("Access level '{level}' is not allowed for capability '{key}'")]
    InvalidAccessLevel { key: String, level: AccessLevel },

    /// Deletion refused: the role still has active assignments.
    #[error("Role is referenced by {0} active assignment(s)")]
    RoleInUse(i64),

    /// A request failed semantic validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Convenience Result type for the authorization engine.
pub type Result<T> = std::result::Result<T, AuthorizationError>;

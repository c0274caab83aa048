//! Strongly Typed Identifiers
//!
//! This module provides type-safe identifier types for fleetgrid.
//! Using the newtype pattern, these types prevent accidental misuse of
//! different ID types at compile time.
//!
//! # Example
//!
//! ```
//! use fleetgrid_core::{OrganizationId, UserId};
//!
//! let org = OrganizationId::new();
//! let user = UserId::new();
//!
//! // Type safety: cannot pass UserId where OrganizationId is expected
//! fn requires_org(id: OrganizationId) -> String {
//!     id.to_string()
//! }
//!
//! let result = requires_org(org);
//! // requires_org(user); // This would not compile!
//! ```

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Error type for ID parsing failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    /// The type of ID that failed to parse
    pub id_type: &'static str,
    /// The underlying UUID parse error message
    pub message: String,
}

impl Display for ParseIdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to parse {}: {}", self.id_type, self.message)
    }
}

impl std::error::Error for ParseIdError {}

/// Macro to define a strongly-typed ID type
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random ID using UUID v4.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns a reference to the underlying UUID.
            #[must_use]
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|e| ParseIdError {
                        id_type: stringify!($name),
                        message: e.to_string(),
                    })
            }
        }
    };
}

define_id!(
    /// Strongly typed identifier for users.
    ///
    /// Identifies a user account across all organizations it belongs to.
    ///
    /// # Example
    ///
    /// ```
    /// use fleetgrid_core::UserId;
    ///
    /// let user_id = UserId::new();
    /// println!("User: {}", user_id);
    /// ```
    UserId
);

define_id!(
    /// Strongly typed identifier for organizations.
    ///
    /// Organizations are the tenancy boundary in fleetgrid: every role
    /// assignment and every authorization check is scoped to one.
    ///
    /// # Example
    ///
    /// ```
    /// use fleetgrid_core::OrganizationId;
    /// use uuid::Uuid;
    ///
    /// let org_id = OrganizationId::new();
    ///
    /// let uuid = Uuid::new_v4();
    /// let org_id = OrganizationId::from_uuid(uuid);
    /// assert_eq!(org_id.as_uuid(), &uuid);
    /// ```
    OrganizationId
);

define_id!(
    /// Strongly typed identifier for roles.
    ///
    /// Covers both predefined system roles and user-created custom roles.
    RoleId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_creates_valid_id() {
        let id = OrganizationId::new();
        let id_str = id.to_string();
        // UUID format: 8-4-4-4-12 hex digits
        assert_eq!(id_str.len(), 36);
        assert!(id_str.contains('-'));
    }

    #[test]
    fn test_from_uuid_preserves_value() {
        let uuid = Uuid::new_v4();
        let id = UserId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), &uuid);
    }

    #[test]
    fn test_display_returns_uuid_string() {
        let uuid = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        let id = RoleId::from_uuid(uuid);
        assert_eq!(id.to_string(), "550e8400-e29b-41d4-a716-446655440000");
    }

    #[test]
    fn test_default_creates_new_id() {
        let id1 = UserId::default();
        let id2 = UserId::default();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_parse_roundtrip() {
        let id = UserId::new();
        let parsed: UserId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = "not-a-uuid".parse::<RoleId>().unwrap_err();
        assert_eq!(err.id_type, "RoleId");
    }

    #[test]
    fn test_serde_transparent() {
        let id = OrganizationId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
    }
}

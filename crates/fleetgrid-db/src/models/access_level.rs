//! Access level lattice for capability grants.

use serde::{Deserialize, Serialize};
use sqlx::Type;

/// Ordered grant strength for a capability.
///
/// Levels form a total order (`None < View < Limited < Full`); a held level
/// satisfies a required level exactly when its rank is at least as high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Type)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[sqlx(type_name = "access_level", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    /// No access.
    None,
    /// Read-only access.
    View,
    /// Read plus restricted writes.
    Limited,
    /// Unrestricted access to the capability.
    Full,
}

impl AccessLevel {
    /// Numeric rank of this level within the lattice.
    #[must_use]
    pub fn rank(self) -> u8 {
        match self {
            Self::None => 0,
            Self::View => 1,
            Self::Limited => 2,
            Self::Full => 3,
        }
    }

    /// Whether a grant at this level satisfies a check requiring `required`.
    #[must_use]
    pub fn satisfies(self, required: AccessLevel) -> bool {
        self.rank() >= required.rank()
    }

    /// The stronger of two levels.
    #[must_use]
    pub fn max(self, other: AccessLevel) -> AccessLevel {
        if self.rank() >= other.rank() {
            self
        } else {
            other
        }
    }

    /// The weaker of two levels.
    #[must_use]
    pub fn min(self, other: AccessLevel) -> AccessLevel {
        if self.rank() <= other.rank() {
            self
        } else {
            other
        }
    }
}

impl std::fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::View => write!(f, "view"),
            Self::Limited => write!(f, "limited"),
            Self::Full => write!(f, "full"),
        }
    }
}

impl std::str::FromStr for AccessLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "view" => Ok(Self::View),
            "limited" => Ok(Self::Limited),
            "full" => Ok(Self::Full),
            other => Err(format!("Unknown access level: '{other}'")),
        }
    }
}

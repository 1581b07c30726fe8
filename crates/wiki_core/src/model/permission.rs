//! Per-namespace permission levels.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Access level granted to an actor for one namespace.
///
/// Variants are declared in capability order so `Ord` reflects
/// `Full ⊇ ReadOnly ⊇ None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    /// Namespace is hidden from the actor.
    None,
    /// Actor may read articles but not change them.
    ReadOnly,
    /// Actor may read, create and update articles.
    Full,
}

impl PermissionLevel {
    /// Stable wire string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::ReadOnly => "readonly",
            Self::Full => "full",
        }
    }

    pub fn is_readable(self) -> bool {
        self >= Self::ReadOnly
    }

    pub fn is_writable(self) -> bool {
        self >= Self::Full
    }

    /// Returns whether this level grants at least `required`.
    pub fn allows(self, required: PermissionLevel) -> bool {
        self >= required
    }
}

impl Default for PermissionLevel {
    fn default() -> Self {
        Self::None
    }
}

impl Display for PermissionLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PermissionLevel {
    type Err = PermissionLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "readonly" => Ok(Self::ReadOnly),
            "full" => Ok(Self::Full),
            other => Err(PermissionLevelError(other.to_string())),
        }
    }
}

/// Unknown permission string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionLevelError(pub String);

impl Display for PermissionLevelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unsupported permission level `{}`; expected none|readonly|full",
            self.0
        )
    }
}

impl Error for PermissionLevelError {}

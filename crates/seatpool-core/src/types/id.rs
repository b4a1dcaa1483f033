//! Strongly typed identifiers for sessions and their owners.
//!
//! [`SessionId`] wraps a random v4 [`Uuid`]; [`OwnerId`] wraps the opaque
//! identity string supplied by the requester and enforces that it is
//! non-empty. When the `sqlx` feature is enabled both types encode and
//! decode transparently for PostgreSQL.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::result::AppResult;

/// Maximum accepted length of an owner identity, in characters.
pub const MAX_OWNER_ID_LEN: usize = 255;

/// Unique identifier for an admitted license session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type), sqlx(transparent))]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a caller-supplied identifier, mapping malformed input to a
    /// validation error.
    pub fn parse(raw: &str) -> AppResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AppError::validation("Session ID is required"));
        }
        trimmed
            .parse()
            .map_err(|_| AppError::validation(format!("Malformed session ID: '{trimmed}'")))
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl From<Uuid> for SessionId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<SessionId> for Uuid {
    fn from(id: SessionId) -> Uuid {
        id.0
    }
}

/// Identity of the requester holding a session.
///
/// Always non-empty and at most [`MAX_OWNER_ID_LEN`] characters; surrounding
/// whitespace is stripped on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OwnerId(String);

impl OwnerId {
    /// Validate and wrap a caller-supplied owner identity.
    pub fn parse(raw: &str) -> AppResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AppError::validation("Owner ID is required"));
        }
        if trimmed.chars().count() > MAX_OWNER_ID_LEN {
            return Err(AppError::validation(format!(
                "Owner ID exceeds {MAX_OWNER_ID_LEN} characters"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Borrow the identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for OwnerId {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<OwnerId> for String {
    fn from(id: OwnerId) -> String {
        id.0
    }
}

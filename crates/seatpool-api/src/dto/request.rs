//! Request DTOs.
//!
//! Fields are optional so that a missing field is reported through the
//! API's own validation error rather than a deserialization rejection.

use serde::{Deserialize, Serialize};

use seatpool_core::error::AppError;
use seatpool_core::result::AppResult;
use seatpool_core::types::SessionId;

/// Login request body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Identity requesting a seat.
    pub owner_id: Option<String>,
}

impl LoginRequest {
    /// The supplied owner identity; trimming and length checks happen in the pool.
    pub fn owner_id(&self) -> AppResult<&str> {
        self.owner_id
            .as_deref()
            .ok_or_else(|| AppError::validation("Owner ID is required"))
    }
}

/// Body for requests that address an existing session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionRequest {
    /// Session identifier returned by login.
    pub session_id: Option<String>,
}

impl SessionRequest {
    /// Parse the session identifier.
    pub fn session_id(&self) -> AppResult<SessionId> {
        SessionId::parse(self.session_id.as_deref().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seatpool_core::error::ErrorKind;

    #[test]
    fn test_missing_fields_are_validation_errors() {
        assert_eq!(
            LoginRequest::default().owner_id().unwrap_err().kind,
            ErrorKind::Validation
        );
        assert_eq!(
            SessionRequest::default().session_id().unwrap_err().kind,
            ErrorKind::Validation
        );
    }

    #[test]
    fn test_session_id_parses() {
        let id = SessionId::new();
        let req = SessionRequest {
            session_id: Some(id.to_string()),
        };
        assert_eq!(req.session_id().unwrap(), id);
    }
}

//! Convenience result type alias for SeatPool.

use crate::error::AppError;

/// A specialized `Result` type for SeatPool operations.
pub type AppResult<T> = Result<T, AppError>;

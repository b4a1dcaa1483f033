//! # seatpool-api
//!
//! HTTP API layer for SeatPool built on Axum.
//!
//! Exposes the license pool (login, heartbeat, logout, occupancy, manual
//! sweep) and a health probe under `/api`, and maps domain outcomes and
//! errors onto HTTP status codes.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;

//! Core type definitions used across the SeatPool workspace.

pub mod id;

pub use id::{OwnerId, SessionId};

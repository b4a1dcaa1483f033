//! # seatpool-entity
//!
//! Domain entity models for SeatPool. Every struct in this crate
//! represents a persisted record or a domain value object.

pub mod session;

pub use session::Session;

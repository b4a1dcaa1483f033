//! Repository implementations for SeatPool entities.

pub mod session;

pub use session::SessionRepository;

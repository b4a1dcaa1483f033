//! # seatpool-database
//!
//! PostgreSQL connection management, embedded migrations, and the
//! concrete repository for the `active_sessions` table.

pub mod connection;
pub mod repositories;

pub use connection::DatabasePool;
pub use repositories::SessionRepository;

//! PostgreSQL storage for chirps.
//!
//! [`PostgresRepository`] implements [`ChirpRepository`] on a `sqlx` pool.
//! Core types are re-exported from `chirper_core`.

pub mod config;
pub mod postgres;
mod query;
mod upsert;

pub use chirper_core::{Chirp, ChirpRepository, InMemoryRepository, NewChirp, StorageError};
pub use config::{DatabaseConfig, SslMode};
pub use postgres::PostgresRepository;

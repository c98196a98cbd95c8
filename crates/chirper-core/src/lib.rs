//! Core types and traits for the Chirper service.
//!
//! This crate provides the chirp domain model, the repository contract
//! shared by every storage backend, and an in-memory backend.

pub mod chirp;
pub mod error;
pub mod repository;

pub use chirp::{Chirp, NewChirp};
pub use error::{Result, StorageError};
pub use repository::{ChirpRepository, InMemoryRepository};

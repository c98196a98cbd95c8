//! HTTP gateway for the Chirper service.
//!
//! Exposes chirp listing, creation and the admin count endpoint over
//! `axum`, backed by any [`ChirpRepository`](chirper_core::ChirpRepository).

pub mod app;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod model;
pub mod state;

pub use app::{App, Deployment};
pub use error::{ApiError, Result};
pub use state::AppState;

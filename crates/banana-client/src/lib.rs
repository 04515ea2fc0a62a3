//! HTTP client of the banana slides backend.
//!
//! [`ApiClient`] implements [`banana_core::TaskBackend`] for material generation and
//! settings-service tests, and wraps the settings, materials, projects, reference file and
//! user template routes.

mod asset;
pub use asset::cache_version;

mod client;
pub use client::ApiClient;

mod config;
pub use config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_MS};

mod error;
pub use error::ClientError;

mod library;
mod settings;
mod tasks;

#[cfg(test)]
mod mock;

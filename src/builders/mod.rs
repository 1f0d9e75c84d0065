//! Builders
//!
//! Fluent builder patterns for OIDC settings.

pub mod config;

pub use config::{oidc_settings, OidcSettingsBuilder};

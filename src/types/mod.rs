//! OIDC Types
//!
//! Core type definitions for the implicit/hybrid flow client.

pub mod claims;
pub mod config;
pub mod metadata;
pub mod request;
pub mod response;

pub use claims::*;
pub use config::*;
pub use metadata::*;
pub use request::*;
pub use response::*;

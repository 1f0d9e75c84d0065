//! OIDC Core Components
//!
//! Core infrastructure for OIDC operations.

pub mod jws;
pub mod metadata;
pub mod state;
pub mod transport;

pub use jws::*;
pub use metadata::*;
pub use state::*;
pub use transport::*;

//! OIDC Flows
//!
//! Implicit and hybrid flow request building and response processing.
//!
//! - **Authorization request**: authorization URL, request state, logout URL
//! - **Response processing**: request state consumption and token validation

pub mod authorization_request;
pub mod response;

pub use authorization_request::{build_url, AuthorizationRequestBuilder};
pub use response::ResponseProcessor;

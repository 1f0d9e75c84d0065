//! Token Validation
//!
//! ID token claim validation and access token binding.

pub mod access_token;
pub mod id_token;

pub use access_token::{compute_at_hash, AccessTokenValidator};
pub use id_token::{unix_now, validate_claims, IdTokenValidator, MAX_TOKEN_AGE_SECS};

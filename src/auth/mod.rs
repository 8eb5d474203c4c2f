//! Authentication and authorization for Precinct
//!
//! Provides:
//! - Session token issuance and validation
//! - Password hashing with Argon2
//! - Account roles
//! - The guard that resolves actors and checks role and jurisdiction

pub mod guard;
pub mod jwt;
pub mod password;
pub mod roles;

pub use guard::{require_jurisdiction_match, require_role, Actor, AuthGuard};
pub use jwt::{extract_token, extract_token_from_cookie, extract_token_from_header, Claims, TokenCodec};
pub use password::{hash_password, verify_password};
pub use roles::Role;

//! Precinct - incident case registry for citizens and police
//!
//! Citizens register, file incident cases and follow the cases filed about
//! them. Police officers file cases on behalf of citizens and manage the
//! status of every case in their own jurisdiction.
//!
//! ## Services
//!
//! - **Identity**: account registration, credential checks, session tokens
//! - **Guard**: resolves the actor behind a token, checks role and jurisdiction
//! - **Cases**: filing, status changes and role-scoped case queries
//! - **Server**: JSON over HTTP/1 with MongoDB or in-memory record stores

pub mod auth;
pub mod cases;
pub mod clock;
pub mod config;
pub mod db;
pub mod identity;
pub mod routes;
pub mod server;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{PrecinctError, Result};

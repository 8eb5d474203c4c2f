//! Shared types for Precinct

pub mod error;

pub use error::{PrecinctError, Result};

//! Configuration for Precinct
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::SocketAddr;

use crate::auth::jwt::DEFAULT_TOKEN_EXPIRY_SECONDS;

/// Well-known signing secret used in dev mode when none is configured
pub const DEV_JWT_SECRET: &str = "dev-only-insecure-secret-do-not-deploy-0000";

/// Precinct - incident case registry for citizens and police
#[derive(Parser, Debug, Clone)]
#[command(name = "precinct")]
#[command(about = "Incident case registry with jurisdiction-scoped police access")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:3000")]
    pub listen: SocketAddr,

    /// Enable development mode (well-known signing secret, in-memory fallback storage)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "precinct")]
    pub mongodb_db: String,

    /// Secret for token signing (required in production, at least 32 characters)
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Token lifetime in seconds
    #[arg(long, env = "JWT_EXPIRY_SECONDS", default_value_t = DEFAULT_TOKEN_EXPIRY_SECONDS)]
    pub jwt_expiry_seconds: u64,

    /// Origin allowed to call the API from a browser
    #[arg(long, env = "ALLOWED_ORIGIN", default_value = "http://localhost:5173")]
    pub allowed_origin: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Get effective signing secret (uses a fixed one in dev mode when unset)
    pub fn jwt_secret(&self) -> Option<String> {
        match (&self.jwt_secret, self.dev_mode) {
            (Some(secret), _) => Some(secret.clone()),
            (None, true) => Some(DEV_JWT_SECRET.to_string()),
            (None, false) => None,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.dev_mode && self.jwt_secret.is_none() {
            return Err("JWT_SECRET is required in production mode".to_string());
        }

        if self.jwt_expiry_seconds == 0 {
            return Err("JWT_EXPIRY_SECONDS must be greater than zero".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        let mut argv = vec!["precinct"];
        argv.extend_from_slice(args);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["--jwt-secret", "a-production-secret-of-32-chars-min"]);
        assert_eq!(args.listen.port(), 3000);
        assert_eq!(args.jwt_expiry_seconds, 24 * 60 * 60);
        assert_eq!(args.mongodb_db, "precinct");
        assert!(!args.dev_mode);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_production_requires_secret() {
        let args = parse(&[]);
        assert!(args.validate().is_err());
        assert!(args.jwt_secret().is_none());
    }

    #[test]
    fn test_dev_mode_falls_back_to_dev_secret() {
        let args = parse(&["--dev-mode"]);
        assert!(args.validate().is_ok());
        assert_eq!(args.jwt_secret().as_deref(), Some(DEV_JWT_SECRET));
    }

    #[test]
    fn test_zero_expiry_rejected() {
        let args = parse(&["--dev-mode", "--jwt-expiry-seconds", "0"]);
        assert!(args.validate().is_err());
    }
}

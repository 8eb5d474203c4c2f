//! Health and version endpoints
//!
//! - /, /health - Liveness probe, 200 while the process is serving
//! - /version   - Build information for deployment verification
//!
//! The liveness body reports which record store is active. A dev-mode
//! instance running on the in-memory fallback still answers healthy but
//! is marked "degraded" so operators notice nothing is being persisted.

use hyper::{Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;

use crate::routes::common::{json_response, BoxBody};
use crate::server::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    /// 'online' or 'degraded'
    pub status: &'static str,
    pub version: &'static str,
    /// Record store backing the registry ("mongodb" or "memory")
    pub storage: &'static str,
    pub mode: &'static str,
    /// Seconds since the server state was built
    pub uptime: u64,
    pub timestamp: String,
}

fn build_health_response(state: &AppState) -> HealthResponse {
    let persistent = state.storage_backend != "memory";
    HealthResponse {
        healthy: true,
        status: if persistent { "online" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        storage: state.storage_backend,
        mode: if state.args.dev_mode {
            "development"
        } else {
            "production"
        },
        uptime: state.started_at.elapsed().as_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    }
}

/// Handle liveness probe (/, /health)
pub fn health_check(state: Arc<AppState>) -> Response<BoxBody> {
    json_response(StatusCode::OK, &build_health_response(&state))
}

#[derive(Serialize)]
pub struct VersionResponse {
    pub version: &'static str,
    /// Git commit hash (short)
    pub commit: &'static str,
    pub commit_full: &'static str,
    pub build_time: &'static str,
    pub service: &'static str,
}

/// Handle version endpoint (/version)
pub fn version_info() -> Response<BoxBody> {
    let response = VersionResponse {
        version: env!("CARGO_PKG_VERSION"),
        commit: option_env!("GIT_COMMIT_SHORT").unwrap_or("unknown"),
        commit_full: option_env!("GIT_COMMIT_FULL").unwrap_or("unknown"),
        build_time: option_env!("BUILD_TIMESTAMP").unwrap_or("unknown"),
        service: "precinct",
    };
    json_response(StatusCode::OK, &response)
}

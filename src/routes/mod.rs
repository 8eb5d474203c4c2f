//! HTTP routes for Precinct

pub mod auth_routes;
pub mod case_routes;
pub mod common;
pub mod health;

pub use auth_routes::handle_auth_request;
pub use case_routes::handle_case_request;
pub use common::{
    empty_body, error_response, full_body, json_response, method_not_allowed, route_not_found,
    BoxBody,
};
pub use health::{health_check, version_info};

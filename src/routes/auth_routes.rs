//! HTTP routes for authentication
//!
//! - POST /api/auth/register - Create an account and get a token
//! - POST /api/auth/login    - Authenticate and get a token
//! - POST /api/auth/logout   - Clear the token cookie (tokens are stateless)
//! - GET  /api/auth/getMe    - Profile of the account behind the token

use hyper::body::Body;
use hyper::header::{HeaderValue, SET_COOKIE};
use hyper::{Method, Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::jwt::TOKEN_COOKIE;
use crate::auth::Role;
use crate::db::schemas::Account;
use crate::identity::{AuthSession, Registration};
use crate::routes::common::{
    json_response, method_not_allowed, parse_json_body, request_token, respond, route_not_found,
    BoxBody,
};
use crate::server::AppState;
use crate::types::Result;

// =============================================================================
// Request/Response Types
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct FullNameInput {
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub fullname: FullNameInput,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub location: String,
}

impl From<RegisterRequest> for Registration {
    fn from(req: RegisterRequest) -> Self {
        Self {
            first_name: req.fullname.firstname,
            last_name: req.fullname.lastname,
            email: req.email,
            password: req.password,
            role: req.role,
            jurisdiction: req.location,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub role: Role,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub success: bool,
    pub data: Account,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

// =============================================================================
// Route Handlers
// =============================================================================

fn session_response(session: AuthSession, status: StatusCode, max_age: i64) -> Response<BoxBody> {
    let cookie = format!(
        "{}={}; HttpOnly; Path=/; Max-Age={}; SameSite=Lax",
        TOKEN_COOKIE, session.token, max_age
    );
    let mut response = json_response(
        status,
        &AuthResponse {
            success: true,
            token: session.token,
            role: session.account.role,
        },
    );
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().insert(SET_COOKIE, value);
    }
    response
}

/// POST /api/auth/register
async fn handle_register<B>(req: Request<B>, state: Arc<AppState>) -> Result<Response<BoxBody>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let body: RegisterRequest = parse_json_body(req).await?;
    let session = state.identity.register(body.into()).await?;
    Ok(session_response(
        session,
        StatusCode::CREATED,
        state.tokens.expiry_seconds(),
    ))
}

/// POST /api/auth/login
async fn handle_login<B>(req: Request<B>, state: Arc<AppState>) -> Result<Response<BoxBody>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let body: LoginRequest = parse_json_body(req).await?;
    let session = state.identity.authenticate(&body.email, &body.password).await?;
    Ok(session_response(
        session,
        StatusCode::OK,
        state.tokens.expiry_seconds(),
    ))
}

/// POST /api/auth/logout
fn handle_logout() -> Response<BoxBody> {
    let mut response = json_response(
        StatusCode::OK,
        &SuccessResponse {
            success: true,
            message: "Logged out".into(),
        },
    );
    let cookie = format!("{}=; HttpOnly; Path=/; Max-Age=0; SameSite=Lax", TOKEN_COOKIE);
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().insert(SET_COOKIE, value);
    }
    response
}

/// GET /api/auth/getMe
async fn handle_me<B>(req: Request<B>, state: Arc<AppState>) -> Result<Response<BoxBody>> {
    let token = request_token(&req);
    let actor = state.guard.authenticate_request(token.as_deref()).await?;
    let account = state.identity.get_account(&actor.id).await?;

    Ok(json_response(
        StatusCode::OK,
        &MeResponse {
            success: true,
            data: account,
        },
    ))
}

// =============================================================================
// Main Router
// =============================================================================

/// Handle auth-related HTTP requests.
///
/// Returns Some(response) if request was handled, None if not an auth route.
pub async fn handle_auth_request<B>(req: Request<B>, state: Arc<AppState>) -> Option<Response<BoxBody>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let path = req.uri().path().to_string();
    if !path.starts_with("/api/auth") {
        return None;
    }
    let method = req.method().clone();

    let response = match (&method, path.trim_end_matches('/')) {
        (&Method::POST, "/api/auth/register") => respond(handle_register(req, state).await),
        (&Method::POST, "/api/auth/login") => respond(handle_login(req, state).await),
        (&Method::POST, "/api/auth/logout") => handle_logout(),
        (&Method::GET, "/api/auth/getMe") | (&Method::GET, "/api/auth/me") => {
            respond(handle_me(req, state).await)
        }

        (_, "/api/auth/register")
        | (_, "/api/auth/login")
        | (_, "/api/auth/logout")
        | (_, "/api/auth/getMe")
        | (_, "/api/auth/me") => method_not_allowed(),

        _ => route_not_found(&path),
    };

    Some(response)
}

//! Response and request helpers shared by the route handlers

use bytes::Bytes;
use http_body_util::{BodyExt, Full, Limited};
use hyper::body::Body;
use hyper::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE};
use hyper::{Request, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{error, warn};

use crate::auth::extract_token;
use crate::types::PrecinctError;

pub type BoxBody = http_body_util::combinators::BoxBody<Bytes, hyper::Error>;

/// Largest JSON body accepted
pub const MAX_BODY_BYTES: usize = 10 * 1024;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: &'static str,
}

pub fn full_body(data: impl Into<Bytes>) -> BoxBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed()
}

pub fn empty_body() -> BoxBody {
    Full::new(Bytes::new())
        .map_err(|never| match never {})
        .boxed()
}

pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<BoxBody> {
    let json = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());

    let mut response = Response::new(full_body(json));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, hyper::header::HeaderValue::from_static("application/json"));
    response
}

pub fn error_response(err: PrecinctError) -> Response<BoxBody> {
    if matches!(err, PrecinctError::Internal(_) | PrecinctError::Config(_)) {
        error!("Request failed: {}", err);
    } else if err.is_retryable() {
        warn!("Request failed, retryable: {}", err);
    }
    let code = err.code();
    let (status, message) = err.into_status_code_and_body();
    json_response(
        status,
        &ErrorResponse {
            success: false,
            error: message,
            code,
        },
    )
}

pub fn method_not_allowed() -> Response<BoxBody> {
    json_response(
        StatusCode::METHOD_NOT_ALLOWED,
        &ErrorResponse {
            success: false,
            error: "Method not allowed".into(),
            code: "METHOD_NOT_ALLOWED",
        },
    )
}

pub fn route_not_found(path: &str) -> Response<BoxBody> {
    json_response(
        StatusCode::NOT_FOUND,
        &ErrorResponse {
            success: false,
            error: format!("No route for {}", path),
            code: "NOT_FOUND",
        },
    )
}

/// Collapse a handler result into a response
pub fn respond(result: Result<Response<BoxBody>, PrecinctError>) -> Response<BoxBody> {
    result.unwrap_or_else(error_response)
}

/// Session token from the Authorization header, falling back to the `token` cookie
pub fn request_token<B>(req: &Request<B>) -> Option<String> {
    let header = |name: hyper::header::HeaderName| req.headers().get(name).and_then(|v| v.to_str().ok());
    extract_token(header(AUTHORIZATION), header(COOKIE)).map(str::to_owned)
}

pub async fn parse_json_body<T, B>(req: Request<B>) -> Result<T, PrecinctError>
where
    T: DeserializeOwned,
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let bytes = Limited::new(req.into_body(), MAX_BODY_BYTES)
        .collect()
        .await
        .map_err(|e| PrecinctError::Validation(format!("Failed to read body: {}", e)))?
        .to_bytes();

    serde_json::from_slice(&bytes).map_err(|e| PrecinctError::Validation(format!("Invalid JSON: {}", e)))
}

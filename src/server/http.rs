//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo for async handling. Every response leaves
//! through `handle_request`, which stamps the CORS headers for the
//! configured browser origin.

use hyper::body::{Body, Incoming};
use hyper::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
    ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::auth::{AuthGuard, TokenCodec};
use crate::cases::CaseRegistry;
use crate::clock::{Clock, SystemClock};
use crate::config::Args;
use crate::db::{AccountStore, CaseStore, InMemoryAccountStore, InMemoryCaseStore};
use crate::identity::IdentityStore;
use crate::routes::{self, empty_body, route_not_found, BoxBody};
use crate::types::{PrecinctError, Result};

/// Shared application state
pub struct AppState {
    pub args: Args,
    pub tokens: Arc<TokenCodec>,
    pub identity: Arc<IdentityStore>,
    pub guard: Arc<AuthGuard>,
    pub cases: Arc<CaseRegistry>,
    /// "mongodb" or "memory"
    pub storage_backend: &'static str,
    pub started_at: Instant,
}

impl AppState {
    /// Wire the services over the given record stores
    pub fn new(
        args: Args,
        accounts: Arc<dyn AccountStore>,
        cases: Arc<dyn CaseStore>,
        storage_backend: &'static str,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let secret = args.jwt_secret().ok_or_else(|| {
            PrecinctError::Config("JWT_SECRET is required in production mode".into())
        })?;
        let tokens = Arc::new(TokenCodec::new(
            secret,
            args.jwt_expiry_seconds,
            Arc::clone(&clock),
        )?);

        let identity = Arc::new(IdentityStore::new(
            accounts,
            Arc::clone(&tokens),
            Arc::clone(&clock),
        ));
        let guard = Arc::new(AuthGuard::new(Arc::clone(&tokens), Arc::clone(&identity)));
        let cases = Arc::new(CaseRegistry::new(cases, Arc::clone(&identity), clock));

        Ok(Self {
            args,
            tokens,
            identity,
            guard,
            cases,
            storage_backend,
            started_at: Instant::now(),
        })
    }

    /// State backed by process-local stores; nothing survives a restart
    pub fn in_memory(args: Args) -> Result<Self> {
        Self::new(
            args,
            Arc::new(InMemoryAccountStore::new()),
            Arc::new(InMemoryCaseStore::new()),
            "memory",
            Arc::new(SystemClock),
        )
    }
}

/// Run the HTTP server
pub async fn run(state: Arc<AppState>) -> Result<()> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!(
        "Precinct listening on {} (storage: {})",
        state.args.listen, state.storage_backend
    );

    if state.args.dev_mode {
        warn!("Development mode enabled - do not use the built-in signing secret in production");
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new()
                        .preserve_header_case(true)
                        .title_case_headers(true)
                        .serve_connection(io, service)
                        .await
                    {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> std::result::Result<Response<BoxBody>, hyper::Error> {
    info!("[{}] {} {}", addr, req.method(), req.uri().path());

    let mut response = route(Arc::clone(&state), req).await;
    apply_cors(&mut response, &state.args.allowed_origin);
    Ok(response)
}

/// Dispatch a request to its handler
pub async fn route<B>(state: Arc<AppState>, req: Request<B>) -> Response<BoxBody>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    if method == Method::OPTIONS {
        return preflight_response();
    }

    if path.starts_with("/api/auth") {
        if let Some(response) = routes::handle_auth_request(req, Arc::clone(&state)).await {
            return response;
        }
        return route_not_found(&path);
    }

    if path.starts_with("/api/fir") {
        if let Some(response) = routes::handle_case_request(req, Arc::clone(&state)).await {
            return response;
        }
        return route_not_found(&path);
    }

    match (method, path.as_str()) {
        (Method::GET, "/") | (Method::GET, "/health") => routes::health_check(state),
        (Method::GET, "/version") => routes::version_info(),
        _ => route_not_found(&path),
    }
}

fn preflight_response() -> Response<BoxBody> {
    let mut response = Response::new(empty_body());
    *response.status_mut() = StatusCode::NO_CONTENT;
    let headers = response.headers_mut();
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, PUT, OPTIONS"),
    );
    response
}

fn apply_cors(response: &mut Response<BoxBody>, allowed_origin: &str) {
    let headers = response.headers_mut();
    match HeaderValue::from_str(allowed_origin) {
        Ok(origin) => {
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
            headers.insert(
                ACCESS_CONTROL_ALLOW_CREDENTIALS,
                HeaderValue::from_static("true"),
            );
        }
        Err(_) => warn!("ALLOWED_ORIGIN is not a valid header value: {}", allowed_origin),
    }
}

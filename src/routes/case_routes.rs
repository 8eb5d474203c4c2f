//! HTTP routes for incident cases
//!
//! Citizen side:
//! - POST /api/fir/citizen      - File a case
//! - GET  /api/fir/citizen      - Cases where the caller is the reporting citizen
//! - GET  /api/fir/citizen/{id} - One of those cases
//!
//! Police side, scoped to the officer's jurisdiction:
//! - POST /api/fir/police                     - File a case on behalf of a citizen
//! - GET  /api/fir/police                     - Cases in the jurisdiction
//! - GET  /api/fir/police/{id}                - One of those cases
//! - PUT  /api/fir/police/updateStatus/{id}   - Change a case's status

use hyper::body::Body;
use hyper::{Method, Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::Actor;
use crate::cases::CaseFiling;
use crate::db::schemas::CaseDoc;
use crate::routes::common::{
    json_response, method_not_allowed, parse_json_body, request_token, respond, route_not_found,
    BoxBody,
};
use crate::server::AppState;
use crate::types::Result;

#[derive(Debug, Deserialize)]
pub struct FileCaseRequest {
    #[serde(default, rename = "citizenEmail")]
    pub citizen_email: String,
    #[serde(default, rename = "typeOfCrime")]
    pub type_of_crime: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "placeOfCrime")]
    pub place_of_crime: String,
    #[serde(default)]
    pub location: String,
}

impl From<FileCaseRequest> for CaseFiling {
    fn from(req: FileCaseRequest) -> Self {
        Self {
            citizen_email: req.citizen_email,
            crime_category: req.type_of_crime,
            description: req.description,
            place_of_crime: req.place_of_crime,
            jurisdiction: req.location,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CaseMessageResponse {
    pub message: String,
    pub fir: CaseDoc,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CaseListResponse {
    #[serde(rename = "FIRs")]
    pub firs: Vec<CaseDoc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CaseResponse {
    #[serde(rename = "Fir")]
    pub fir: CaseDoc,
}

/// Which side of the API a request came in on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Citizen,
    Police,
}

async fn actor_for<B>(req: &Request<B>, state: &AppState) -> Result<Actor> {
    let token = request_token(req);
    state.guard.authenticate_request(token.as_deref()).await
}

async fn handle_file<B>(req: Request<B>, state: Arc<AppState>, side: Side) -> Result<Response<BoxBody>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let actor = actor_for(&req, &state).await?;
    let body: FileCaseRequest = parse_json_body(req).await?;
    let fir = match side {
        Side::Citizen => state.cases.file_as_citizen(&actor, body.into()).await?,
        Side::Police => state.cases.file_as_officer(&actor, body.into()).await?,
    };

    Ok(json_response(
        StatusCode::CREATED,
        &CaseMessageResponse {
            message: "FIR created successfully".into(),
            fir,
        },
    ))
}

async fn handle_list<B>(req: Request<B>, state: Arc<AppState>, side: Side) -> Result<Response<BoxBody>> {
    let actor = actor_for(&req, &state).await?;
    let firs = match side {
        Side::Citizen => state.cases.list_by_citizen(&actor).await?,
        Side::Police => state.cases.list_by_jurisdiction(&actor).await?,
    };
    Ok(json_response(StatusCode::OK, &CaseListResponse { firs }))
}

async fn handle_get<B>(
    req: Request<B>,
    state: Arc<AppState>,
    side: Side,
    case_id: &str,
) -> Result<Response<BoxBody>> {
    let actor = actor_for(&req, &state).await?;
    let fir = match side {
        Side::Citizen => state.cases.get_by_id_for_citizen(&actor, case_id).await?,
        Side::Police => state.cases.get_by_id_for_officer(&actor, case_id).await?,
    };
    Ok(json_response(StatusCode::OK, &CaseResponse { fir }))
}

async fn handle_update_status<B>(
    req: Request<B>,
    state: Arc<AppState>,
    case_id: &str,
) -> Result<Response<BoxBody>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let actor = actor_for(&req, &state).await?;
    let body: StatusRequest = parse_json_body(req).await?;
    let fir = state.cases.update_status(&actor, case_id, &body.status).await?;

    Ok(json_response(
        StatusCode::OK,
        &CaseMessageResponse {
            message: "FIR status updated successfully".into(),
            fir,
        },
    ))
}

/// Handle case-related HTTP requests.
///
/// Returns Some(response) if request was handled, None if not a case route.
pub async fn handle_case_request<B>(req: Request<B>, state: Arc<AppState>) -> Option<Response<BoxBody>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let path = req.uri().path().to_string();
    let rest = path.strip_prefix("/api/fir")?;
    let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
    let method = req.method().clone();

    let response = match (&method, segments.as_slice()) {
        (&Method::POST, ["citizen"]) => respond(handle_file(req, state, Side::Citizen).await),
        (&Method::GET, ["citizen"]) => respond(handle_list(req, state, Side::Citizen).await),
        (&Method::GET, ["citizen", id]) => respond(handle_get(req, state, Side::Citizen, id).await),

        (&Method::POST, ["police"]) => respond(handle_file(req, state, Side::Police).await),
        (&Method::GET, ["police"]) => respond(handle_list(req, state, Side::Police).await),
        (&Method::PUT, ["police", "updateStatus", id]) => {
            respond(handle_update_status(req, state, id).await)
        }
        (&Method::GET, ["police", id]) if *id != "updateStatus" => {
            respond(handle_get(req, state, Side::Police, id).await)
        }

        (_, ["citizen"])
        | (_, ["citizen", _])
        | (_, ["police"])
        | (_, ["police", _])
        | (_, ["police", "updateStatus", _]) => method_not_allowed(),

        _ => route_not_found(&path),
    };

    Some(response)
}

//! Case lifecycle through the library surface, on in-memory stores

use chrono::{Duration, TimeZone, Utc};
use clap::Parser;
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};

use precinct::auth::{Actor, Role};
use precinct::cases::CaseFiling;
use precinct::clock::ManualClock;
use precinct::db::schemas::{CaseStatus, CrimeCategory};
use precinct::db::{InMemoryAccountStore, InMemoryCaseStore};
use precinct::identity::Registration;
use precinct::{AppState, Args, PrecinctError};

struct Harness {
    state: AppState,
    clock: Arc<ManualClock>,
}

fn harness() -> Harness {
    let args = Args::try_parse_from(["precinct", "--dev-mode"]).unwrap();
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 5, 2, 8, 30, 0).unwrap(),
    ));
    let state = AppState::new(
        args,
        Arc::new(InMemoryAccountStore::new()),
        Arc::new(InMemoryCaseStore::new()),
        "memory",
        clock.clone(),
    )
    .unwrap();
    Harness { state, clock }
}

impl Harness {
    /// Register an account and resolve it through its token, the way a request would
    async fn sign_up(&self, first: &str, email: &str, role: &str, location: &str) -> (Actor, String) {
        let session = assert_ok!(
            self.state
                .identity
                .register(Registration {
                    first_name: first.into(),
                    last_name: "Tester".into(),
                    email: email.into(),
                    password: "hunter22".into(),
                    role: role.into(),
                    jurisdiction: location.into(),
                })
                .await
        );
        let actor = assert_ok!(self.state.guard.authenticate_request(Some(&session.token)).await);
        (actor, session.token)
    }
}

fn filing(email: &str, category: &str, location: &str) -> CaseFiling {
    CaseFiling {
        citizen_email: email.into(),
        crime_category: category.into(),
        description: "Bicycle taken from the rack".into(),
        place_of_crime: "Market Street".into(),
        jurisdiction: location.into(),
    }
}

#[tokio::test]
async fn citizen_files_and_officer_resolves() {
    let h = harness();
    let (ann, _) = h.sign_up("Ann", "ann@example.com", "CITIZEN", "Central").await;
    let (officer, _) = h.sign_up("Bob", "bob@example.com", "POLICE", "Central").await;

    let case = assert_ok!(
        h.state
            .cases
            .file_as_citizen(&ann, filing("ann@example.com", "Property Crime", "Central"))
            .await
    );
    assert_eq!(case.status, CaseStatus::Filed);
    assert_eq!(case.crime_category, CrimeCategory::PropertyCrime);
    assert_eq!(case.assigned_officer, None);
    assert_eq!(case.reporting_citizen, ann.id);

    h.clock.advance(Duration::minutes(5));
    let resolved = assert_ok!(h.state.cases.update_status(&officer, &case.id, "RESOLVED").await);
    assert_eq!(resolved.status, CaseStatus::Resolved);
    assert_eq!(resolved.assigned_officer.as_deref(), Some(officer.id.as_str()));
    assert!(resolved.updated_at > resolved.created_at);
    assert_eq!(resolved.created_at, case.created_at);

    let mine = assert_ok!(h.state.cases.list_by_citizen(&ann).await);
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].status, CaseStatus::Resolved);

    let (other, _) = h.sign_up("Dee", "dee@example.com", "CITIZEN", "Central").await;
    assert!(assert_ok!(h.state.cases.list_by_citizen(&other).await).is_empty());
    let err = assert_err!(h.state.cases.get_by_id_for_citizen(&other, &case.id).await);
    assert!(matches!(err, PrecinctError::Forbidden(_)));
}

#[tokio::test]
async fn officer_filing_is_assigned_and_under_investigation() {
    let h = harness();
    h.sign_up("Ann", "ann@example.com", "CITIZEN", "Central").await;
    let (officer, _) = h.sign_up("Bob", "bob@example.com", "POLICE", "Central").await;

    let case = assert_ok!(
        h.state
            .cases
            .file_as_officer(&officer, filing("ann@example.com", "Cyber Crime", "Central"))
            .await
    );
    assert_eq!(case.status, CaseStatus::UnderInvestigation);
    assert_eq!(case.assigned_officer.as_deref(), Some(officer.id.as_str()));

    let listed = assert_ok!(h.state.cases.list_by_jurisdiction(&officer).await);
    assert_eq!(listed, vec![case]);
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let h = harness();
    h.sign_up("Ann", "ann@example.com", "CITIZEN", "Central").await;

    let err = assert_err!(
        h.state
            .identity
            .register(Registration {
                first_name: "Another".into(),
                last_name: "Person".into(),
                email: "ann@example.com".into(),
                password: "password1".into(),
                role: "POLICE".into(),
                jurisdiction: "Harbor".into(),
            })
            .await
    );
    assert!(matches!(err, PrecinctError::Conflict(_)));
}

#[tokio::test]
async fn officers_cannot_touch_other_jurisdictions() {
    let h = harness();
    let (ann, _) = h.sign_up("Ann", "ann@example.com", "CITIZEN", "Harbor").await;
    let (central, _) = h.sign_up("Bob", "bob@example.com", "POLICE", "Central").await;

    let case = assert_ok!(
        h.state
            .cases
            .file_as_citizen(&ann, filing("ann@example.com", "Theft", "Harbor"))
            .await
    );

    let err = assert_err!(h.state.cases.update_status(&central, &case.id, "RESOLVED").await);
    assert!(matches!(err, PrecinctError::Forbidden(_)));

    // Even an unparseable status is refused on jurisdiction first
    let err = assert_err!(h.state.cases.update_status(&central, &case.id, "BOGUS").await);
    assert!(matches!(err, PrecinctError::Forbidden(_)));

    let err = assert_err!(h.state.cases.get_by_id_for_officer(&central, &case.id).await);
    assert!(matches!(err, PrecinctError::Forbidden(_)));
    assert!(assert_ok!(h.state.cases.list_by_jurisdiction(&central).await).is_empty());

    let (harbor, _) = h.sign_up("Cat", "cat@example.com", "POLICE", "Harbor").await;
    let unchanged = assert_ok!(h.state.cases.get_by_id_for_officer(&harbor, &case.id).await);
    assert_eq!(unchanged.status, CaseStatus::Filed);
}

#[tokio::test]
async fn filing_for_unknown_citizen_creates_nothing() {
    let h = harness();
    let (officer, _) = h.sign_up("Bob", "bob@example.com", "POLICE", "Central").await;

    let err = assert_err!(
        h.state
            .cases
            .file_as_officer(&officer, filing("ghost@example.com", "Fraud", "Central"))
            .await
    );
    assert!(matches!(err, PrecinctError::NotFound(_)));

    // An officer's email does not count as a citizen
    let err = assert_err!(
        h.state
            .cases
            .file_as_officer(&officer, filing("bob@example.com", "Fraud", "Central"))
            .await
    );
    assert!(matches!(err, PrecinctError::NotFound(_)));

    assert!(assert_ok!(h.state.cases.list_by_jurisdiction(&officer).await).is_empty());
}

#[tokio::test]
async fn invalid_filings_are_validation_errors() {
    let h = harness();
    let (ann, _) = h.sign_up("Ann", "ann@example.com", "CITIZEN", "Central").await;

    let err = assert_err!(
        h.state
            .cases
            .file_as_citizen(&ann, filing("ann@example.com", "Jaywalking", "Central"))
            .await
    );
    assert!(matches!(err, PrecinctError::Validation(_)));

    let mut missing = filing("ann@example.com", "Theft", "Central");
    missing.description = "  ".into();
    let err = assert_err!(h.state.cases.file_as_citizen(&ann, missing).await);
    assert!(matches!(err, PrecinctError::Validation(_)));

    // Citizens may not act on the police side
    let err = assert_err!(h.state.cases.list_by_jurisdiction(&ann).await);
    assert!(matches!(err, PrecinctError::Forbidden(_)));
}

#[tokio::test]
async fn tokens_expire_after_their_lifetime() {
    let h = harness();
    let (ann, token) = h.sign_up("Ann", "ann@example.com", "CITIZEN", "Central").await;
    assert_eq!(ann.role, Role::Citizen);

    h.clock.advance(Duration::hours(23));
    assert_ok!(h.state.guard.authenticate_request(Some(&token)).await);

    h.clock.advance(Duration::hours(1) + Duration::seconds(1));
    let err = assert_err!(h.state.guard.authenticate_request(Some(&token)).await);
    assert!(matches!(err, PrecinctError::ExpiredToken));

    let err = assert_err!(h.state.guard.authenticate_request(Some("not-a-token")).await);
    assert!(matches!(err, PrecinctError::InvalidToken(_)));

    let err = assert_err!(h.state.guard.authenticate_request(None).await);
    assert!(matches!(err, PrecinctError::Unauthenticated(_)));
}

#[tokio::test]
async fn login_checks_credentials() {
    let h = harness();
    h.sign_up("Ann", "ann@example.com", "CITIZEN", "Central").await;

    let session = assert_ok!(h.state.identity.authenticate("ann@example.com", "hunter22").await);
    assert_eq!(session.account.role, Role::Citizen);

    let err = assert_err!(h.state.identity.authenticate("ann@example.com", "hunter23").await);
    assert!(matches!(err, PrecinctError::InvalidCredentials));

    let err = assert_err!(h.state.identity.authenticate("nobody@example.com", "hunter22").await);
    assert!(matches!(err, PrecinctError::InvalidCredentials));
}

#[tokio::test]
async fn jurisdiction_is_kept_verbatim() {
    let h = harness();
    let (ann, _) = h.sign_up("Ann", "ann@example.com", "CITIZEN", "Harbor ").await;
    let (officer, _) = h.sign_up("Bob", "bob@example.com", "POLICE", "Harbor ").await;
    assert_eq!(officer.jurisdiction, "Harbor ");

    let case = assert_ok!(
        h.state
            .cases
            .file_as_citizen(&ann, filing("ann@example.com", "Theft", "Harbor "))
            .await
    );
    assert_eq!(case.jurisdiction, "Harbor ");

    let listed = assert_ok!(h.state.cases.list_by_jurisdiction(&officer).await);
    assert_eq!(listed.len(), 1);
    let updated = assert_ok!(h.state.cases.update_status(&officer, &case.id, "UNDER_INVESTIGATION").await);
    assert_eq!(updated.status, CaseStatus::UnderInvestigation);

    // A differently padded jurisdiction is a different jurisdiction
    let (trimmed, _) = h.sign_up("Cat", "cat@example.com", "POLICE", "Harbor").await;
    let err = assert_err!(h.state.cases.update_status(&trimmed, &case.id, "RESOLVED").await);
    assert!(matches!(err, PrecinctError::Forbidden(_)));
}

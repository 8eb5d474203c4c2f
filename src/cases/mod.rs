//! Case registry
//!
//! Owns case records: filing by citizens and officers, status changes by
//! officers, and the role-scoped queries each side is allowed to make.
//!
//! Every operation checks the actor's role itself before touching storage.
//! Officers are scoped by jurisdiction, citizens by being the reporting
//! citizen of the case.

use std::sync::Arc;
use tracing::info;

use crate::auth::{require_jurisdiction_match, require_role, Actor, Role};
use crate::clock::Clock;
use crate::db::schemas::{CaseDoc, CaseStatus, CrimeCategory};
use crate::db::{CaseStore, StatusUpdate};
use crate::identity::IdentityStore;
use crate::types::{PrecinctError, Result};

/// Details of a new case; empty strings count as missing
#[derive(Debug, Clone, Default)]
pub struct CaseFiling {
    pub citizen_email: String,
    pub crime_category: String,
    pub description: String,
    pub place_of_crime: String,
    pub jurisdiction: String,
}

fn validate_filing(filing: &CaseFiling) -> Result<CrimeCategory> {
    let missing: Vec<&str> = [
        ("citizenEmail", &filing.citizen_email),
        ("typeOfCrime", &filing.crime_category),
        ("description", &filing.description),
        ("placeOfCrime", &filing.place_of_crime),
        ("location", &filing.jurisdiction),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(name, _)| name)
    .collect();

    if !missing.is_empty() {
        return Err(PrecinctError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    filing.crime_category.parse()
}

/// Registry of incident cases
pub struct CaseRegistry {
    cases: Arc<dyn CaseStore>,
    identity: Arc<IdentityStore>,
    clock: Arc<dyn Clock>,
}

impl CaseRegistry {
    pub fn new(cases: Arc<dyn CaseStore>, identity: Arc<IdentityStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            cases,
            identity,
            clock,
        }
    }

    /// File a case as a citizen. The case starts out FILED and unassigned.
    ///
    /// `citizen_email` may name any registered citizen, not only the actor.
    pub async fn file_as_citizen(&self, actor: &Actor, filing: CaseFiling) -> Result<CaseDoc> {
        require_role(actor, &[Role::Citizen])?;
        self.file(actor, filing, CaseStatus::Filed, None).await
    }

    /// File a case as an officer on behalf of a citizen. The case starts out
    /// UNDER_INVESTIGATION and assigned to the filing officer.
    pub async fn file_as_officer(&self, actor: &Actor, filing: CaseFiling) -> Result<CaseDoc> {
        require_role(actor, &[Role::Police])?;
        self.file(actor, filing, CaseStatus::UnderInvestigation, Some(actor.id.clone()))
            .await
    }

    async fn file(
        &self,
        actor: &Actor,
        filing: CaseFiling,
        status: CaseStatus,
        assigned_officer: Option<String>,
    ) -> Result<CaseDoc> {
        let crime_category = validate_filing(&filing)?;

        let citizen = self
            .identity
            .find_by_email(&filing.citizen_email)
            .await?
            .filter(|account| account.role == Role::Citizen)
            .ok_or_else(|| {
                PrecinctError::NotFound("Citizen not registered. Ensure they are registered.".into())
            })?;

        let now = self.clock.now();
        let case = CaseDoc {
            id: uuid::Uuid::new_v4().to_string(),
            reporting_citizen: citizen.id,
            reporting_citizen_email: citizen.email,
            crime_category,
            description: filing.description,
            place_of_crime: filing.place_of_crime,
            jurisdiction: filing.jurisdiction,
            status,
            assigned_officer,
            created_at: now,
            updated_at: now,
        };

        self.cases.insert_case(case.clone()).await?;
        info!(
            case_id = %case.id,
            filed_by = %actor.id,
            role = %actor.role,
            status = %case.status,
            "Case filed"
        );

        Ok(case)
    }

    /// Set a case's status. The acting officer becomes the assigned officer.
    ///
    /// Any status may follow any other.
    pub async fn update_status(&self, actor: &Actor, case_id: &str, new_status: &str) -> Result<CaseDoc> {
        require_role(actor, &[Role::Police])?;

        let case = self.find(case_id).await?;
        require_jurisdiction_match(actor, &case.jurisdiction)?;

        let status: CaseStatus = new_status.parse()?;
        let updated = self
            .cases
            .update_case_status(
                case_id,
                StatusUpdate {
                    status,
                    assigned_officer: actor.id.clone(),
                    updated_at: self.clock.now(),
                },
            )
            .await?
            .ok_or_else(|| case_not_found(case_id))?;

        info!(
            case_id = %updated.id,
            officer_id = %actor.id,
            from = %case.status,
            to = %updated.status,
            "Case status updated"
        );

        Ok(updated)
    }

    /// All cases in the officer's jurisdiction
    pub async fn list_by_jurisdiction(&self, actor: &Actor) -> Result<Vec<CaseDoc>> {
        require_role(actor, &[Role::Police])?;
        self.cases.find_cases_by_jurisdiction(&actor.jurisdiction).await
    }

    /// One case, if it lies in the officer's jurisdiction
    pub async fn get_by_id_for_officer(&self, actor: &Actor, case_id: &str) -> Result<CaseDoc> {
        require_role(actor, &[Role::Police])?;

        let case = self.find(case_id).await?;
        require_jurisdiction_match(actor, &case.jurisdiction)?;
        Ok(case)
    }

    /// All cases the citizen is the reporting citizen of
    pub async fn list_by_citizen(&self, actor: &Actor) -> Result<Vec<CaseDoc>> {
        require_role(actor, &[Role::Citizen])?;
        self.cases.find_cases_by_citizen(&actor.id).await
    }

    /// One case, if the citizen is its reporting citizen
    pub async fn get_by_id_for_citizen(&self, actor: &Actor, case_id: &str) -> Result<CaseDoc> {
        require_role(actor, &[Role::Citizen])?;

        let case = self.find(case_id).await?;
        if case.reporting_citizen != actor.id {
            return Err(PrecinctError::Forbidden(
                "Case was not reported by you".into(),
            ));
        }
        Ok(case)
    }

    async fn find(&self, case_id: &str) -> Result<CaseDoc> {
        self.cases
            .find_case_by_id(case_id)
            .await?
            .ok_or_else(|| case_not_found(case_id))
    }
}

fn case_not_found(case_id: &str) -> PrecinctError {
    PrecinctError::NotFound(format!("Case '{}' not found", case_id))
}

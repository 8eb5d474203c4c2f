//! Case (incident report) document schema
//!
//! Field names and enumerated values are part of the wire contract and are
//! kept exactly as existing clients send and read them.

use bson::{doc, Document};
use chrono::{DateTime, Utc};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::db::mongo::IntoIndexes;
use crate::types::PrecinctError;

/// Collection name for cases
pub const CASE_COLLECTION: &str = "firs";

/// Category of the reported crime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrimeCategory {
    #[serde(rename = "Theft")]
    Theft,
    #[serde(rename = "Assault")]
    Assault,
    #[serde(rename = "Fraud")]
    Fraud,
    #[serde(rename = "Murder")]
    Murder,
    #[serde(rename = "Other")]
    Other,
    #[serde(rename = "Property Crime")]
    PropertyCrime,
    #[serde(rename = "Violent Crime")]
    ViolentCrime,
    #[serde(rename = "Sex Crime")]
    SexCrime,
    #[serde(rename = "Fraud/Financial Crime")]
    FinancialCrime,
    #[serde(rename = "Legal/Administrative")]
    LegalAdministrative,
    #[serde(rename = "Cyber Crime")]
    CyberCrime,
    #[serde(rename = "Child Crime")]
    ChildCrime,
    #[serde(rename = "Traffic Offense")]
    TrafficOffense,
}

impl CrimeCategory {
    pub const ALL: [CrimeCategory; 13] = [
        CrimeCategory::Theft,
        CrimeCategory::Assault,
        CrimeCategory::Fraud,
        CrimeCategory::Murder,
        CrimeCategory::Other,
        CrimeCategory::PropertyCrime,
        CrimeCategory::ViolentCrime,
        CrimeCategory::SexCrime,
        CrimeCategory::FinancialCrime,
        CrimeCategory::LegalAdministrative,
        CrimeCategory::CyberCrime,
        CrimeCategory::ChildCrime,
        CrimeCategory::TrafficOffense,
    ];

    /// Wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            CrimeCategory::Theft => "Theft",
            CrimeCategory::Assault => "Assault",
            CrimeCategory::Fraud => "Fraud",
            CrimeCategory::Murder => "Murder",
            CrimeCategory::Other => "Other",
            CrimeCategory::PropertyCrime => "Property Crime",
            CrimeCategory::ViolentCrime => "Violent Crime",
            CrimeCategory::SexCrime => "Sex Crime",
            CrimeCategory::FinancialCrime => "Fraud/Financial Crime",
            CrimeCategory::LegalAdministrative => "Legal/Administrative",
            CrimeCategory::CyberCrime => "Cyber Crime",
            CrimeCategory::ChildCrime => "Child Crime",
            CrimeCategory::TrafficOffense => "Traffic Offense",
        }
    }
}

impl fmt::Display for CrimeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CrimeCategory {
    type Err = PrecinctError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CrimeCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| PrecinctError::Validation(format!("Unknown type of crime '{}'", s)))
    }
}

/// Lifecycle status of a case
///
/// Any officer in the case's jurisdiction may move it to any status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseStatus {
    #[serde(alias = "Filed")]
    Filed,
    #[serde(alias = "Under Investigation")]
    UnderInvestigation,
    #[serde(alias = "Resolved")]
    Resolved,
    #[serde(alias = "Rejected")]
    Rejected,
}

impl CaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Filed => "FILED",
            CaseStatus::UnderInvestigation => "UNDER_INVESTIGATION",
            CaseStatus::Resolved => "RESOLVED",
            CaseStatus::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaseStatus {
    type Err = PrecinctError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FILED" | "Filed" => Ok(CaseStatus::Filed),
            "UNDER_INVESTIGATION" | "Under Investigation" => Ok(CaseStatus::UnderInvestigation),
            "RESOLVED" | "Resolved" => Ok(CaseStatus::Resolved),
            "REJECTED" | "Rejected" => Ok(CaseStatus::Rejected),
            other => Err(PrecinctError::Validation(format!(
                "Status must be one of FILED, UNDER_INVESTIGATION, RESOLVED, REJECTED, got '{}'",
                other
            ))),
        }
    }
}

/// Case document stored in the record store
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CaseDoc {
    #[serde(rename = "_id")]
    pub id: String,

    /// ID of the citizen account the case is about
    #[serde(rename = "citizen")]
    pub reporting_citizen: String,

    #[serde(rename = "citizenEmail")]
    pub reporting_citizen_email: String,

    #[serde(rename = "typeOfCrime")]
    pub crime_category: CrimeCategory,

    pub description: String,

    #[serde(rename = "placeOfCrime")]
    pub place_of_crime: String,

    /// Scopes which officers may see and act on the case; set once at filing
    #[serde(rename = "location")]
    pub jurisdiction: String,

    pub status: CaseStatus,

    /// Officer who filed or last updated the case
    #[serde(rename = "assignedPolice")]
    pub assigned_officer: Option<String>,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl IntoIndexes for CaseDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // Officer listings
            (
                doc! { "location": 1 },
                Some(
                    IndexOptions::builder()
                        .name("location_index".to_string())
                        .build(),
                ),
            ),
            // Citizen listings
            (
                doc! { "citizen": 1 },
                Some(
                    IndexOptions::builder()
                        .name("citizen_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

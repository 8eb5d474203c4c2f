//! Account document schema
//!
//! Stores citizen and officer accounts. Field names follow the wire format
//! existing clients already speak (`fullname`, `location`, `_id`).

use bson::{doc, Document};
use chrono::{DateTime, Utc};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::auth::Role;
use crate::db::mongo::IntoIndexes;

/// Collection name for accounts
pub const ACCOUNT_COLLECTION: &str = "users";

/// First and last name of an account holder
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct FullName {
    pub firstname: String,
    pub lastname: String,
}

/// Account document stored in the record store
///
/// This is the only type that carries the credential hash. It never leaves
/// the identity layer; callers get an [`Account`] instead.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AccountDoc {
    #[serde(rename = "_id")]
    pub id: String,

    pub fullname: FullName,

    /// Unique across all accounts
    pub email: String,

    /// Argon2 PHC hash
    #[serde(rename = "password")]
    pub password_hash: String,

    pub role: Role,

    /// Free-text location the account belongs to
    #[serde(rename = "location")]
    pub jurisdiction: String,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl AccountDoc {
    /// Create a new account document with a fresh ID
    pub fn new(
        fullname: FullName,
        email: String,
        password_hash: String,
        role: Role,
        jurisdiction: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            fullname,
            email,
            password_hash,
            role,
            jurisdiction,
            created_at: now,
            updated_at: now,
        }
    }
}

impl IntoIndexes for AccountDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "email": 1 },
            Some(
                IndexOptions::builder()
                    .unique(true)
                    .name("email_unique".to_string())
                    .build(),
            ),
        )]
    }
}

/// Public view of an account (no credential material)
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Account {
    #[serde(rename = "_id")]
    pub id: String,
    pub fullname: FullName,
    pub email: String,
    pub role: Role,
    #[serde(rename = "location")]
    pub jurisdiction: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl From<&AccountDoc> for Account {
    fn from(doc: &AccountDoc) -> Self {
        Self {
            id: doc.id.clone(),
            fullname: doc.fullname.clone(),
            email: doc.email.clone(),
            role: doc.role,
            jurisdiction: doc.jurisdiction.clone(),
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

//! Record store traits
//!
//! Identity and case logic talk to storage only through these traits, so the
//! backend can be MongoDB in production and memory in tests or dev mode.
//! Every write touches exactly one record.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::db::schemas::{AccountDoc, CaseDoc, CaseStatus};
use crate::types::{PrecinctError, Result};

/// Storage for account records
#[async_trait::async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert a new account; fails with `Conflict` if the email is taken
    async fn insert_account(&self, account: AccountDoc) -> Result<()>;

    async fn find_account_by_email(&self, email: &str) -> Result<Option<AccountDoc>>;

    async fn find_account_by_id(&self, id: &str) -> Result<Option<AccountDoc>>;
}

/// Fields written by a status change
#[derive(Debug, Clone)]
pub struct StatusUpdate {
    pub status: CaseStatus,
    pub assigned_officer: String,
    pub updated_at: DateTime<Utc>,
}

/// Storage for case records
#[async_trait::async_trait]
pub trait CaseStore: Send + Sync {
    async fn insert_case(&self, case: CaseDoc) -> Result<()>;

    async fn find_case_by_id(&self, id: &str) -> Result<Option<CaseDoc>>;

    async fn find_cases_by_jurisdiction(&self, jurisdiction: &str) -> Result<Vec<CaseDoc>>;

    async fn find_cases_by_citizen(&self, citizen_id: &str) -> Result<Vec<CaseDoc>>;

    /// Apply a status change to one case and return the updated record.
    ///
    /// Returns `None` if the case does not exist. Concurrent updates are
    /// last-write-wins.
    async fn update_case_status(&self, id: &str, update: StatusUpdate) -> Result<Option<CaseDoc>>;
}

// ============================================================================
// In-memory backends
// ============================================================================

/// In-memory account store
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    accounts: RwLock<HashMap<String, AccountDoc>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn insert_account(&self, account: AccountDoc) -> Result<()> {
        let mut accounts = self.accounts.write().await;

        if accounts.values().any(|a| a.email == account.email) {
            return Err(PrecinctError::Conflict(format!(
                "Email '{}' is already registered",
                account.email
            )));
        }
        if accounts.contains_key(&account.id) {
            return Err(PrecinctError::Conflict(format!(
                "Account '{}' already exists",
                account.id
            )));
        }

        accounts.insert(account.id.clone(), account);
        Ok(())
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<AccountDoc>> {
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|a| a.email == email)
            .cloned())
    }

    async fn find_account_by_id(&self, id: &str) -> Result<Option<AccountDoc>> {
        Ok(self.accounts.read().await.get(id).cloned())
    }
}

/// In-memory case store
#[derive(Debug, Default)]
pub struct InMemoryCaseStore {
    cases: RwLock<HashMap<String, CaseDoc>>,
}

impl InMemoryCaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.cases.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cases.read().await.is_empty()
    }

    async fn find_where(&self, predicate: impl Fn(&CaseDoc) -> bool) -> Vec<CaseDoc> {
        let mut found: Vec<CaseDoc> = self
            .cases
            .read()
            .await
            .values()
            .filter(|c| predicate(c))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        found
    }
}

#[async_trait::async_trait]
impl CaseStore for InMemoryCaseStore {
    async fn insert_case(&self, case: CaseDoc) -> Result<()> {
        let mut cases = self.cases.write().await;
        if cases.contains_key(&case.id) {
            return Err(PrecinctError::Conflict(format!(
                "Case '{}' already exists",
                case.id
            )));
        }
        cases.insert(case.id.clone(), case);
        Ok(())
    }

    async fn find_case_by_id(&self, id: &str) -> Result<Option<CaseDoc>> {
        Ok(self.cases.read().await.get(id).cloned())
    }

    async fn find_cases_by_jurisdiction(&self, jurisdiction: &str) -> Result<Vec<CaseDoc>> {
        Ok(self.find_where(|c| c.jurisdiction == jurisdiction).await)
    }

    async fn find_cases_by_citizen(&self, citizen_id: &str) -> Result<Vec<CaseDoc>> {
        Ok(self.find_where(|c| c.reporting_citizen == citizen_id).await)
    }

    async fn update_case_status(&self, id: &str, update: StatusUpdate) -> Result<Option<CaseDoc>> {
        let mut cases = self.cases.write().await;
        Ok(cases.get_mut(id).map(|case| {
            case.status = update.status;
            case.assigned_officer = Some(update.assigned_officer);
            case.updated_at = update.updated_at;
            case.clone()
        }))
    }
}

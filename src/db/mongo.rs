//! MongoDB client, typed collections and the Mongo-backed record stores

use bson::{doc, Document};
use futures_util::TryStreamExt;
use mongodb::{
    error::{ErrorKind, WriteFailure},
    options::{IndexOptions, ReturnDocument},
    Client, Collection, IndexModel,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::info;

use crate::db::schemas::{AccountDoc, CaseDoc, ACCOUNT_COLLECTION, CASE_COLLECTION};
use crate::db::store::{AccountStore, CaseStore, StatusUpdate};
use crate::types::{PrecinctError, Result};

/// MongoDB server error code for unique index violations
const DUPLICATE_KEY_CODE: i32 = 11000;

/// Trait for schemas that provide index definitions
pub trait IntoIndexes {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)>;
}

/// MongoDB client wrapper
#[derive(Clone)]
pub struct MongoClient {
    client: Client,
    db_name: String,
}

impl MongoClient {
    /// Create a new MongoDB client
    pub async fn new(uri: &str, db_name: &str) -> Result<Self> {
        info!("Connecting to MongoDB at {}", uri);

        // Use serverSelectionTimeoutMS to avoid hanging on unreachable MongoDB
        let timeout_uri = if uri.contains('?') {
            format!("{}&serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        } else {
            format!("{}?serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        };

        let client = Client::with_uri_str(&timeout_uri)
            .await
            .map_err(|e| PrecinctError::Unavailable(format!("Failed to connect to MongoDB: {}", e)))?;

        client
            .database(db_name)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| PrecinctError::Unavailable(format!("MongoDB ping failed: {}", e)))?;

        info!("Connected to MongoDB database '{}'", db_name);

        Ok(Self {
            client,
            db_name: db_name.to_string(),
        })
    }

    /// Get a typed collection
    pub async fn collection<T>(&self, name: &str) -> Result<MongoCollection<T>>
    where
        T: Serialize + DeserializeOwned + Unpin + Send + Sync + IntoIndexes,
    {
        MongoCollection::new(&self.client, &self.db_name, name).await
    }

    pub fn db_name(&self) -> &str {
        &self.db_name
    }
}

/// Typed MongoDB collection with automatic indexing
#[derive(Debug, Clone)]
pub struct MongoCollection<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync,
{
    inner: Collection<T>,
}

impl<T> MongoCollection<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync + IntoIndexes,
{
    /// Create a new collection and apply indexes
    pub async fn new(client: &Client, db_name: &str, collection_name: &str) -> Result<Self> {
        let collection = client.database(db_name).collection::<T>(collection_name);
        let mongo_collection = MongoCollection { inner: collection };

        mongo_collection.apply_indexes().await?;

        Ok(mongo_collection)
    }

    /// Apply schema-defined indexes
    async fn apply_indexes(&self) -> Result<()> {
        let schema_indices = T::into_indices();

        if schema_indices.is_empty() {
            return Ok(());
        }

        let indices: Vec<IndexModel> = schema_indices
            .into_iter()
            .map(|(keys, opts)| IndexModel::builder().keys(keys).options(opts).build())
            .collect();

        self.inner
            .create_indexes(indices)
            .await
            .map_err(|e| PrecinctError::Unavailable(format!("Failed to create indexes: {}", e)))?;

        Ok(())
    }

    /// Insert a document; unique index violations surface as `Conflict`
    pub async fn insert_one(&self, item: T) -> Result<()> {
        self.inner.insert_one(item).await.map_err(|e| {
            if is_duplicate_key(&e) {
                PrecinctError::Conflict("Duplicate key".into())
            } else {
                PrecinctError::Unavailable(format!("Insert failed: {}", e))
            }
        })?;
        Ok(())
    }

    /// Find one document by filter
    pub async fn find_one(&self, filter: Document) -> Result<Option<T>> {
        self.inner
            .find_one(filter)
            .await
            .map_err(|e| PrecinctError::Unavailable(format!("Find failed: {}", e)))
    }

    /// Find many documents by filter
    pub async fn find_many(&self, filter: Document) -> Result<Vec<T>> {
        let cursor = self
            .inner
            .find(filter)
            .sort(doc! { "createdAt": 1 })
            .await
            .map_err(|e| PrecinctError::Unavailable(format!("Find failed: {}", e)))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| PrecinctError::Unavailable(format!("Error reading documents: {}", e)))
    }

    /// Update one document and return it as it is after the update
    pub async fn find_one_and_update(&self, filter: Document, update: Document) -> Result<Option<T>> {
        self.inner
            .find_one_and_update(filter, update)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| PrecinctError::Unavailable(format!("Update failed: {}", e)))
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DUPLICATE_KEY_CODE
    )
}

fn to_bson<V: Serialize>(value: &V) -> Result<bson::Bson> {
    bson::to_bson(value).map_err(|e| PrecinctError::Internal(format!("BSON encoding failed: {}", e)))
}

// ============================================================================
// Mongo-backed stores
// ============================================================================

/// MongoDB-backed account store
pub struct MongoAccountStore {
    accounts: MongoCollection<AccountDoc>,
}

impl MongoAccountStore {
    pub async fn new(mongo: &MongoClient) -> Result<Self> {
        Ok(Self {
            accounts: mongo.collection(ACCOUNT_COLLECTION).await?,
        })
    }
}

#[async_trait::async_trait]
impl AccountStore for MongoAccountStore {
    async fn insert_account(&self, account: AccountDoc) -> Result<()> {
        let email = account.email.clone();
        self.accounts.insert_one(account).await.map_err(|e| match e {
            PrecinctError::Conflict(_) => {
                PrecinctError::Conflict(format!("Email '{}' is already registered", email))
            }
            other => other,
        })
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<AccountDoc>> {
        self.accounts.find_one(doc! { "email": email }).await
    }

    async fn find_account_by_id(&self, id: &str) -> Result<Option<AccountDoc>> {
        self.accounts.find_one(doc! { "_id": id }).await
    }
}

/// MongoDB-backed case store
pub struct MongoCaseStore {
    cases: MongoCollection<CaseDoc>,
}

impl MongoCaseStore {
    pub async fn new(mongo: &MongoClient) -> Result<Self> {
        Ok(Self {
            cases: mongo.collection(CASE_COLLECTION).await?,
        })
    }
}

#[async_trait::async_trait]
impl CaseStore for MongoCaseStore {
    async fn insert_case(&self, case: CaseDoc) -> Result<()> {
        self.cases.insert_one(case).await
    }

    async fn find_case_by_id(&self, id: &str) -> Result<Option<CaseDoc>> {
        self.cases.find_one(doc! { "_id": id }).await
    }

    async fn find_cases_by_jurisdiction(&self, jurisdiction: &str) -> Result<Vec<CaseDoc>> {
        self.cases.find_many(doc! { "location": jurisdiction }).await
    }

    async fn find_cases_by_citizen(&self, citizen_id: &str) -> Result<Vec<CaseDoc>> {
        self.cases.find_many(doc! { "citizen": citizen_id }).await
    }

    async fn update_case_status(&self, id: &str, update: StatusUpdate) -> Result<Option<CaseDoc>> {
        let set = doc! {
            "$set": {
                "status": to_bson(&update.status)?,
                "assignedPolice": update.assigned_officer,
                "updatedAt": to_bson(&update.updated_at)?,
            }
        };
        self.cases.find_one_and_update(doc! { "_id": id }, set).await
    }
}

//! Record store: schemas, storage traits, in-memory and MongoDB backends

pub mod mongo;
pub mod schemas;
pub mod store;

pub use mongo::{MongoAccountStore, MongoCaseStore, MongoClient, MongoCollection};
pub use store::{AccountStore, CaseStore, InMemoryAccountStore, InMemoryCaseStore, StatusUpdate};

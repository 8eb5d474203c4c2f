//! Database schemas for Precinct
//!
//! Defines the account and case document structures.

mod account;
mod case;

pub use account::{Account, AccountDoc, FullName, ACCOUNT_COLLECTION};
pub use case::{CaseDoc, CaseStatus, CrimeCategory, CASE_COLLECTION};

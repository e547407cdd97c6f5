//! Core types and data structures for the import pipeline

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of an account in the target ledger
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque identifier of a ledger entry, stable across runs
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryId(pub String);

impl EntryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh identifier for an entry that doesn't exist in the ledger yet
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Account in the target ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Identifier assigned by the ledger
    pub id: AccountId,
    /// Human-readable account name, matched exactly during resolution
    pub name: String,
    /// Whether the account is tracked outside of the budget
    pub off_budget: bool,
    /// Whether the account has been closed
    pub closed: bool,
}

impl Account {
    /// Create an on-budget, open account
    pub fn new(id: AccountId, name: String) -> Self {
        Self {
            id,
            name,
            off_budget: false,
            closed: false,
        }
    }
}

/// A transaction parsed from an input file that has not been reconciled yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionCandidate {
    /// Name of the account the transaction belongs to
    pub account_name: String,
    pub date: NaiveDate,
    /// Payee as written in the input, may be empty
    pub payee: String,
    /// Negative amounts are debits, positive amounts are credits
    pub amount: BigDecimal,
    pub notes: Option<String>,
    /// `Some("")` means "uncategorized", `None` means the input had no category at all
    pub category: Option<String>,
    pub cleared: bool,
}

/// Transaction as stored in the target ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: EntryId,
    pub account_id: AccountId,
    pub date: NaiveDate,
    pub payee: String,
    pub amount: BigDecimal,
    pub notes: Option<String>,
    pub category: Option<String>,
    pub cleared: bool,
}

/// Errors that can occur while talking to the ledger
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Cannot reach ledger: {0}")]
    Connection(String),
    #[error("Ledger rejected credentials: {0}")]
    Unauthorized(String),
    #[error("Ledger rejected write: {0}")]
    Rejected(String),
    #[error("Account not found: {0}")]
    AccountNotFound(String),
    #[error("Entry not found: {0}")]
    EntryNotFound(String),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Errors that abort reconciliation of a single candidate
#[derive(Debug, thiserror::Error)]
pub enum ReconciliationError {
    #[error("Invalid candidate: {0}")]
    InvalidCandidate(String),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Result type for reconciliation operations
pub type ReconciliationResult<T> = Result<T, ReconciliationError>;

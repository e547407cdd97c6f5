//! Traits for ledger backend abstraction

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::types::*;

/// Backend abstraction for the external ledger
///
/// This trait allows the import pipeline to work against any ledger service
/// (the Actual Budget HTTP bridge, an in-memory ledger for tests, etc.).
/// Implementations write through immediately; batching and commit semantics
/// live in [`crate::ledger::LedgerSession`].
#[async_trait]
pub trait LedgerStorage: Send + Sync {
    /// List all accounts in the ledger
    async fn list_accounts(&self) -> LedgerResult<Vec<Account>>;

    /// Create a new account and return it with its ledger-assigned id
    async fn create_account(&mut self, name: &str) -> LedgerResult<Account>;

    /// List entries of an account within an optional date range (inclusive)
    async fn get_account_entries(
        &self,
        account_id: &AccountId,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> LedgerResult<Vec<LedgerEntry>>;

    /// Save a new entry
    async fn save_entry(&mut self, entry: &LedgerEntry) -> LedgerResult<()>;

    /// Update an existing entry
    async fn update_entry(&mut self, entry: &LedgerEntry) -> LedgerResult<()>;
}

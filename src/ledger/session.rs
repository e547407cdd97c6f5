//! Run-scoped ledger handle that stages entry writes and commits them once

use std::collections::HashMap;

use crate::traits::*;
use crate::types::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteKind {
    Create,
    Update,
}

/// Counts of writes flushed by [`LedgerSession::commit`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitSummary {
    pub created: usize,
    pub updated: usize,
    /// Writes the ledger refused; these entries are logged and skipped
    pub rejected: usize,
}

/// Scoped connection to the ledger for the duration of one import run.
///
/// Entries of an account are loaded once on first access and cached. New and
/// modified entries are staged in the cache and only reach the backend on
/// [`LedgerSession::commit`]. A session dropped without committing discards
/// its staged writes. Account creation is not staged.
pub struct LedgerSession<S: LedgerStorage> {
    storage: S,
    entries: HashMap<AccountId, Vec<LedgerEntry>>,
    pending: Vec<(AccountId, EntryId)>,
    pending_kinds: HashMap<EntryId, WriteKind>,
}

impl<S: LedgerStorage> LedgerSession<S> {
    /// Open a session over the given backend
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            entries: HashMap::new(),
            pending: Vec::new(),
            pending_kinds: HashMap::new(),
        }
    }

    /// List all accounts in the ledger
    pub async fn list_accounts(&self) -> LedgerResult<Vec<Account>> {
        self.storage.list_accounts().await
    }

    /// Create an account; this is written to the ledger immediately
    pub async fn create_account(&mut self, name: &str) -> LedgerResult<Account> {
        let account = self.storage.create_account(name).await?;
        self.entries.insert(account.id.clone(), Vec::new());
        Ok(account)
    }

    /// Account that only exists inside this session, for dry runs.
    ///
    /// Nothing is written to the ledger; entries staged for it must never be
    /// committed.
    pub fn local_account(&mut self, name: &str) -> Account {
        let account = Account::new(
            AccountId::new(uuid::Uuid::new_v4().to_string()),
            name.to_string(),
        );
        self.entries.insert(account.id.clone(), Vec::new());
        account
    }

    /// All entries of an account, including staged ones
    pub async fn entries(&mut self, account_id: &AccountId) -> LedgerResult<&[LedgerEntry]> {
        if !self.entries.contains_key(account_id) {
            log::debug!("Loading entries of account {account_id}...");
            let loaded = self
                .storage
                .get_account_entries(account_id, None, None)
                .await?;
            log::debug!(
                "Loading entries of account {account_id}...done ({} entries)",
                loaded.len()
            );
            self.entries.insert(account_id.clone(), loaded);
        }
        Ok(self
            .entries
            .get(account_id)
            .map(Vec::as_slice)
            .unwrap_or_default())
    }

    /// Stage a new entry for creation
    pub async fn stage_new_entry(&mut self, entry: LedgerEntry) -> LedgerResult<()> {
        self.entries(&entry.account_id).await?;
        let cached = self
            .entries
            .get_mut(&entry.account_id)
            .ok_or_else(|| LedgerError::AccountNotFound(entry.account_id.to_string()))?;
        if cached.iter().any(|existing| existing.id == entry.id) {
            return Err(LedgerError::Rejected(format!(
                "Entry with ID '{}' already exists",
                entry.id
            )));
        }
        self.pending.push((entry.account_id.clone(), entry.id.clone()));
        self.pending_kinds.insert(entry.id.clone(), WriteKind::Create);
        cached.push(entry);
        Ok(())
    }

    /// Stage an update of an entry previously returned by [`Self::entries`]
    pub async fn stage_update(&mut self, entry: LedgerEntry) -> LedgerResult<()> {
        self.entries(&entry.account_id).await?;
        let existing = self
            .entries
            .get_mut(&entry.account_id)
            .and_then(|entries| entries.iter_mut().find(|e| e.id == entry.id))
            .ok_or_else(|| LedgerError::EntryNotFound(entry.id.to_string()))?;
        // A staged creation already carries the latest state
        if !self.pending_kinds.contains_key(&entry.id) {
            self.pending.push((entry.account_id.clone(), entry.id.clone()));
            self.pending_kinds.insert(entry.id.clone(), WriteKind::Update);
        }
        *existing = entry;
        Ok(())
    }

    /// Number of staged writes not yet committed
    pub fn pending_writes(&self) -> usize {
        self.pending.len()
    }

    /// Flush all staged writes to the ledger, in the order they were staged
    pub async fn commit(mut self) -> LedgerResult<CommitSummary> {
        log::info!("Committing {} ledger writes...", self.pending.len());
        let mut summary = CommitSummary::default();
        let pending = std::mem::take(&mut self.pending);
        for (index, (account_id, entry_id)) in pending.iter().enumerate() {
            let entry = self
                .entries
                .get(account_id)
                .and_then(|entries| entries.iter().find(|e| &e.id == entry_id))
                .ok_or_else(|| LedgerError::EntryNotFound(entry_id.to_string()))?;
            let kind = self
                .pending_kinds
                .remove(entry_id)
                .unwrap_or(WriteKind::Update);
            let result = match kind {
                WriteKind::Create => self.storage.save_entry(entry).await,
                WriteKind::Update => self.storage.update_entry(entry).await,
            };
            match result {
                Ok(()) => match kind {
                    WriteKind::Create => summary.created += 1,
                    WriteKind::Update => summary.updated += 1,
                },
                Err(err @ (LedgerError::Rejected(_) | LedgerError::Validation(_))) => {
                    log::warn!(
                        "Skipping entry {entry_id} ({} {} {:?}): {err}",
                        entry.date,
                        entry.amount,
                        entry.payee
                    );
                    summary.rejected += 1;
                }
                Err(err) => {
                    // Keep the unflushed remainder so dropping the session reports it
                    self.pending = pending[index..].to_vec();
                    return Err(err);
                }
            }
        }
        log::info!(
            "Committing ledger writes...done ({} created, {} updated, {} rejected)",
            summary.created,
            summary.updated,
            summary.rejected
        );
        Ok(summary)
    }

    /// Drop all staged writes, returning how many were discarded
    pub fn discard(mut self) -> usize {
        let discarded = self.pending.len();
        self.pending.clear();
        self.pending_kinds.clear();
        discarded
    }
}

impl<S: LedgerStorage> Drop for LedgerSession<S> {
    fn drop(&mut self) {
        if !self.pending.is_empty() {
            log::warn!(
                "Discarding {} uncommitted ledger writes",
                self.pending.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::MemoryStorage;
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;

    fn entry(account_id: &AccountId, payee: &str) -> LedgerEntry {
        LedgerEntry {
            id: EntryId::generate(),
            account_id: account_id.clone(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            payee: payee.to_string(),
            amount: BigDecimal::from(-10),
            notes: None,
            category: None,
            cleared: false,
        }
    }

    #[tokio::test]
    async fn test_staged_entries_reach_storage_only_on_commit() {
        let storage = MemoryStorage::new();
        let mut session = LedgerSession::new(storage.clone());
        let account = session.create_account("Checking").await.unwrap();

        session
            .stage_new_entry(entry(&account.id, "Market"))
            .await
            .unwrap();
        assert_eq!(session.entries(&account.id).await.unwrap().len(), 1);
        assert_eq!(storage.entry_count().unwrap(), 0);

        let summary = session.commit().await.unwrap();
        assert_eq!(
            summary,
            CommitSummary {
                created: 1,
                updated: 0,
                rejected: 0
            }
        );
        assert_eq!(storage.entry_count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_dropped_session_discards_staged_writes() {
        let storage = MemoryStorage::new();
        {
            let mut session = LedgerSession::new(storage.clone());
            let account = session.create_account("Checking").await.unwrap();
            session
                .stage_new_entry(entry(&account.id, "Market"))
                .await
                .unwrap();
        }
        // The account was created eagerly, the entry was not
        assert_eq!(storage.all_accounts().unwrap().len(), 1);
        assert_eq!(storage.entry_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_of_staged_creation_is_a_single_write() {
        let storage = MemoryStorage::new();
        let mut session = LedgerSession::new(storage.clone());
        let account = session.create_account("Checking").await.unwrap();

        let mut new_entry = entry(&account.id, "Market");
        session.stage_new_entry(new_entry.clone()).await.unwrap();
        new_entry.notes = Some("later".to_string());
        session.stage_update(new_entry).await.unwrap();
        assert_eq!(session.pending_writes(), 1);

        session.commit().await.unwrap();
        let stored = storage.all_entries().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].notes.as_deref(), Some("later"));
    }

    #[tokio::test]
    async fn test_update_of_existing_entry() {
        let mut storage = MemoryStorage::new();
        let account = storage.create_account("Checking").await.unwrap();
        let existing = entry(&account.id, "Market");
        storage.insert_entry(existing.clone()).unwrap();

        let mut session = LedgerSession::new(storage.clone());
        let mut updated = session.entries(&account.id).await.unwrap()[0].clone();
        updated.category = Some("Food".to_string());
        session.stage_update(updated).await.unwrap();
        let summary = session.commit().await.unwrap();

        assert_eq!(
            summary,
            CommitSummary {
                created: 0,
                updated: 1,
                rejected: 0
            }
        );
        assert_eq!(
            storage.all_entries().unwrap()[0].category.as_deref(),
            Some("Food")
        );
    }

    #[tokio::test]
    async fn test_update_of_unknown_entry_fails() {
        let storage = MemoryStorage::new();
        let mut session = LedgerSession::new(storage);
        let account = session.create_account("Checking").await.unwrap();

        let result = session.stage_update(entry(&account.id, "Market")).await;
        assert!(matches!(result, Err(LedgerError::EntryNotFound(_))));
    }

    #[tokio::test]
    async fn test_failed_commit_reports_error() {
        let storage = MemoryStorage::new();
        let mut session = LedgerSession::new(storage.clone());
        let account = session.create_account("Checking").await.unwrap();
        session
            .stage_new_entry(entry(&account.id, "Market"))
            .await
            .unwrap();

        storage.set_offline(true);
        assert!(matches!(
            session.commit().await,
            Err(LedgerError::Connection(_))
        ));
        storage.set_offline(false);
        assert_eq!(storage.entry_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_rejected_write_does_not_stop_commit() {
        let storage = MemoryStorage::new();
        let mut session = LedgerSession::new(storage.clone());
        let account = session.create_account("Checking").await.unwrap();
        let clashing = entry(&account.id, "Market");
        session.stage_new_entry(clashing.clone()).await.unwrap();
        session
            .stage_new_entry(entry(&account.id, "Bakery"))
            .await
            .unwrap();
        // Someone else wrote an entry with the same id in the meantime
        storage.insert_entry(clashing).unwrap();

        let summary = session.commit().await.unwrap();
        assert_eq!(summary.created, 1);
        assert_eq!(summary.rejected, 1);
        assert_eq!(storage.entry_count().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_discard() {
        let storage = MemoryStorage::new();
        let mut session = LedgerSession::new(storage.clone());
        let account = session.create_account("Checking").await.unwrap();
        session
            .stage_new_entry(entry(&account.id, "Market"))
            .await
            .unwrap();

        assert_eq!(session.discard(), 1);
        assert_eq!(storage.entry_count().unwrap(), 0);
    }
}

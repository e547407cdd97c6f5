//! In-memory ledger implementation for testing

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::traits::*;
use crate::types::*;

/// In-memory ledger for testing and development
///
/// Clones share the same underlying data, so a test can hand one clone to a
/// [`crate::ledger::LedgerSession`] and inspect the ledger through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    accounts: Arc<RwLock<Vec<Account>>>,
    entries: Arc<RwLock<HashMap<EntryId, LedgerEntry>>>,
    offline: Arc<AtomicBool>,
}

impl MemoryStorage {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an unreachable ledger: every call fails with a connection error
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Insert an entry directly, bypassing any session
    pub fn insert_entry(&self, entry: LedgerEntry) -> LedgerResult<()> {
        self.write_entries()?.insert(entry.id.clone(), entry);
        Ok(())
    }

    /// Snapshot of all entries, sorted by date then id
    pub fn all_entries(&self) -> LedgerResult<Vec<LedgerEntry>> {
        let mut entries: Vec<LedgerEntry> = self.read_entries()?.values().cloned().collect();
        entries.sort_by(|a, b| (a.date, &a.id).cmp(&(b.date, &b.id)));
        Ok(entries)
    }

    /// Number of entries across all accounts
    pub fn entry_count(&self) -> LedgerResult<usize> {
        Ok(self.read_entries()?.len())
    }

    /// Snapshot of all accounts in creation order
    pub fn all_accounts(&self) -> LedgerResult<Vec<Account>> {
        Ok(self.read_accounts()?.clone())
    }

    fn check_online(&self) -> LedgerResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(LedgerError::Connection(
                "in-memory ledger is offline".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    fn read_accounts(&self) -> LedgerResult<RwLockReadGuard<'_, Vec<Account>>> {
        self.accounts.read().map_err(|_| poisoned())
    }

    fn write_accounts(&self) -> LedgerResult<RwLockWriteGuard<'_, Vec<Account>>> {
        self.accounts.write().map_err(|_| poisoned())
    }

    fn read_entries(&self) -> LedgerResult<RwLockReadGuard<'_, HashMap<EntryId, LedgerEntry>>> {
        self.entries.read().map_err(|_| poisoned())
    }

    fn write_entries(
        &self,
    ) -> LedgerResult<RwLockWriteGuard<'_, HashMap<EntryId, LedgerEntry>>> {
        self.entries.write().map_err(|_| poisoned())
    }
}

fn poisoned() -> LedgerError {
    LedgerError::Storage("in-memory ledger lock poisoned".to_string())
}

#[async_trait]
impl LedgerStorage for MemoryStorage {
    async fn list_accounts(&self) -> LedgerResult<Vec<Account>> {
        self.check_online()?;
        Ok(self.read_accounts()?.clone())
    }

    async fn create_account(&mut self, name: &str) -> LedgerResult<Account> {
        self.check_online()?;
        let account = Account::new(
            AccountId::new(uuid::Uuid::new_v4().to_string()),
            name.to_string(),
        );
        self.write_accounts()?.push(account.clone());
        Ok(account)
    }

    async fn get_account_entries(
        &self,
        account_id: &AccountId,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> LedgerResult<Vec<LedgerEntry>> {
        self.check_online()?;
        if !self.read_accounts()?.iter().any(|a| &a.id == account_id) {
            return Err(LedgerError::AccountNotFound(account_id.to_string()));
        }
        let entries = self.read_entries()?;
        let mut filtered: Vec<LedgerEntry> = entries
            .values()
            .filter(|entry| {
                if &entry.account_id != account_id {
                    return false;
                }
                if let Some(start) = start_date {
                    if entry.date < start {
                        return false;
                    }
                }
                if let Some(end) = end_date {
                    if entry.date > end {
                        return false;
                    }
                }
                true
            })
            .cloned()
            .collect();
        filtered.sort_by(|a, b| (a.date, &a.id).cmp(&(b.date, &b.id)));
        Ok(filtered)
    }

    async fn save_entry(&mut self, entry: &LedgerEntry) -> LedgerResult<()> {
        self.check_online()?;
        if !self.read_accounts()?.iter().any(|a| a.id == entry.account_id) {
            return Err(LedgerError::AccountNotFound(entry.account_id.to_string()));
        }
        let mut entries = self.write_entries()?;
        if entries.contains_key(&entry.id) {
            return Err(LedgerError::Rejected(format!(
                "Entry with ID '{}' already exists",
                entry.id
            )));
        }
        entries.insert(entry.id.clone(), entry.clone());
        Ok(())
    }

    async fn update_entry(&mut self, entry: &LedgerEntry) -> LedgerResult<()> {
        self.check_online()?;
        let mut entries = self.write_entries()?;
        match entries.get_mut(&entry.id) {
            Some(existing) => {
                *existing = entry.clone();
                Ok(())
            }
            None => Err(LedgerError::EntryNotFound(entry.id.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use std::str::FromStr;

    fn entry(id: &str, account_id: &AccountId, day: u32) -> LedgerEntry {
        LedgerEntry {
            id: EntryId::new(id),
            account_id: account_id.clone(),
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            payee: "Market".to_string(),
            amount: BigDecimal::from_str("-42.50").unwrap(),
            notes: None,
            category: None,
            cleared: false,
        }
    }

    #[tokio::test]
    async fn test_entries_are_filtered_by_account_and_date() {
        let mut storage = MemoryStorage::new();
        let checking = storage.create_account("Checking").await.unwrap();
        let savings = storage.create_account("Savings").await.unwrap();

        storage.save_entry(&entry("a", &checking.id, 1)).await.unwrap();
        storage.save_entry(&entry("b", &checking.id, 5)).await.unwrap();
        storage.save_entry(&entry("c", &savings.id, 1)).await.unwrap();

        let all = storage
            .get_account_entries(&checking.id, None, None)
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let early = storage
            .get_account_entries(
                &checking.id,
                None,
                NaiveDate::from_ymd_opt(2024, 3, 2),
            )
            .await
            .unwrap();
        assert_eq!(early.len(), 1);
        assert_eq!(early[0].id, EntryId::new("a"));
    }

    #[tokio::test]
    async fn test_duplicate_entry_id_is_rejected() {
        let mut storage = MemoryStorage::new();
        let account = storage.create_account("Checking").await.unwrap();
        storage.save_entry(&entry("a", &account.id, 1)).await.unwrap();

        let result = storage.save_entry(&entry("a", &account.id, 1)).await;
        assert!(matches!(result, Err(LedgerError::Rejected(_))));
    }

    #[tokio::test]
    async fn test_offline_storage_fails_every_call() {
        let mut storage = MemoryStorage::new();
        storage.set_offline(true);

        assert!(matches!(
            storage.list_accounts().await,
            Err(LedgerError::Connection(_))
        ));
        assert!(matches!(
            storage.create_account("Checking").await,
            Err(LedgerError::Connection(_))
        ));
    }

    #[tokio::test]
    async fn test_clones_share_data() {
        let mut storage = MemoryStorage::new();
        let observer = storage.clone();
        storage.create_account("Checking").await.unwrap();

        assert_eq!(observer.all_accounts().unwrap().len(), 1);
    }
}

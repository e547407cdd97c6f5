//! Account resolution by name

use std::collections::HashMap;

use crate::ledger::LedgerSession;
use crate::traits::*;
use crate::types::*;

/// Resolves account names to ledger account ids, creating missing accounts.
///
/// Names are opaque and compared by exact string equality. Resolved ids are
/// cached for the lifetime of the resolver, which the run driver keeps for a
/// whole run.
#[derive(Debug, Default)]
pub struct AccountResolver {
    resolved: HashMap<String, AccountId>,
    dry_run: bool,
}

impl AccountResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver that doesn't create missing accounts in the ledger but
    /// substitutes session-local empty ones
    pub fn dry_run() -> Self {
        Self {
            resolved: HashMap::new(),
            dry_run: true,
        }
    }

    /// Return the id of the account with this exact name, creating it if absent
    pub async fn resolve<S: LedgerStorage>(
        &mut self,
        session: &mut LedgerSession<S>,
        account_name: &str,
    ) -> LedgerResult<AccountId> {
        if let Some(id) = self.resolved.get(account_name) {
            return Ok(id.clone());
        }

        let existing = session
            .list_accounts()
            .await?
            .into_iter()
            .find(|account| account.name == account_name);
        let account = match existing {
            Some(account) => account,
            None if self.dry_run => {
                log::info!("Dry run: account {account_name:?} would be created");
                session.local_account(account_name)
            }
            None => {
                log::info!("Creating account {account_name:?}");
                session.create_account(account_name).await?
            }
        };

        self.resolved
            .insert(account_name.to_string(), account.id.clone());
        Ok(account.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::MemoryStorage;

    #[tokio::test]
    async fn test_resolve_creates_missing_account_once() {
        let storage = MemoryStorage::new();
        let mut session = LedgerSession::new(storage.clone());
        let mut resolver = AccountResolver::new();

        let first = resolver.resolve(&mut session, "Checking").await.unwrap();
        let second = resolver.resolve(&mut session, "Checking").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(storage.all_accounts().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_resolve_finds_existing_account() {
        let mut storage = MemoryStorage::new();
        let existing = storage.create_account("Savings").await.unwrap();

        let mut session = LedgerSession::new(storage.clone());
        let mut resolver = AccountResolver::new();
        let id = resolver.resolve(&mut session, "Savings").await.unwrap();

        assert_eq!(id, existing.id);
        assert_eq!(storage.all_accounts().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_names_match_exactly() {
        let mut storage = MemoryStorage::new();
        storage.create_account("Savings").await.unwrap();

        let mut session = LedgerSession::new(storage.clone());
        let mut resolver = AccountResolver::new();
        resolver.resolve(&mut session, "savings").await.unwrap();
        resolver.resolve(&mut session, "").await.unwrap();

        let names: Vec<String> = storage
            .all_accounts()
            .unwrap()
            .into_iter()
            .map(|account| account.name)
            .collect();
        assert_eq!(names, vec!["Savings", "savings", ""]);
    }

    #[tokio::test]
    async fn test_dry_run_does_not_create_accounts() {
        let storage = MemoryStorage::new();
        let mut session = LedgerSession::new(storage.clone());
        let mut resolver = AccountResolver::dry_run();

        let id = resolver.resolve(&mut session, "Checking").await.unwrap();
        assert_eq!(resolver.resolve(&mut session, "Checking").await.unwrap(), id);
        assert!(session.entries(&id).await.unwrap().is_empty());
        assert!(storage.all_accounts().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_ledger_is_an_error() {
        let storage = MemoryStorage::new();
        storage.set_offline(true);
        let mut session = LedgerSession::new(storage);
        let mut resolver = AccountResolver::new();

        assert!(matches!(
            resolver.resolve(&mut session, "Checking").await,
            Err(LedgerError::Connection(_))
        ));
    }
}

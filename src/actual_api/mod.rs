//! Ledger backend talking to an Actual Budget server through actual-http-api

mod accounts;
mod client;
mod names;
mod transactions;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::config::LedgerConfig;
use crate::traits::*;
use crate::types::*;

pub use client::ActualClient;
pub use names::NameTable;
pub use transactions::{amount_to_cents, cents_to_amount};

/// [`LedgerStorage`] backed by one budget on an actual-http-api server
pub struct ActualHttpStorage {
    client: ActualClient,
    payees: NameTable,
    categories: NameTable,
    category_group: Option<String>,
}

impl ActualHttpStorage {
    /// Connect to the budget and load the payee and category tables.
    ///
    /// Fails if the server can't be reached, rejects the API key or doesn't
    /// know the budget. Nothing is written.
    pub async fn connect(config: &LedgerConfig) -> LedgerResult<Self> {
        log::info!(
            "Connecting to budget {:?} at {}...",
            config.budget,
            config.base_url
        );
        let client = ActualClient::new(config)?;
        let accounts = accounts::get_accounts(&client).await?;
        let payees = names::get_payees(&client).await?;
        let categories = names::get_categories(&client).await?;
        log::info!(
            "Connecting to budget {:?} at {}...done ({} accounts, {} payees, {} categories)",
            config.budget,
            config.base_url,
            accounts.len(),
            payees.len(),
            categories.len()
        );
        Ok(Self {
            client,
            payees,
            categories,
            category_group: None,
        })
    }

    /// Create the entry's category if the budget doesn't have it yet, so that
    /// the write carries it and a rerun reads it back.
    async fn ensure_category(&mut self, entry: &LedgerEntry) -> LedgerResult<()> {
        let Some(name) = transactions::missing_category(&self.categories, entry) else {
            return Ok(());
        };
        let group_id = self.category_group_id().await?;
        let id = names::create_category(&self.client, name, &group_id).await?;
        log::info!("Created category {name:?} in group {:?}", names::DEFAULT_CATEGORY_GROUP);
        self.categories.insert(id, name.to_string());
        Ok(())
    }

    async fn category_group_id(&mut self) -> LedgerResult<String> {
        if let Some(id) = &self.category_group {
            return Ok(id.clone());
        }
        let groups = names::get_category_groups(&self.client).await?;
        let id = match groups.id(names::DEFAULT_CATEGORY_GROUP) {
            Some(id) => id.to_string(),
            None => {
                names::create_category_group(&self.client, names::DEFAULT_CATEGORY_GROUP).await?
            }
        };
        self.category_group = Some(id.clone());
        Ok(id)
    }
}

#[async_trait]
impl LedgerStorage for ActualHttpStorage {
    async fn list_accounts(&self) -> LedgerResult<Vec<Account>> {
        accounts::get_accounts(&self.client).await
    }

    async fn create_account(&mut self, name: &str) -> LedgerResult<Account> {
        accounts::create_account(&self.client, name).await
    }

    async fn get_account_entries(
        &self,
        account_id: &AccountId,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> LedgerResult<Vec<LedgerEntry>> {
        transactions::get_transactions(
            &self.client,
            &self.payees,
            &self.categories,
            account_id,
            start_date,
            end_date,
        )
        .await
    }

    async fn save_entry(&mut self, entry: &LedgerEntry) -> LedgerResult<()> {
        self.ensure_category(entry).await?;
        transactions::create_transaction(&self.client, &self.categories, entry).await
    }

    async fn update_entry(&mut self, entry: &LedgerEntry) -> LedgerResult<()> {
        self.ensure_category(entry).await?;
        transactions::update_transaction(&self.client, &self.categories, entry).await
    }
}

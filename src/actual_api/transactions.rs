use bigdecimal::num_bigint::BigInt;
use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::NaiveDate;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::client::ActualClient;
use super::names::NameTable;
use crate::types::*;

/// `since_date` is mandatory on the transactions endpoint
const EARLIEST_DATE: &str = "1970-01-01";

#[derive(Debug, Deserialize)]
struct ApiTransaction {
    id: String,
    account: String,
    date: NaiveDate,
    amount: i64,
    #[serde(default)]
    payee: Option<String>,
    #[serde(default)]
    imported_payee: Option<String>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    cleared: Option<bool>,
    #[serde(default)]
    is_child: bool,
}

#[derive(Debug, Serialize, PartialEq)]
struct NewTransaction<'a> {
    id: &'a str,
    account: &'a str,
    date: NaiveDate,
    amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    payee_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    imported_payee: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<&'a str>,
    cleared: bool,
}

#[derive(Serialize)]
struct CreateTransaction<'a> {
    #[serde(rename = "learnCategories")]
    learn_categories: bool,
    #[serde(rename = "runTransfers")]
    run_transfers: bool,
    transaction: NewTransaction<'a>,
}

/// Only the fields reconciliation may fill in
#[derive(Debug, Serialize, PartialEq)]
struct TransactionChanges<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<&'a str>,
    cleared: bool,
}

#[derive(Serialize)]
struct UpdateTransaction<'a> {
    transaction: TransactionChanges<'a>,
}

/// Amounts are stored as integer cents
pub fn cents_to_amount(cents: i64) -> BigDecimal {
    BigDecimal::new(BigInt::from(cents), 2)
}

pub fn amount_to_cents(amount: &BigDecimal) -> LedgerResult<i64> {
    let scaled = amount * BigDecimal::from(100);
    let cents = scaled.with_scale(0);
    if cents != scaled {
        return Err(LedgerError::Validation(format!(
            "Amount {amount} has more than two decimal places"
        )));
    }
    cents
        .to_i64()
        .ok_or_else(|| LedgerError::Validation(format!("Amount {amount} is out of range")))
}

/// Category name of `entry` that the ledger doesn't know yet
pub(super) fn missing_category<'a>(
    categories: &NameTable,
    entry: &'a LedgerEntry,
) -> Option<&'a str> {
    let name = entry.category.as_deref().filter(|name| !name.is_empty())?;
    categories.id(name).is_none().then_some(name)
}

fn category_id<'a>(
    categories: &'a NameTable,
    entry: &LedgerEntry,
) -> LedgerResult<Option<&'a str>> {
    let Some(name) = entry.category.as_deref().filter(|name| !name.is_empty()) else {
        return Ok(None);
    };
    categories.id(name).map(Some).ok_or_else(|| {
        LedgerError::Validation(format!(
            "Category {name:?} of entry {} does not exist in the ledger",
            entry.id
        ))
    })
}

fn into_entry(
    transaction: ApiTransaction,
    payees: &NameTable,
    categories: &NameTable,
) -> LedgerEntry {
    let payee = transaction
        .payee
        .as_deref()
        .and_then(|id| payees.name(id))
        .map(str::to_string)
        .or(transaction.imported_payee)
        .unwrap_or_default();
    let category = transaction
        .category
        .as_deref()
        .map(|id| categories.name(id).unwrap_or(id).to_string());
    LedgerEntry {
        id: EntryId(transaction.id),
        account_id: AccountId(transaction.account),
        date: transaction.date,
        payee,
        amount: cents_to_amount(transaction.amount),
        notes: transaction.notes,
        category,
        cleared: transaction.cleared.unwrap_or(false),
    }
}

pub async fn get_transactions(
    client: &ActualClient,
    payees: &NameTable,
    categories: &NameTable,
    account_id: &AccountId,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> LedgerResult<Vec<LedgerEntry>> {
    log::debug!("Requesting transactions of account {account_id}...");
    let mut query = vec![(
        "since_date",
        start_date
            .map(|date| date.to_string())
            .unwrap_or_else(|| EARLIEST_DATE.to_string()),
    )];
    if let Some(end_date) = end_date {
        query.push(("until_date", end_date.to_string()));
    }
    let transactions: Vec<ApiTransaction> = client
        .get(&["accounts", account_id.as_str(), "transactions"], &query)
        .await?;

    let mut entries: Vec<LedgerEntry> = transactions
        .into_iter()
        .filter(|transaction| !transaction.is_child)
        .map(|transaction| into_entry(transaction, payees, categories))
        .filter(|entry| start_date.map_or(true, |start| entry.date >= start))
        .filter(|entry| end_date.map_or(true, |end| entry.date <= end))
        .collect();
    entries.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
    log::debug!(
        "Requesting transactions of account {account_id}...done ({} entries)",
        entries.len()
    );
    Ok(entries)
}

fn new_transaction<'a>(
    entry: &'a LedgerEntry,
    categories: &'a NameTable,
) -> LedgerResult<NewTransaction<'a>> {
    let payee = Some(entry.payee.as_str()).filter(|payee| !payee.is_empty());
    Ok(NewTransaction {
        id: entry.id.as_str(),
        account: entry.account_id.as_str(),
        date: entry.date,
        amount: amount_to_cents(&entry.amount)?,
        payee_name: payee,
        imported_payee: payee,
        notes: entry.notes.as_deref().filter(|notes| !notes.is_empty()),
        category: category_id(categories, entry)?,
        cleared: entry.cleared,
    })
}

fn transaction_changes<'a>(
    entry: &'a LedgerEntry,
    categories: &'a NameTable,
) -> LedgerResult<TransactionChanges<'a>> {
    Ok(TransactionChanges {
        notes: entry.notes.as_deref().filter(|notes| !notes.is_empty()),
        category: category_id(categories, entry)?,
        cleared: entry.cleared,
    })
}

/// Create a transaction under the entry's own id so that reruns find it again
pub async fn create_transaction(
    client: &ActualClient,
    categories: &NameTable,
    entry: &LedgerEntry,
) -> LedgerResult<()> {
    let body = CreateTransaction {
        learn_categories: false,
        run_transfers: false,
        transaction: new_transaction(entry, categories)?,
    };
    client
        .write(
            Method::POST,
            &["accounts", entry.account_id.as_str(), "transactions"],
            &body,
        )
        .await
}

pub async fn update_transaction(
    client: &ActualClient,
    categories: &NameTable,
    entry: &LedgerEntry,
) -> LedgerResult<()> {
    let body = UpdateTransaction {
        transaction: transaction_changes(entry, categories)?,
    };
    client
        .write(Method::PATCH, &["transactions", entry.id.as_str()], &body)
        .await
}

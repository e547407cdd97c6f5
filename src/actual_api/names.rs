//! Payee and category lookup tables.
//!
//! The ledger refers to payees and categories by id, the import pipeline by name.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::client::ActualClient;
use crate::types::*;

/// Group that categories created by the import are placed in
pub const DEFAULT_CATEGORY_GROUP: &str = "Usual Expenses";

#[derive(Debug, Deserialize)]
struct Named {
    id: String,
    #[serde(default)]
    name: String,
}

#[derive(Serialize)]
struct NewCategory<'a> {
    name: &'a str,
    group_id: &'a str,
}

#[derive(Serialize)]
struct CreateCategory<'a> {
    category: NewCategory<'a>,
}

#[derive(Serialize)]
struct NewCategoryGroup<'a> {
    name: &'a str,
}

#[derive(Serialize)]
struct CreateCategoryGroup<'a> {
    category_group: NewCategoryGroup<'a>,
}

/// Bidirectional id/name table
#[derive(Debug, Default, Clone)]
pub struct NameTable {
    by_id: HashMap<String, String>,
    by_name: HashMap<String, String>,
}

impl NameTable {
    fn from_named(items: Vec<Named>) -> Self {
        let mut table = Self::default();
        for item in items {
            table.insert(item.id, item.name);
        }
        table
    }

    pub fn insert(&mut self, id: String, name: String) {
        // First id wins if the ledger has duplicate names
        self.by_name.entry(name.clone()).or_insert_with(|| id.clone());
        self.by_id.insert(id, name);
    }

    pub fn name(&self, id: &str) -> Option<&str> {
        self.by_id.get(id).map(String::as_str)
    }

    pub fn id(&self, name: &str) -> Option<&str> {
        self.by_name.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

pub async fn get_payees(client: &ActualClient) -> LedgerResult<NameTable> {
    log::debug!("Requesting payees...");
    let payees: Vec<Named> = client.get(&["payees"], &[]).await?;
    log::debug!("Requesting payees...done ({} payees)", payees.len());
    Ok(NameTable::from_named(payees))
}

pub async fn get_categories(client: &ActualClient) -> LedgerResult<NameTable> {
    log::debug!("Requesting categories...");
    let categories: Vec<Named> = client.get(&["categories"], &[]).await?;
    log::debug!("Requesting categories...done ({} categories)", categories.len());
    Ok(NameTable::from_named(categories))
}

pub async fn get_category_groups(client: &ActualClient) -> LedgerResult<NameTable> {
    log::debug!("Requesting category groups...");
    let groups: Vec<Named> = client.get(&["categorygroups"], &[]).await?;
    log::debug!("Requesting category groups...done ({} groups)", groups.len());
    Ok(NameTable::from_named(groups))
}

pub async fn create_category_group(client: &ActualClient, name: &str) -> LedgerResult<String> {
    log::debug!("Creating category group {name:?}...");
    let body = CreateCategoryGroup {
        category_group: NewCategoryGroup { name },
    };
    let id: String = client.send(Method::POST, &["categorygroups"], &body).await?;
    log::debug!("Creating category group {name:?}...done");
    Ok(id)
}

pub async fn create_category(
    client: &ActualClient,
    name: &str,
    group_id: &str,
) -> LedgerResult<String> {
    log::debug!("Creating category {name:?}...");
    let body = CreateCategory {
        category: NewCategory { name, group_id },
    };
    let id: String = client.send(Method::POST, &["categories"], &body).await?;
    log::debug!("Creating category {name:?}...done");
    Ok(id)
}

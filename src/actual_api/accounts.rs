use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::client::ActualClient;
use crate::types::*;

#[derive(Debug, Deserialize)]
struct ApiAccount {
    id: String,
    name: String,
    #[serde(default)]
    offbudget: bool,
    #[serde(default)]
    closed: bool,
}

impl From<ApiAccount> for Account {
    fn from(account: ApiAccount) -> Self {
        Account {
            id: AccountId(account.id),
            name: account.name,
            off_budget: account.offbudget,
            closed: account.closed,
        }
    }
}

#[derive(Serialize)]
struct NewAccount<'a> {
    name: &'a str,
    offbudget: bool,
}

#[derive(Serialize)]
struct CreateAccount<'a> {
    account: NewAccount<'a>,
    #[serde(rename = "initialBalance")]
    initial_balance: i64,
}

pub async fn get_accounts(client: &ActualClient) -> LedgerResult<Vec<Account>> {
    log::debug!("Requesting accounts...");
    let accounts: Vec<ApiAccount> = client.get(&["accounts"], &[]).await?;
    log::debug!("Requesting accounts...done ({} accounts)", accounts.len());
    Ok(accounts.into_iter().map(Account::from).collect())
}

/// Create an open, on-budget account with a zero starting balance
pub async fn create_account(client: &ActualClient, name: &str) -> LedgerResult<Account> {
    log::debug!("Creating account {name:?}...");
    let body = CreateAccount {
        account: NewAccount {
            name,
            offbudget: false,
        },
        initial_balance: 0,
    };
    let id: String = client.send(Method::POST, &["accounts"], &body).await?;
    log::debug!("Creating account {name:?}...done");
    Ok(Account::new(AccountId(id), name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_from_api() {
        let accounts: Vec<ApiAccount> = serde_json::from_str(
            r#"[
                {"id": "a1", "name": "Checking", "offbudget": false, "closed": false},
                {"id": "a2", "name": "Savings", "offbudget": true}
            ]"#,
        )
        .unwrap();
        let accounts: Vec<Account> = accounts.into_iter().map(Account::from).collect();

        assert_eq!(accounts[0], Account::new(AccountId::new("a1"), "Checking".to_string()));
        assert_eq!(accounts[1].name, "Savings");
        assert!(accounts[1].off_budget);
        assert!(!accounts[1].closed);
    }

    #[test]
    fn test_create_account_body() {
        let body = CreateAccount {
            account: NewAccount {
                name: "Checking",
                offbudget: false,
            },
            initial_balance: 0,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({
                "account": {"name": "Checking", "offbudget": false},
                "initialBalance": 0
            })
        );
    }
}

use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::LedgerConfig;
use crate::types::*;

/// Thin wrapper around the actual-http-api REST endpoints of one budget
#[derive(Debug, Clone)]
pub struct ActualClient {
    http: reqwest::Client,
    base_url: Url,
    budget: String,
    api_key: String,
    encryption_password: Option<String>,
}

/// Every successful response wraps its payload in `data`
#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl ActualClient {
    pub fn new(config: &LedgerConfig) -> LedgerResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| LedgerError::Connection(err.to_string()))?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            budget: config.budget.clone(),
            api_key: config.api_key.clone(),
            encryption_password: config.encryption_password.clone(),
        })
    }

    /// URL of a budget-scoped endpoint, e.g. `["accounts", id, "transactions"]`
    pub(super) fn url(&self, path: &[&str], query: &[(&str, String)]) -> LedgerResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                LedgerError::Connection(format!("{} cannot be used as base URL", self.base_url))
            })?
            .pop_if_empty()
            .extend(["v1", "budgets", self.budget.as_str()])
            .extend(path);
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(key, value)| (*key, value.as_str())));
        }
        Ok(url)
    }

    pub(super) async fn get<T: DeserializeOwned>(
        &self,
        path: &[&str],
        query: &[(&str, String)],
    ) -> LedgerResult<T> {
        let url = self.url(path, query)?;
        let body = self.execute(self.http.request(Method::GET, url)).await?;
        parse_data(&body)
    }

    /// Send `body` and return the `data` of the response
    pub(super) async fn send<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &[&str],
        body: &B,
    ) -> LedgerResult<T> {
        let url = self.url(path, &[])?;
        let body = self.execute(self.http.request(method, url).json(body)).await?;
        parse_data(&body)
    }

    /// Send `body` for an endpoint that only acknowledges the write
    pub(super) async fn write<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &[&str],
        body: &B,
    ) -> LedgerResult<()> {
        let url = self.url(path, &[])?;
        self.execute(self.http.request(method, url).json(body)).await?;
        Ok(())
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> LedgerResult<String> {
        let mut request = request.header("x-api-key", &self.api_key);
        if let Some(password) = &self.encryption_password {
            request = request.header("budget-encryption-password", password);
        }
        let request = request
            .build()
            .map_err(|err| LedgerError::Connection(err.to_string()))?;
        log::debug!("{} {}", request.method(), request.url());

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|err| LedgerError::Connection(err.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| LedgerError::Connection(err.to_string()))?;
        if !status.is_success() {
            return Err(status_error(status, &body));
        }
        Ok(body)
    }
}

pub(super) fn parse_data<T: DeserializeOwned>(body: &str) -> LedgerResult<T> {
    let envelope: Envelope<T> = serde_json::from_str(body)
        .map_err(|err| LedgerError::Storage(format!("Unexpected response from ledger: {err}")))?;
    Ok(envelope.data)
}

pub(super) fn status_error(status: StatusCode, body: &str) -> LedgerError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|body| body.error)
        .unwrap_or_else(|_| format!("HTTP {status}"));
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LedgerError::Unauthorized(message),
        StatusCode::NOT_FOUND => LedgerError::Rejected(format!("Not found: {message}")),
        status if status.is_client_error() => LedgerError::Rejected(message),
        _ => LedgerError::Connection(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> ActualClient {
        ActualClient::new(&LedgerConfig {
            base_url: Url::parse(base_url).unwrap(),
            api_key: "key".to_string(),
            budget: "my budget".to_string(),
            encryption_password: None,
        })
        .unwrap()
    }

    #[test]
    fn test_url_building() {
        let url = client("http://localhost:5007/")
            .url(&["accounts", "a1", "transactions"], &[("since_date", "2024-01-01".to_string())])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:5007/v1/budgets/my%20budget/accounts/a1/transactions?since_date=2024-01-01"
        );
    }

    #[test]
    fn test_url_building_keeps_base_path() {
        let url = client("https://example.com/actual").url(&["accounts"], &[]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.com/actual/v1/budgets/my%20budget/accounts"
        );
    }

    #[test]
    fn test_parse_data() {
        let ids: Vec<String> = parse_data(r#"{"data":["a","b"]}"#).unwrap();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(matches!(
            parse_data::<Vec<String>>(r#"{"message":"ok"}"#),
            Err(LedgerError::Storage(_))
        ));
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, ""),
            LedgerError::Unauthorized(_)
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_REQUEST, r#"{"error":"amount is required"}"#),
            LedgerError::Rejected(message) if message == "amount is required"
        ));
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, r#"{"error":"Budget does not exist"}"#),
            LedgerError::Rejected(message) if message == "Not found: Budget does not exist"
        ));
        assert!(matches!(
            status_error(StatusCode::INTERNAL_SERVER_ERROR, "oops"),
            LedgerError::Connection(message) if message.contains("500")
        ));
    }
}

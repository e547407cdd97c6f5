//! Validated run configuration

use std::fmt;

use crate::args::Args;
use crate::import::ColumnLayout;
use crate::reconciliation::MatchPolicy;

/// Invalid or missing configuration; always fatal before the ledger is touched
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("Invalid ledger URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("Delimiter must be a single ASCII character, got {0:?}")]
    InvalidDelimiter(String),
}

/// How to reach the ledger
#[derive(Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    pub base_url: reqwest::Url,
    pub api_key: String,
    pub budget: String,
    pub encryption_password: Option<String>,
}

impl fmt::Debug for LedgerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedgerConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"[redacted]")
            .field("budget", &self.budget)
            .field(
                "encryption_password",
                &self.encryption_password.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}

/// Everything a run needs, built once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub ledger: LedgerConfig,
    /// Comma-separated paths and glob patterns
    pub file_patterns: String,
    pub default_account: String,
    pub layout: ColumnLayout,
    pub delimiter: u8,
    pub match_policy: MatchPolicy,
    pub dry_run: bool,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        let url = non_blank(args.url, "ACTUAL_BUDGET_URL")?;
        let base_url = reqwest::Url::parse(&url).map_err(|err| ConfigError::InvalidUrl {
            url: url.clone(),
            reason: err.to_string(),
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                url,
                reason: "scheme must be http or https".to_string(),
            });
        }

        let delimiter = match args.delimiter.as_bytes() {
            [byte] if byte.is_ascii() => *byte,
            _ => return Err(ConfigError::InvalidDelimiter(args.delimiter)),
        };

        Ok(Self {
            ledger: LedgerConfig {
                base_url,
                api_key: non_blank(args.api_key, "ACTUAL_BUDGET_PASSWORD")?,
                budget: non_blank(args.budget, "BUDGET_NAME")?,
                encryption_password: args.budget_password.filter(|p| !p.is_empty()),
            },
            file_patterns: non_blank(args.files, "CSV_FILE_PATH")?,
            default_account: non_blank(args.default_account, "ACCOUNT_NAME_DEFAULT")?,
            layout: ColumnLayout {
                date: args.date_column,
                payee: args.payee_column,
                amount: args.amount_column,
                category: Some(args.category_column),
                notes: Some(args.notes_column),
                account: args.account_column,
                date_format: args.date_format,
            },
            delimiter,
            match_policy: MatchPolicy {
                date_tolerance_days: args.date_tolerance_days,
                payee: args.payee_match,
            },
            dry_run: args.dry_run,
        })
    }
}

fn non_blank(value: String, name: &'static str) -> Result<String, ConfigError> {
    if value.trim().is_empty() {
        Err(ConfigError::Missing(name))
    } else {
        Ok(value)
    }
}

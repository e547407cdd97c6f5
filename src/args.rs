use clap::Parser;

use crate::reconciliation::PayeeMatch;

/// Import bank CSV exports into an Actual Budget ledger without creating duplicates.
///
/// Every option can also be given through the environment variable shown in its help.
#[derive(Parser, Debug)]
#[command(version)]
pub struct Args {
    /// Base URL of the actual-http-api server
    #[arg(long = "url", env = "ACTUAL_BUDGET_URL")]
    pub url: String,

    /// API key of the actual-http-api server
    #[arg(long, env = "ACTUAL_BUDGET_PASSWORD", hide_env_values = true)]
    pub api_key: String,

    /// Sync id of the budget to import into. The budget must already exist on
    /// the server; it is never created.
    #[arg(long, env = "BUDGET_NAME")]
    pub budget: String,

    /// End-to-end encryption password of the budget, if it has one
    #[arg(long, env = "ACTUAL_BUDGET_ENCRYPTION_PASSWORD", hide_env_values = true)]
    pub budget_password: Option<String>,

    /// Comma-separated list of CSV files or glob patterns
    #[arg(long, env = "CSV_FILE_PATH")]
    pub files: String,

    /// Account used for rows that don't name one
    #[arg(long, env = "ACCOUNT_NAME_DEFAULT")]
    pub default_account: String,

    /// Zero-based column of the transaction date
    #[arg(long, env = "CSV_DATE_COLUMN", default_value_t = 1)]
    pub date_column: usize,

    /// Zero-based column of the payee
    #[arg(long, env = "CSV_PAYEE_COLUMN", default_value_t = 4)]
    pub payee_column: usize,

    /// Zero-based column of the category
    #[arg(long, env = "CSV_CATEGORY_COLUMN", default_value_t = 6)]
    pub category_column: usize,

    /// Zero-based column of the amount
    #[arg(long, env = "CSV_AMOUNT_COLUMN", default_value_t = 7)]
    pub amount_column: usize,

    /// Zero-based column of the notes
    #[arg(long, env = "CSV_NOTES_COLUMN", default_value_t = 11)]
    pub notes_column: usize,

    /// Zero-based column naming the account, if the files have one
    #[arg(long, env = "CSV_ACCOUNT_COLUMN")]
    pub account_column: Option<usize>,

    /// chrono format string of the date column
    #[arg(long, env = "CSV_DATE_FORMAT", default_value = crate::import::DEFAULT_DATE_FORMAT)]
    pub date_format: String,

    /// Field delimiter, a single ASCII character
    #[arg(long, env = "CSV_DELIMITER", default_value = ",")]
    pub delimiter: String,

    /// Maximum distance in days between a row and a matching ledger entry
    #[arg(long, env = "MATCH_DATE_TOLERANCE_DAYS", default_value_t = 0)]
    pub date_tolerance_days: u32,

    /// Payee comparison when matching: exact, normalized or any
    #[arg(long, env = "MATCH_PAYEE", default_value_t = PayeeMatch::Exact)]
    pub payee_match: PayeeMatch,

    /// Reconcile and report, but don't write entries to the ledger
    #[arg(long, env = "DRY_RUN")]
    pub dry_run: bool,
}

pub fn parse() -> Args {
    Args::parse()
}

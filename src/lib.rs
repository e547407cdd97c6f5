//! # Ledger CSV Import
//!
//! Imports bank CSV exports into an Actual Budget ledger. Running the import
//! again over the same or overlapping files does not create duplicates.
//!
//! ## Features
//!
//! - **Row normalization**: configurable column layout, date format and delimiter
//! - **Idempotent reconciliation**: each row is matched against existing entries
//!   and at most one row claims a given entry per run
//! - **Enrich, never overwrite**: matched entries only get empty fields filled in
//! - **Staged writes**: all writes of a run are committed once at the end
//! - **Storage abstraction**: the pipeline runs against any [`LedgerStorage`]
//!
//! ## Quick Start
//!
//! ```rust
//! use ledger_csv_import::{ClaimedSet, LedgerSession, MemoryStorage, ReconciliationEngine};
//! use ledger_csv_import::TransactionCandidate;
//! use bigdecimal::BigDecimal;
//! use chrono::NaiveDate;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = LedgerSession::new(MemoryStorage::new());
//! let account = session.create_account("Checking").await?;
//!
//! let candidate = TransactionCandidate::builder("Checking")
//!     .date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
//!     .payee("Market")
//!     .amount(BigDecimal::from(-42))
//!     .build()?;
//!
//! let engine = ReconciliationEngine::new();
//! let mut claimed = ClaimedSet::new();
//! engine.reconcile(&mut session, &candidate, &account.id, &mut claimed).await?;
//! session.commit().await?;
//! # Ok(())
//! # }
//! ```

pub mod actual_api;
pub mod args;
pub mod cli;
pub mod config;
pub mod driver;
pub mod import;
pub mod ledger;
pub mod reconciliation;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use driver::{RowOutcome, RunDriver, RunReport};
pub use ledger::*;
pub use reconciliation::*;
pub use traits::*;
pub use types::*;
pub use utils::MemoryStorage;

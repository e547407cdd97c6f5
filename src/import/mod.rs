//! Mapping of positional CSV rows onto transaction candidates

pub mod files;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use csv::StringRecord;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::str::FromStr;

use crate::types::TransactionCandidate;

pub use files::{expand_patterns, FileError};

/// Default date format of the bank exports this tool was written for (DD-MM-YYYY)
pub const DEFAULT_DATE_FORMAT: &str = "%d-%m-%Y";

/// Zero-based column positions of the fields in each row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnLayout {
    pub date: usize,
    pub payee: usize,
    pub amount: usize,
    /// Rows shorter than this column have no category
    pub category: Option<usize>,
    /// Rows shorter than this column have no notes
    pub notes: Option<usize>,
    /// Rows without this column, or with an empty cell, use the default account
    pub account: Option<usize>,
    pub date_format: String,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            date: 1,
            payee: 4,
            amount: 7,
            category: Some(6),
            notes: Some(11),
            account: None,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

/// Why a row could not be turned into a candidate
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    #[error("Row has {len} columns, {field} is expected in column {index}")]
    MissingColumn {
        field: &'static str,
        index: usize,
        len: usize,
    },
    #[error("Invalid date {value:?}, expected format {format:?}")]
    InvalidDate { value: String, format: String },
    #[error("Invalid amount {value:?}")]
    InvalidAmount { value: String },
}

/// Turns raw rows into candidates according to a [`ColumnLayout`]
#[derive(Debug, Clone)]
pub struct RowNormalizer {
    layout: ColumnLayout,
    default_account: String,
}

impl RowNormalizer {
    pub fn new(layout: ColumnLayout, default_account: impl Into<String>) -> Self {
        Self {
            layout,
            default_account: default_account.into(),
        }
    }

    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    /// Map one row onto a candidate
    pub fn normalize(&self, row: &StringRecord) -> Result<TransactionCandidate, NormalizeError> {
        let date_cell = required(row, "date", self.layout.date)?;
        let payee = required(row, "payee", self.layout.payee)?;
        let amount_cell = required(row, "amount", self.layout.amount)?;

        let date = NaiveDate::parse_from_str(date_cell, &self.layout.date_format).map_err(|_| {
            NormalizeError::InvalidDate {
                value: date_cell.to_string(),
                format: self.layout.date_format.clone(),
            }
        })?;
        let amount =
            BigDecimal::from_str(amount_cell).map_err(|_| NormalizeError::InvalidAmount {
                value: amount_cell.to_string(),
            })?;

        let account_name = optional(row, self.layout.account)
            .filter(|name| !name.is_empty())
            .unwrap_or(self.default_account.as_str())
            .to_string();

        Ok(TransactionCandidate {
            account_name,
            date,
            payee: payee.to_string(),
            amount,
            notes: optional(row, self.layout.notes).map(str::to_string),
            category: optional(row, self.layout.category).map(str::to_string),
            cleared: false,
        })
    }
}

fn cell(row: &StringRecord, index: usize) -> Option<&str> {
    row.get(index)
        .map(|value| value.trim_start_matches('\u{FEFF}').trim())
}

fn required<'a>(
    row: &'a StringRecord,
    field: &'static str,
    index: usize,
) -> Result<&'a str, NormalizeError> {
    cell(row, index).ok_or(NormalizeError::MissingColumn {
        field,
        index,
        len: row.len(),
    })
}

fn optional(row: &StringRecord, index: Option<usize>) -> Option<&str> {
    index.and_then(|index| cell(row, index))
}

/// CSV reader over positional rows: no header handling, rows may differ in length
pub fn csv_reader<R: Read>(input: R, delimiter: u8) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(input)
}

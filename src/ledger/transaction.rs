//! Candidate construction and ledger entry field handling

use bigdecimal::BigDecimal;
use chrono::NaiveDate;

use crate::types::*;

/// Builder for transaction candidates
#[derive(Debug, Default)]
pub struct CandidateBuilder {
    account_name: String,
    date: Option<NaiveDate>,
    payee: String,
    amount: Option<BigDecimal>,
    notes: Option<String>,
    category: Option<String>,
    cleared: bool,
}

impl CandidateBuilder {
    /// Start a candidate for the given account
    pub fn new(account_name: impl Into<String>) -> Self {
        Self {
            account_name: account_name.into(),
            ..Default::default()
        }
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn payee(mut self, payee: impl Into<String>) -> Self {
        self.payee = payee.into();
        self
    }

    pub fn amount(mut self, amount: BigDecimal) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn cleared(mut self, cleared: bool) -> Self {
        self.cleared = cleared;
        self
    }

    /// Build the candidate, failing if date or amount were never set
    pub fn build(self) -> ReconciliationResult<TransactionCandidate> {
        let date = self.date.ok_or_else(|| {
            ReconciliationError::InvalidCandidate("Candidate has no date".to_string())
        })?;
        let amount = self.amount.ok_or_else(|| {
            ReconciliationError::InvalidCandidate("Candidate has no amount".to_string())
        })?;
        Ok(TransactionCandidate {
            account_name: self.account_name,
            date,
            payee: self.payee,
            amount,
            notes: self.notes,
            category: self.category,
            cleared: self.cleared,
        })
    }
}

impl TransactionCandidate {
    /// Start building a candidate for the given account
    pub fn builder(account_name: impl Into<String>) -> CandidateBuilder {
        CandidateBuilder::new(account_name)
    }
}

impl LedgerEntry {
    /// New entry carrying exactly the candidate's fields
    pub fn from_candidate(candidate: &TransactionCandidate, account_id: AccountId) -> Self {
        Self {
            id: EntryId::generate(),
            account_id,
            date: candidate.date,
            payee: candidate.payee.clone(),
            amount: candidate.amount.clone(),
            notes: candidate.notes.clone(),
            category: candidate.category.clone(),
            cleared: candidate.cleared,
        }
    }

    /// Fill fields that are empty on this entry with the candidate's values.
    ///
    /// Populated fields are never overwritten and `cleared` only ever goes from
    /// false to true. Returns whether any field was modified.
    pub fn enrich_from(&mut self, candidate: &TransactionCandidate) -> bool {
        let mut changed = false;
        changed |= fill_if_empty(&mut self.notes, candidate.notes.as_deref());
        changed |= fill_if_empty(&mut self.category, candidate.category.as_deref());
        if candidate.cleared && !self.cleared {
            self.cleared = true;
            changed = true;
        }
        changed
    }
}

fn fill_if_empty(field: &mut Option<String>, value: Option<&str>) -> bool {
    let Some(value) = value.filter(|value| !value.is_empty()) else {
        return false;
    };
    if field.as_deref().is_some_and(|current| !current.is_empty()) {
        return false;
    }
    *field = Some(value.to_string());
    true
}

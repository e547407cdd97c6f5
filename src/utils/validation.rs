//! Validation utilities

use bigdecimal::BigDecimal;

use crate::types::*;

/// Number of fractional digits the ledger stores amounts with
pub const AMOUNT_SCALE: i64 = 2;

const MAX_PAYEE_LEN: usize = 500;
const MAX_NOTES_LEN: usize = 2000;

/// Validate that an amount fits the ledger's minor currency unit
pub fn validate_amount(amount: &BigDecimal) -> ReconciliationResult<()> {
    let (_, scale) = amount.normalized().as_bigint_and_exponent();
    if scale > AMOUNT_SCALE {
        return Err(ReconciliationError::InvalidCandidate(format!(
            "Amount {} has more than {} fractional digits",
            amount, AMOUNT_SCALE
        )));
    }
    Ok(())
}

/// Validate that a payee is storable
pub fn validate_payee(payee: &str) -> ReconciliationResult<()> {
    if payee.chars().count() > MAX_PAYEE_LEN {
        return Err(ReconciliationError::InvalidCandidate(format!(
            "Payee cannot exceed {} characters",
            MAX_PAYEE_LEN
        )));
    }
    Ok(())
}

/// Validate that notes are storable
pub fn validate_notes(notes: Option<&str>) -> ReconciliationResult<()> {
    if notes.is_some_and(|notes| notes.chars().count() > MAX_NOTES_LEN) {
        return Err(ReconciliationError::InvalidCandidate(format!(
            "Notes cannot exceed {} characters",
            MAX_NOTES_LEN
        )));
    }
    Ok(())
}

/// Structural checks a candidate must pass before it touches the ledger
pub fn validate_candidate(candidate: &TransactionCandidate) -> ReconciliationResult<()> {
    validate_amount(&candidate.amount)?;
    validate_payee(&candidate.payee)?;
    validate_notes(candidate.notes.as_deref())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_amount_precision() {
        assert!(validate_amount(&BigDecimal::from_str("-42.50").unwrap()).is_ok());
        assert!(validate_amount(&BigDecimal::from_str("-42.500000").unwrap()).is_ok());
        assert!(validate_amount(&BigDecimal::from_str("1200").unwrap()).is_ok());
        assert!(validate_amount(&BigDecimal::from_str("0.001").unwrap()).is_err());
    }

    #[test]
    fn test_long_payee_is_rejected() {
        assert!(validate_payee(&"x".repeat(500)).is_ok());
        assert!(matches!(
            validate_payee(&"x".repeat(501)),
            Err(ReconciliationError::InvalidCandidate(_))
        ));
    }

    #[test]
    fn test_missing_notes_are_valid() {
        assert!(validate_notes(None).is_ok());
        assert!(validate_notes(Some("")).is_ok());
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How payees are compared when looking for a matching ledger entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayeeMatch {
    /// Payees must be byte-for-byte equal
    #[default]
    Exact,
    /// Payees are compared trimmed and case-insensitively
    Normalized,
    /// Payee does not restrict matching, it only ranks equally good matches
    Any,
}

impl PayeeMatch {
    pub fn accepts(&self, candidate: &str, existing: &str) -> bool {
        match self {
            PayeeMatch::Exact => candidate == existing,
            PayeeMatch::Normalized => normalize_payee(candidate) == normalize_payee(existing),
            PayeeMatch::Any => true,
        }
    }
}

impl FromStr for PayeeMatch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(PayeeMatch::Exact),
            "normalized" => Ok(PayeeMatch::Normalized),
            "any" => Ok(PayeeMatch::Any),
            other => Err(format!(
                "unknown payee match mode {other:?}, expected one of: exact, normalized, any"
            )),
        }
    }
}

impl fmt::Display for PayeeMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PayeeMatch::Exact => "exact",
            PayeeMatch::Normalized => "normalized",
            PayeeMatch::Any => "any",
        })
    }
}

pub(crate) fn normalize_payee(payee: &str) -> String {
    payee.trim().to_lowercase()
}

/// Criteria an existing entry must meet to match a candidate.
///
/// Amounts always have to be equal. The default is the strict baseline: same
/// date, same amount, same payee.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPolicy {
    /// Maximum distance in days between candidate and entry dates
    pub date_tolerance_days: u32,
    pub payee: PayeeMatch,
}

impl MatchPolicy {
    /// Exact date, exact amount, exact payee
    pub fn strict() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payee_comparison() {
        assert!(PayeeMatch::Exact.accepts("Market", "Market"));
        assert!(!PayeeMatch::Exact.accepts("Market", "market "));
        assert!(PayeeMatch::Normalized.accepts("Market", " market "));
        assert!(!PayeeMatch::Normalized.accepts("Market", "Supermarket"));
        assert!(PayeeMatch::Any.accepts("Market", "Bakery"));
    }

    #[test]
    fn test_parse_payee_match() {
        assert_eq!("exact".parse::<PayeeMatch>(), Ok(PayeeMatch::Exact));
        assert_eq!("Normalized".parse::<PayeeMatch>(), Ok(PayeeMatch::Normalized));
        assert_eq!(" any ".parse::<PayeeMatch>(), Ok(PayeeMatch::Any));
        assert!("fuzzy".parse::<PayeeMatch>().is_err());
    }

    #[test]
    fn test_default_policy_is_strict() {
        let policy = MatchPolicy::default();
        assert_eq!(policy.date_tolerance_days, 0);
        assert_eq!(policy.payee, PayeeMatch::Exact);
        assert_eq!(policy, MatchPolicy::strict());
    }
}

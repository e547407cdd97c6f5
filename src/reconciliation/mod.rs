//! Reconciliation of transaction candidates against existing ledger entries
//!
//! For every candidate the engine either binds it to exactly one existing,
//! not yet claimed entry of the account (enriching that entry's empty fields)
//! or creates a new entry. Both outcomes claim the entry for the rest of the
//! run, so two near-identical candidates never bind to the same entry.

mod claimed;
mod policy;

pub use claimed::{ClaimedSet, RunClaims};
pub use policy::{MatchPolicy, PayeeMatch};

use policy::normalize_payee;

use crate::ledger::LedgerSession;
use crate::traits::*;
use crate::types::*;
use crate::utils::validation::validate_candidate;

/// Whether a candidate was bound to an existing entry or created as a new one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Matched,
    Created,
}

/// Result of reconciling one candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    /// The ledger entry the candidate is now bound to, in its post-merge state
    pub entry: LedgerEntry,
    /// True if the entry was created or any of its fields were modified
    pub changed: bool,
    pub kind: MatchKind,
}

/// Match-or-create decision engine
#[derive(Debug, Clone, Default)]
pub struct ReconciliationEngine {
    policy: MatchPolicy,
}

impl ReconciliationEngine {
    /// Engine with the strict default policy
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: MatchPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &MatchPolicy {
        &self.policy
    }

    /// Reconcile one candidate into the given account.
    ///
    /// Entries in `claimed` are never considered. The resulting entry, whether
    /// matched or created, is added to `claimed`. Nothing is claimed if an error
    /// is returned.
    pub async fn reconcile<S: LedgerStorage>(
        &self,
        session: &mut LedgerSession<S>,
        candidate: &TransactionCandidate,
        account_id: &AccountId,
        claimed: &mut ClaimedSet,
    ) -> ReconciliationResult<Reconciled> {
        validate_candidate(candidate)?;

        let entries = session.entries(account_id).await?;
        let matched = self.find_match(entries, candidate, claimed).cloned();

        let reconciled = match matched {
            Some(mut entry) => {
                let changed = entry.enrich_from(candidate);
                if changed {
                    session.stage_update(entry.clone()).await?;
                }
                Reconciled {
                    entry,
                    changed,
                    kind: MatchKind::Matched,
                }
            }
            None => {
                let entry = LedgerEntry::from_candidate(candidate, account_id.clone());
                session.stage_new_entry(entry.clone()).await?;
                Reconciled {
                    entry,
                    changed: true,
                    kind: MatchKind::Created,
                }
            }
        };

        claimed.claim(reconciled.entry.id.clone());
        Ok(reconciled)
    }

    /// Best unclaimed entry qualifying as a match for the candidate.
    ///
    /// Ranking: equal payee first, then closest date, then ledger order.
    pub fn find_match<'a>(
        &self,
        entries: &'a [LedgerEntry],
        candidate: &TransactionCandidate,
        claimed: &ClaimedSet,
    ) -> Option<&'a LedgerEntry> {
        let candidate_payee = normalize_payee(&candidate.payee);
        entries
            .iter()
            .filter(|entry| !claimed.contains(&entry.id))
            .filter(|entry| entry.amount == candidate.amount)
            .filter(|entry| {
                day_distance(entry, candidate) <= u64::from(self.policy.date_tolerance_days)
            })
            .filter(|entry| self.policy.payee.accepts(&candidate.payee, &entry.payee))
            .min_by(|a, b| {
                let rank = |entry: &LedgerEntry| {
                    (
                        normalize_payee(&entry.payee) != candidate_payee,
                        day_distance(entry, candidate),
                    )
                };
                rank(a)
                    .cmp(&rank(b))
                    .then_with(|| (a.date, &a.id).cmp(&(b.date, &b.id)))
            })
    }
}

fn day_distance(entry: &LedgerEntry, candidate: &TransactionCandidate) -> u64 {
    (entry.date - candidate.date).num_days().unsigned_abs()
}

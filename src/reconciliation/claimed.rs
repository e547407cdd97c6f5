use std::collections::{HashMap, HashSet};

use crate::types::{AccountId, EntryId};

/// Ledger entries of one account already bound to a candidate during the current run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimedSet {
    claimed: HashSet<EntryId>,
}

impl ClaimedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an entry as bound. Returns false if it already was.
    pub fn claim(&mut self, id: EntryId) -> bool {
        self.claimed.insert(id)
    }

    pub fn contains(&self, id: &EntryId) -> bool {
        self.claimed.contains(id)
    }

    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }
}

/// One [`ClaimedSet`] per account, owned by the run driver for a single run
#[derive(Debug, Default)]
pub struct RunClaims {
    by_account: HashMap<AccountId, ClaimedSet>,
}

impl RunClaims {
    pub fn new() -> Self {
        Self::default()
    }

    /// The claimed set of an account, starting empty the first time the account is seen
    pub fn for_account(&mut self, account_id: &AccountId) -> &mut ClaimedSet {
        self.by_account.entry(account_id.clone()).or_default()
    }
}

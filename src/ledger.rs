//! Add/Delete delta ledger.
//!
//! Change orders encode modifications as line items tagged `Add` or
//! `Delete`. The ledger is the one place that turns those tags into
//! arithmetic, so the double-counting rules live here and nowhere else:
//!
//! - An `Add` increases the aggregate and registers the item's identity.
//! - A `Delete` decreases the aggregate only when the identity is known
//!   (baseline or previously added); unknown identities are a no-op.
//! - Add then Delete of the same identity and amount round-trips to zero.

use std::collections::HashSet;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// Direction of a change-order line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaAction {
    /// The line item adds to the baseline.
    Add,
    /// The line item removes a pre-existing baseline item.
    Delete,
}

impl DeltaAction {
    /// Applies this action's sign to an amount.
    #[must_use]
    pub const fn signed(self, amount: i64) -> i64 {
        match self {
            Self::Add => amount,
            Self::Delete => -amount,
        }
    }
}

/// Running aggregate over a baseline plus Add/Delete deltas, keyed by item
/// identity.
#[derive(Debug, Clone, Default)]
pub struct DeltaLedger<K: Eq + Hash> {
    baseline_total: i64,
    delta: i64,
    known: HashSet<K>,
}

impl<K: Eq + Hash> DeltaLedger<K> {
    /// Creates an empty ledger with no baseline.
    #[must_use]
    pub fn new() -> Self {
        Self {
            baseline_total: 0,
            delta: 0,
            known: HashSet::new(),
        }
    }

    /// Creates a ledger seeded with baseline items.
    pub fn with_baseline(items: impl IntoIterator<Item = (K, i64)>) -> Self {
        let mut baseline_total = 0;
        let mut known = HashSet::new();
        for (id, amount) in items {
            baseline_total += amount;
            known.insert(id);
        }
        Self {
            baseline_total,
            delta: 0,
            known,
        }
    }

    /// Applies one tagged line item.
    ///
    /// Deletes of identities the ledger has never seen are tolerated as
    /// no-ops rather than errors.
    pub fn apply(&mut self, id: K, action: DeltaAction, amount: i64) {
        match action {
            DeltaAction::Add => {
                self.delta += amount;
                self.known.insert(id);
            }
            DeltaAction::Delete => {
                if self.known.remove(&id) {
                    self.delta -= amount;
                }
            }
        }
    }

    /// Baseline plus applied deltas.
    #[must_use]
    pub const fn total(&self) -> i64 {
        self.baseline_total + self.delta
    }

    /// Net contribution of the applied deltas alone.
    #[must_use]
    pub const fn delta(&self) -> i64 {
        self.delta
    }
}

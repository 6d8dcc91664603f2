use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::ResourceKind;

/// Resource amounts keyed by kind, always holding all four kinds.
pub type ResourceAmounts = BTreeMap<ResourceKind, u64>;

pub fn zeroed() -> ResourceAmounts {
    ResourceKind::ALL.iter().map(|kind| (*kind, 0)).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLedger {
    amounts: ResourceAmounts,
}

impl ResourceLedger {
    /// Kinds missing from `starting` begin at zero.
    pub fn new(starting: &ResourceAmounts) -> Self {
        let mut amounts = zeroed();
        for (kind, amount) in starting {
            amounts.insert(*kind, *amount);
        }
        Self { amounts }
    }

    pub fn amount(&self, kind: ResourceKind) -> u64 {
        self.amounts.get(&kind).copied().unwrap_or(0)
    }

    pub fn amounts(&self) -> &ResourceAmounts {
        &self.amounts
    }

    pub fn can_afford(&self, cost: &[(ResourceKind, u64)]) -> bool {
        cost.iter()
            .all(|(kind, amount)| self.amount(*kind) >= *amount)
    }

    /// Callers check [`can_afford`](Self::can_afford) with the same vector first.
    pub fn debit(&mut self, cost: &[(ResourceKind, u64)]) {
        debug_assert!(self.can_afford(cost), "debit without affordability check");
        for (kind, amount) in cost {
            let entry = self.amounts.entry(*kind).or_insert(0);
            *entry = entry.saturating_sub(*amount);
        }
    }

    pub fn credit<I>(&mut self, gains: I)
    where
        I: IntoIterator<Item = (ResourceKind, u64)>,
    {
        for (kind, amount) in gains {
            *self.amounts.entry(kind).or_insert(0) += amount;
        }
    }
}

use std::collections::BTreeMap;

use serde::Serialize;

use crate::catalog::{WorkerType, WORKER_COST};
use crate::grid::BuildingGrid;
use crate::ledger::ResourceLedger;

/// Hired head-counts per worker type.
///
/// Only the hired count is stored. Assignment lives on the buildings, so the
/// assigned and available counts are recomputed from the grid on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerPool {
    hired: BTreeMap<WorkerType, u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorkerCounts {
    pub hired: u32,
    pub assigned: u32,
    pub available: u32,
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkerPool {
    pub fn new() -> Self {
        Self {
            hired: WorkerType::ALL.iter().map(|worker| (*worker, 0)).collect(),
        }
    }

    pub fn hired_count(&self, worker: WorkerType) -> u32 {
        self.hired.get(&worker).copied().unwrap_or(0)
    }

    pub fn assigned_count(&self, worker: WorkerType, grid: &BuildingGrid) -> u32 {
        grid.assigned_workers(worker)
    }

    pub fn available(&self, worker: WorkerType, grid: &BuildingGrid) -> u32 {
        self.hired_count(worker)
            .saturating_sub(self.assigned_count(worker, grid))
    }

    pub fn counts(&self, worker: WorkerType, grid: &BuildingGrid) -> WorkerCounts {
        let hired = self.hired_count(worker);
        let assigned = self.assigned_count(worker, grid);
        WorkerCounts {
            hired,
            assigned,
            available: hired.saturating_sub(assigned),
        }
    }

    /// Pays [`WORKER_COST`] and adds one hire. Returns `false` without side
    /// effects when the ledger cannot cover the cost.
    pub fn hire(&mut self, worker: WorkerType, ledger: &mut ResourceLedger) -> bool {
        if !ledger.can_afford(WORKER_COST) {
            return false;
        }
        ledger.debit(WORKER_COST);
        self.add_hired(worker, 1);
        true
    }

    /// Hires granted without payment, e.g. the crew that comes with a new building.
    pub(crate) fn add_hired(&mut self, worker: WorkerType, count: u32) {
        *self.hired.entry(worker).or_insert(0) += count;
    }
}

use std::collections::BTreeMap;

use serde::Serialize;

use crate::catalog::{BuildingSpec, BuildingType, WorkerType};
use crate::grid::Building;
use crate::ledger::ResourceAmounts;
use crate::workers::WorkerCounts;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CellView {
    pub index: usize,
    pub occupied: bool,
    pub building: Option<BuildingType>,
    pub workers: u32,
}

impl CellView {
    pub fn new(index: usize, cell: Option<&Building>) -> Self {
        Self {
            index,
            occupied: cell.is_some(),
            building: cell.map(|b| b.building),
            workers: cell.map(|b| b.workers).unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildOption {
    pub building: BuildingType,
    pub label: &'static str,
    pub cost: ResourceAmounts,
    pub affordable: bool,
}

impl BuildOption {
    pub fn new(spec: &BuildingSpec, affordable: bool) -> Self {
        Self {
            building: spec.building,
            label: spec.label,
            cost: spec.cost.iter().copied().collect(),
            affordable,
        }
    }
}

/// Read-only view handed to presentation layers once per frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationSnapshot {
    pub name: String,
    pub resources: ResourceAmounts,
    pub grid: Vec<CellView>,
    pub workers: BTreeMap<WorkerType, WorkerCounts>,
    pub time_until_next_cycle_ms: u64,
    pub selected_index: Option<usize>,
    pub production_per_cycle: ResourceAmounts,
    pub cycles_completed: u64,
    pub build_options: Vec<BuildOption>,
    pub can_hire: bool,
}

impl SimulationSnapshot {
    pub fn cell(&self, index: usize) -> Option<&CellView> {
        self.grid.get(index)
    }

    pub fn occupied_cells(&self) -> usize {
        self.grid.iter().filter(|cell| cell.occupied).count()
    }
}

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::catalog::{
    BuildingSpec, BuildingType, WorkerType, GRID_CELLS, GRID_SIZE, MAX_WORKERS_PER_BUILDING,
};
use crate::error::{SimError, SimResult};
use crate::ledger::{zeroed, ResourceAmounts, ResourceLedger};
use crate::workers::WorkerPool;

/// How a freshly placed building is staffed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementPolicy {
    /// One worker comes with the building and joins the hired pool for free.
    #[default]
    Staffed,
    /// The building starts empty and must be staffed by hiring.
    Unstaffed,
}

impl PlacementPolicy {
    pub fn initial_workers(self) -> u32 {
        match self {
            PlacementPolicy::Staffed => 1,
            PlacementPolicy::Unstaffed => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    pub building: BuildingType,
    pub workers: u32,
}

impl Building {
    pub fn spec(&self) -> &'static BuildingSpec {
        self.building.spec()
    }

    pub fn worker_type(&self) -> WorkerType {
        self.spec().worker_type
    }

    pub fn is_full(&self) -> bool {
        self.workers >= MAX_WORKERS_PER_BUILDING
    }

    pub fn output(&self) -> u64 {
        u64::from(self.workers) * self.spec().output_per_worker
    }
}

/// Row-major `GRID_SIZE × GRID_SIZE` cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildingGrid {
    cells: Vec<Option<Building>>,
}

impl Default for BuildingGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl BuildingGrid {
    pub fn new() -> Self {
        Self {
            cells: vec![None; GRID_CELLS],
        }
    }

    pub fn index_of(row: usize, col: usize) -> usize {
        row * GRID_SIZE + col
    }

    pub fn check_index(index: usize) -> SimResult<()> {
        if index < GRID_CELLS {
            Ok(())
        } else {
            Err(SimError::IndexOutOfRange {
                index,
                cells: GRID_CELLS,
            })
        }
    }

    pub fn cells(&self) -> &[Option<Building>] {
        &self.cells
    }

    pub fn get(&self, index: usize) -> SimResult<Option<&Building>> {
        Self::check_index(index)?;
        Ok(self.cells[index].as_ref())
    }

    pub fn buildings(&self) -> impl Iterator<Item = &Building> {
        self.cells.iter().flatten()
    }

    pub fn assigned_workers(&self, worker: WorkerType) -> u32 {
        self.buildings()
            .filter(|building| building.worker_type() == worker)
            .map(|building| building.workers)
            .sum()
    }

    /// What one production cycle would yield, all kinds present.
    pub fn production_totals(&self) -> ResourceAmounts {
        let mut totals = zeroed();
        for building in self.buildings() {
            *totals.entry(building.spec().output_resource).or_insert(0) += building.output();
        }
        totals
    }

    pub fn place(
        &mut self,
        index: usize,
        building: BuildingType,
        ledger: &mut ResourceLedger,
        pool: &mut WorkerPool,
        policy: PlacementPolicy,
    ) -> SimResult<Building> {
        Self::check_index(index)?;
        if self.cells[index].is_some() {
            return Err(SimError::CellOccupied { index });
        }
        let spec = building.spec();
        if !ledger.can_afford(spec.cost) {
            return Err(SimError::InsufficientResources);
        }

        ledger.debit(spec.cost);
        let placed = Building {
            building,
            workers: policy.initial_workers(),
        };
        pool.add_hired(spec.worker_type, placed.workers);
        self.cells[index] = Some(placed);
        Ok(placed)
    }

    /// Moves workers between the building and the available pool of its type.
    /// Returns the building's new worker count.
    pub fn adjust_workers(&mut self, index: usize, delta: i32, pool: &WorkerPool) -> SimResult<u32> {
        let current = self.occupied(index)?;
        let next = match delta.cmp(&0) {
            Ordering::Equal => return Ok(current.workers),
            Ordering::Greater => {
                let available = pool.available(current.worker_type(), self);
                if available == 0 {
                    return Err(SimError::NoAvailableWorkers(current.worker_type()));
                }
                let step = delta.unsigned_abs().min(available);
                (current.workers + step).min(MAX_WORKERS_PER_BUILDING)
            }
            Ordering::Less => {
                if current.workers == 0 {
                    return Err(SimError::NoWorkersAssigned { index });
                }
                current.workers.saturating_sub(delta.unsigned_abs())
            }
        };
        self.set_workers(index, next);
        Ok(next)
    }

    /// Hires one worker of the building's type and stations them there.
    /// A full building is rejected before anything is paid.
    pub fn hire_and_assign(
        &mut self,
        index: usize,
        ledger: &mut ResourceLedger,
        pool: &mut WorkerPool,
    ) -> SimResult<u32> {
        let current = self.occupied(index)?;
        if current.is_full() {
            return Err(SimError::WorkerCapReached { index });
        }
        if !pool.hire(current.worker_type(), ledger) {
            return Err(SimError::InsufficientResources);
        }
        let next = current.workers + 1;
        self.set_workers(index, next);
        Ok(next)
    }

    fn occupied(&self, index: usize) -> SimResult<Building> {
        self.get(index)?
            .copied()
            .ok_or(SimError::EmptyCell { index })
    }

    fn set_workers(&mut self, index: usize, workers: u32) {
        if let Some(building) = self.cells[index].as_mut() {
            building.workers = workers;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ResourceKind;

    fn rich_ledger() -> ResourceLedger {
        ResourceLedger::new(&ResourceAmounts::from([
            (ResourceKind::Wood, 1_000),
            (ResourceKind::Stone, 1_000),
            (ResourceKind::Wheat, 1_000),
            (ResourceKind::Gold, 1_000),
        ]))
    }

    fn grid_with_farm(policy: PlacementPolicy) -> (BuildingGrid, ResourceLedger, WorkerPool) {
        let mut grid = BuildingGrid::new();
        let mut ledger = rich_ledger();
        let mut pool = WorkerPool::new();
        grid.place(0, BuildingType::Farm, &mut ledger, &mut pool, policy)
            .unwrap();
        (grid, ledger, pool)
    }

    #[test]
    fn index_arithmetic_is_row_major() {
        assert_eq!(BuildingGrid::index_of(0, 0), 0);
        assert_eq!(BuildingGrid::index_of(1, 0), GRID_SIZE);
        assert_eq!(BuildingGrid::index_of(7, 7), GRID_CELLS - 1);
        assert!(BuildingGrid::check_index(GRID_CELLS).is_err());
    }

    #[test]
    fn staffed_placement_hires_the_first_worker() {
        let (grid, ledger, pool) = grid_with_farm(PlacementPolicy::Staffed);
        assert_eq!(grid.get(0).unwrap().map(|b| b.workers), Some(1));
        assert_eq!(pool.hired_count(WorkerType::Farmer), 1);
        assert_eq!(pool.available(WorkerType::Farmer, &grid), 0);
        assert_eq!(ledger.amount(ResourceKind::Wood), 970);
        assert_eq!(ledger.amount(ResourceKind::Stone), 980);
    }

    #[test]
    fn unstaffed_placement_leaves_pool_alone() {
        let (grid, _, pool) = grid_with_farm(PlacementPolicy::Unstaffed);
        assert_eq!(grid.get(0).unwrap().map(|b| b.workers), Some(0));
        assert_eq!(pool.hired_count(WorkerType::Farmer), 0);
    }

    #[test]
    fn place_rejects_out_of_range_before_anything_else() {
        let mut grid = BuildingGrid::new();
        let mut ledger = ResourceLedger::new(&ResourceAmounts::new());
        let mut pool = WorkerPool::new();
        let err = grid
            .place(64, BuildingType::Farm, &mut ledger, &mut pool, PlacementPolicy::Staffed)
            .unwrap_err();
        assert_eq!(err, SimError::IndexOutOfRange { index: 64, cells: 64 });
    }

    #[test]
    fn occupied_check_precedes_affordability() {
        let (mut grid, _, mut pool) = grid_with_farm(PlacementPolicy::Staffed);
        let mut broke = ResourceLedger::new(&ResourceAmounts::new());
        let err = grid
            .place(0, BuildingType::Mine, &mut broke, &mut pool, PlacementPolicy::Staffed)
            .unwrap_err();
        assert_eq!(err, SimError::CellOccupied { index: 0 });
    }

    #[test]
    fn adjust_moves_workers_without_touching_hires() {
        let (mut grid, mut ledger, mut pool) = grid_with_farm(PlacementPolicy::Staffed);
        assert_eq!(grid.adjust_workers(0, -1, &pool), Ok(0));
        assert_eq!(pool.available(WorkerType::Farmer, &grid), 1);
        assert_eq!(
            grid.adjust_workers(0, -1, &pool),
            Err(SimError::NoWorkersAssigned { index: 0 })
        );
        assert_eq!(grid.adjust_workers(0, 1, &pool), Ok(1));
        assert_eq!(
            grid.adjust_workers(0, 1, &pool),
            Err(SimError::NoAvailableWorkers(WorkerType::Farmer))
        );

        assert!(pool.hire(WorkerType::Farmer, &mut ledger));
        assert_eq!(grid.adjust_workers(0, 1, &pool), Ok(2));
        assert_eq!(pool.hired_count(WorkerType::Farmer), 2);
    }

    #[test]
    fn adjust_increase_is_bounded_by_availability() {
        let (mut grid, _, mut pool) = grid_with_farm(PlacementPolicy::Unstaffed);
        pool.add_hired(WorkerType::Farmer, 2);
        assert_eq!(grid.adjust_workers(0, 3, &pool), Ok(2));
        assert_eq!(pool.available(WorkerType::Farmer, &grid), 0);
    }

    #[test]
    fn adjust_at_the_cap_keeps_spare_workers_in_the_pool() {
        let (mut grid, _, mut pool) = grid_with_farm(PlacementPolicy::Unstaffed);
        pool.add_hired(WorkerType::Farmer, MAX_WORKERS_PER_BUILDING + 1);
        assert_eq!(
            grid.adjust_workers(0, 10, &pool),
            Ok(MAX_WORKERS_PER_BUILDING)
        );
        assert_eq!(
            grid.adjust_workers(0, 1, &pool),
            Ok(MAX_WORKERS_PER_BUILDING)
        );
        assert_eq!(pool.available(WorkerType::Farmer, &grid), 1);
    }

    #[test]
    fn adjust_on_empty_cell_fails() {
        let mut grid = BuildingGrid::new();
        let pool = WorkerPool::new();
        assert_eq!(
            grid.adjust_workers(5, 1, &pool),
            Err(SimError::EmptyCell { index: 5 })
        );
    }

    #[test]
    fn workers_of_other_types_are_not_available() {
        let (mut grid, _, mut pool) = grid_with_farm(PlacementPolicy::Unstaffed);
        pool.add_hired(WorkerType::Miner, 4);
        assert_eq!(
            grid.adjust_workers(0, 1, &pool),
            Err(SimError::NoAvailableWorkers(WorkerType::Farmer))
        );
    }

    #[test]
    fn hire_and_assign_stops_at_the_cap() {
        let (mut grid, mut ledger, mut pool) = grid_with_farm(PlacementPolicy::Staffed);
        for expected in 2..=MAX_WORKERS_PER_BUILDING {
            assert_eq!(grid.hire_and_assign(0, &mut ledger, &mut pool), Ok(expected));
        }
        let before = (ledger.clone(), pool.clone());
        assert_eq!(
            grid.hire_and_assign(0, &mut ledger, &mut pool),
            Err(SimError::WorkerCapReached { index: 0 })
        );
        assert_eq!((ledger, pool), before);
    }

    #[test]
    fn production_groups_by_output_resource() {
        let mut grid = BuildingGrid::new();
        let mut ledger = rich_ledger();
        let mut pool = WorkerPool::new();
        let policy = PlacementPolicy::Staffed;
        grid.place(0, BuildingType::Farm, &mut ledger, &mut pool, policy).unwrap();
        grid.place(1, BuildingType::Farm, &mut ledger, &mut pool, policy).unwrap();
        grid.place(9, BuildingType::Mine, &mut ledger, &mut pool, policy).unwrap();
        grid.hire_and_assign(9, &mut ledger, &mut pool).unwrap();

        let totals = grid.production_totals();
        assert_eq!(totals[&ResourceKind::Wheat], 10);
        assert_eq!(totals[&ResourceKind::Gold], 10);
        assert_eq!(totals[&ResourceKind::Wood], 0);
        assert_eq!(totals[&ResourceKind::Stone], 0);
    }
}

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::catalog::{self, BuildingType, WorkerType, WORKER_COST};
use crate::clock::{Clock, SystemClock};
use crate::config::SimulationConfig;
use crate::error::{SimError, SimResult};
use crate::grid::{Building, BuildingGrid, PlacementPolicy};
use crate::ledger::{ResourceAmounts, ResourceLedger};
use crate::scheduler::{CycleReport, ProductionScheduler};
use crate::snapshot::{BuildOption, CellView, SimulationSnapshot};
use crate::workers::{WorkerCounts, WorkerPool};

/// One self-contained simulation: ledger, grid, hired workers, cycle timer
/// and the UI selection.
///
/// Every mutation either applies completely or returns an error with the
/// state left as it was.
pub struct SimulationState {
    name: String,
    placement: PlacementPolicy,
    ledger: ResourceLedger,
    grid: BuildingGrid,
    workers: WorkerPool,
    scheduler: ProductionScheduler,
    selected: Option<usize>,
    clock: Arc<dyn Clock>,
}

impl SimulationState {
    pub fn new(config: &SimulationConfig, clock: Arc<dyn Clock>) -> Self {
        let scheduler = ProductionScheduler::new(clock.now_ms());
        Self {
            name: config.name.clone(),
            placement: config.placement,
            ledger: ResourceLedger::new(&config.starting_resources),
            grid: BuildingGrid::new(),
            workers: WorkerPool::new(),
            scheduler,
            selected: None,
            clock,
        }
    }

    pub fn with_system_clock(config: &SimulationConfig) -> Self {
        Self::new(config, Arc::new(SystemClock::new()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn placement(&self) -> PlacementPolicy {
        self.placement
    }

    pub fn ledger(&self) -> &ResourceLedger {
        &self.ledger
    }

    pub fn grid(&self) -> &BuildingGrid {
        &self.grid
    }

    pub fn worker_pool(&self) -> &WorkerPool {
        &self.workers
    }

    pub fn scheduler(&self) -> &ProductionScheduler {
        &self.scheduler
    }

    // Mutations

    pub fn place_building(&mut self, index: usize, building: BuildingType) -> SimResult<Building> {
        let result = self.grid.place(
            index,
            building,
            &mut self.ledger,
            &mut self.workers,
            self.placement,
        );
        log_outcome("place_building", index, &result);
        result
    }

    /// String-keyed placement for callers holding an untyped building key.
    pub fn place_building_key(&mut self, index: usize, key: &str) -> SimResult<Building> {
        let building = catalog::lookup(key)?.building;
        self.place_building(index, building)
    }

    pub fn adjust_workers(&mut self, index: usize, delta: i32) -> SimResult<u32> {
        let result = self.grid.adjust_workers(index, delta, &self.workers);
        log_outcome("adjust_workers", index, &result);
        result
    }

    pub fn hire_worker(&mut self, worker: WorkerType) -> SimResult<u32> {
        if !self.workers.hire(worker, &mut self.ledger) {
            tracing::debug!(%worker, "hire_worker rejected: not enough resources");
            return Err(SimError::InsufficientResources);
        }
        let hired = self.workers.hired_count(worker);
        tracing::debug!(%worker, hired, "hire_worker applied");
        Ok(hired)
    }

    pub fn hire_and_assign(&mut self, index: usize) -> SimResult<u32> {
        let result = self
            .grid
            .hire_and_assign(index, &mut self.ledger, &mut self.workers);
        log_outcome("hire_and_assign", index, &result);
        result
    }

    pub fn select_cell(&mut self, index: Option<usize>) -> SimResult<()> {
        if let Some(index) = index {
            BuildingGrid::check_index(index)?;
        }
        self.selected = index;
        Ok(())
    }

    /// Click behaviour: selecting the selected cell clears the selection.
    pub fn toggle_cell(&mut self, index: usize) -> SimResult<Option<usize>> {
        BuildingGrid::check_index(index)?;
        self.selected = if self.selected == Some(index) {
            None
        } else {
            Some(index)
        };
        Ok(self.selected)
    }

    pub fn build_on_selected(&mut self, building: BuildingType) -> SimResult<Building> {
        let index = self.require_selection()?;
        self.place_building(index, building)
    }

    pub fn adjust_selected(&mut self, delta: i32) -> SimResult<u32> {
        let index = self.require_selection()?;
        self.adjust_workers(index, delta)
    }

    pub fn hire_and_assign_selected(&mut self) -> SimResult<u32> {
        let index = self.require_selection()?;
        self.hire_and_assign(index)
    }

    /// Runs the production cycle if its deadline has passed on the clock.
    pub fn tick_if_due(&mut self) -> Option<CycleReport> {
        let now = self.clock.now_ms();
        self.scheduler.tick_if_due(now, &self.grid, &mut self.ledger)
    }

    pub fn stop(&mut self) {
        self.scheduler.stop();
    }

    // Queries

    pub fn resources(&self) -> ResourceAmounts {
        self.ledger.amounts().clone()
    }

    pub fn grid_cells(&self) -> Vec<CellView> {
        self.grid
            .cells()
            .iter()
            .enumerate()
            .map(|(index, cell)| CellView::new(index, cell.as_ref()))
            .collect()
    }

    pub fn workers(&self) -> BTreeMap<WorkerType, WorkerCounts> {
        WorkerType::ALL
            .iter()
            .map(|worker| (*worker, self.workers.counts(*worker, &self.grid)))
            .collect()
    }

    pub fn available_workers(&self, worker: WorkerType) -> u32 {
        self.workers.available(worker, &self.grid)
    }

    pub fn time_until_next_cycle_ms(&self) -> u64 {
        self.scheduler
            .time_until_next_cycle_ms(self.clock.now_ms())
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_building(&self) -> Option<&Building> {
        self.selected
            .and_then(|index| self.grid.cells().get(index))
            .and_then(Option::as_ref)
    }

    pub fn production_per_cycle(&self) -> ResourceAmounts {
        self.grid.production_totals()
    }

    pub fn can_afford_building(&self, building: BuildingType) -> bool {
        self.ledger.can_afford(building.spec().cost)
    }

    pub fn can_hire(&self) -> bool {
        self.ledger.can_afford(WORKER_COST)
    }

    pub fn build_options(&self) -> Vec<BuildOption> {
        catalog::all()
            .iter()
            .map(|spec| BuildOption::new(spec, self.ledger.can_afford(spec.cost)))
            .collect()
    }

    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            name: self.name.clone(),
            resources: self.resources(),
            grid: self.grid_cells(),
            workers: self.workers(),
            time_until_next_cycle_ms: self.time_until_next_cycle_ms(),
            selected_index: self.selected,
            production_per_cycle: self.production_per_cycle(),
            cycles_completed: self.scheduler.cycles_completed(),
            build_options: self.build_options(),
            can_hire: self.can_hire(),
        }
    }

    fn require_selection(&self) -> SimResult<usize> {
        self.selected.ok_or(SimError::NothingSelected)
    }
}

fn log_outcome<T: std::fmt::Debug>(operation: &str, index: usize, result: &SimResult<T>) {
    match result {
        Ok(value) => tracing::debug!(operation, index, ?value, "mutation applied"),
        Err(err) => tracing::debug!(operation, index, %err, "mutation rejected"),
    }
}

use serde::{Deserialize, Serialize};

use crate::catalog::{BuildingType, WorkerType};
use crate::error::SimResult;
use crate::state::SimulationState;

/// A mutation request in serializable form, as sent by presentation layers
/// and session scripts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    PlaceBuilding { index: usize, building: BuildingType },
    AdjustWorkers { index: usize, delta: i32 },
    HireWorker { worker: WorkerType },
    HireAndAssign { index: usize },
    SelectCell { index: Option<usize> },
    ToggleCell { index: usize },
    BuildOnSelected { building: BuildingType },
    AdjustSelected { delta: i32 },
    HireAndAssignSelected,
}

impl SimulationState {
    pub fn apply(&mut self, action: &Action) -> SimResult<()> {
        match action {
            Action::PlaceBuilding { index, building } => {
                self.place_building(*index, *building).map(drop)
            }
            Action::AdjustWorkers { index, delta } => self.adjust_workers(*index, *delta).map(drop),
            Action::HireWorker { worker } => self.hire_worker(*worker).map(drop),
            Action::HireAndAssign { index } => self.hire_and_assign(*index).map(drop),
            Action::SelectCell { index } => self.select_cell(*index),
            Action::ToggleCell { index } => self.toggle_cell(*index).map(drop),
            Action::BuildOnSelected { building } => self.build_on_selected(*building).map(drop),
            Action::AdjustSelected { delta } => self.adjust_selected(*delta).map(drop),
            Action::HireAndAssignSelected => self.hire_and_assign_selected().map(drop),
        }
    }
}

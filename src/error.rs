use thiserror::Error;

use crate::catalog::WorkerType;

/// Rejections from the simulation's mutation API.
///
/// Every variant is a precondition violation: the operation that produced it
/// left the state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    #[error("cell index {index} is outside the {cells}-cell grid")]
    IndexOutOfRange { index: usize, cells: usize },
    #[error("cell {index} already holds a building")]
    CellOccupied { index: usize },
    #[error("cell {index} has no building")]
    EmptyCell { index: usize },
    #[error("not enough resources")]
    InsufficientResources,
    #[error("no unassigned {0} available")]
    NoAvailableWorkers(WorkerType),
    #[error("building at cell {index} has no workers assigned")]
    NoWorkersAssigned { index: usize },
    #[error("unknown building type '{0}'")]
    UnknownBuildingType(String),
    #[error("building at cell {index} is fully staffed")]
    WorkerCapReached { index: usize },
    #[error("no cell is selected")]
    NothingSelected,
}

pub type SimResult<T> = Result<T, SimError>;

//! Shared access to one simulation and the async production-cycle driver.
//!
//! Ticks, mutations and queries all go through the same mutex, so a cycle
//! never interleaves with a player action.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::broadcast;

use crate::action::Action;
use crate::error::SimResult;
use crate::scheduler::{CycleReport, SchedulerState};
use crate::snapshot::SimulationSnapshot;
use crate::state::SimulationState;

const UPDATE_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UpdateCause {
    Cycle { report: CycleReport },
    Action { action: Action },
}

/// Pushed to subscribers after every tick and every applied action.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationUpdate {
    pub cause: UpdateCause,
    pub snapshot: SimulationSnapshot,
}

#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub result: SimResult<()>,
    pub snapshot: SimulationSnapshot,
}

#[derive(Clone)]
pub struct SharedSimulation {
    inner: Arc<Mutex<SimulationState>>,
    updates: broadcast::Sender<SimulationUpdate>,
}

impl SharedSimulation {
    pub fn new(state: SimulationState) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Mutex::new(state)),
            updates,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SimulationState> {
        // Every operation leaves the state consistent before returning, so a
        // poisoned guard still holds valid data.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SimulationUpdate> {
        self.updates.subscribe()
    }

    pub fn with<R>(&self, f: impl FnOnce(&SimulationState) -> R) -> R {
        f(&self.lock())
    }

    pub fn with_mut<R>(&self, f: impl FnOnce(&mut SimulationState) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn snapshot(&self) -> SimulationSnapshot {
        self.lock().snapshot()
    }

    /// Applies `action` and returns the resulting snapshot, which is the
    /// unchanged prior state when the action is rejected.
    pub fn apply(&self, action: Action) -> ActionOutcome {
        let (result, snapshot) = {
            let mut state = self.lock();
            let result = state.apply(&action);
            (result, state.snapshot())
        };
        if result.is_ok() {
            let _ = self.updates.send(SimulationUpdate {
                cause: UpdateCause::Action { action },
                snapshot: snapshot.clone(),
            });
        }
        ActionOutcome { result, snapshot }
    }

    pub fn tick_if_due(&self) -> Option<CycleReport> {
        let (report, snapshot) = {
            let mut state = self.lock();
            let report = state.tick_if_due()?;
            (report, state.snapshot())
        };
        let _ = self.updates.send(SimulationUpdate {
            cause: UpdateCause::Cycle {
                report: report.clone(),
            },
            snapshot,
        });
        Some(report)
    }

    pub fn time_until_next_cycle(&self) -> Duration {
        Duration::from_millis(self.lock().time_until_next_cycle_ms())
    }

    pub fn is_stopped(&self) -> bool {
        self.lock().scheduler().state() == SchedulerState::Stopped
    }

    pub fn stop(&self) {
        self.lock().stop();
    }
}

/// Drives production cycles until `shutdown` resolves, then stops the
/// scheduler.
pub async fn run_cycles<F>(simulation: SharedSimulation, shutdown: F)
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    tracing::info!("cycle driver started");
    while !simulation.is_stopped() {
        let wait = simulation.time_until_next_cycle();
        tokio::select! {
            _ = &mut shutdown => {
                simulation.stop();
            }
            _ = tokio::time::sleep(wait) => {
                simulation.tick_if_due();
            }
        }
    }
    tracing::info!("cycle driver finished");
}

//! Production scheduler - credits grid output to the ledger once per cycle

use std::collections::VecDeque;

use serde::Serialize;

use crate::catalog::CYCLE_MS;
use crate::grid::BuildingGrid;
use crate::ledger::{ResourceAmounts, ResourceLedger};

const MAX_REPORT_HISTORY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerState {
    /// Waiting for the deadline.
    Idle,
    /// Torn down; never ticks again.
    Stopped,
}

/// Outcome of a single production cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub cycle: u64,
    pub produced: ResourceAmounts,
    pub executed_at_ms: u64,
    pub next_cycle_at_ms: u64,
}

#[derive(Debug, Clone)]
pub struct ProductionScheduler {
    state: SchedulerState,
    next_cycle_at: u64,
    cycles_completed: u64,
    history: VecDeque<CycleReport>,
}

impl ProductionScheduler {
    /// First deadline is one period after `now_ms`.
    pub fn new(now_ms: u64) -> Self {
        Self {
            state: SchedulerState::Idle,
            next_cycle_at: now_ms.saturating_add(CYCLE_MS),
            cycles_completed: 0,
            history: VecDeque::new(),
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn next_cycle_at(&self) -> u64 {
        self.next_cycle_at
    }

    pub fn cycles_completed(&self) -> u64 {
        self.cycles_completed
    }

    pub fn is_due(&self, now_ms: u64) -> bool {
        self.state == SchedulerState::Idle && now_ms >= self.next_cycle_at
    }

    pub fn time_until_next_cycle_ms(&self, now_ms: u64) -> u64 {
        match self.state {
            SchedulerState::Idle => self.next_cycle_at.saturating_sub(now_ms),
            SchedulerState::Stopped => 0,
        }
    }

    /// Runs one cycle when the deadline has passed.
    ///
    /// A late tick still schedules the next deadline one period after `now_ms`;
    /// missed cycles are not replayed.
    pub fn tick_if_due(
        &mut self,
        now_ms: u64,
        grid: &BuildingGrid,
        ledger: &mut ResourceLedger,
    ) -> Option<CycleReport> {
        if !self.is_due(now_ms) {
            return None;
        }

        let produced = grid.production_totals();
        ledger.credit(produced.iter().map(|(kind, amount)| (*kind, *amount)));
        self.cycles_completed += 1;
        self.next_cycle_at = now_ms.saturating_add(CYCLE_MS);

        let report = CycleReport {
            cycle: self.cycles_completed,
            produced,
            executed_at_ms: now_ms,
            next_cycle_at_ms: self.next_cycle_at,
        };
        tracing::info!(
            cycle = report.cycle,
            produced = ?report.produced,
            "production cycle applied"
        );

        self.history.push_back(report.clone());
        if self.history.len() > MAX_REPORT_HISTORY {
            self.history.pop_front();
        }
        Some(report)
    }

    pub fn stop(&mut self) {
        if self.state != SchedulerState::Stopped {
            tracing::info!(cycles = self.cycles_completed, "production scheduler stopped");
        }
        self.state = SchedulerState::Stopped;
    }

    pub fn recent_reports(&self) -> impl Iterator<Item = &CycleReport> {
        self.history.iter()
    }

    pub fn last_report(&self) -> Option<&CycleReport> {
        self.history.back()
    }
}

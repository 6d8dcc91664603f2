use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::{
    action::Action,
    catalog::CYCLE_MS,
    clock::ManualClock,
    config::SimulationConfig,
    scheduler::CycleReport,
    snapshot::SimulationSnapshot,
    state::SimulationState,
};

/// A recorded play session: actions interleaved with waits measured in
/// production cycles.
#[derive(Debug, Clone, Default)]
pub struct Script {
    pub description: Option<String>,
    pub steps: Vec<ScriptStep>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptStep {
    Wait { wait_cycles: u32 },
    Act(Action),
}

#[derive(Deserialize)]
struct RawScript {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    steps: Vec<serde_yaml::Value>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawWait {
    wait_cycles: u32,
}

impl Script {
    /// Parses a script document. Errors name the zero-based step that failed.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let raw: RawScript = serde_yaml::from_str(text)?;
        let steps = raw
            .steps
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                ScriptStep::from_value(value).with_context(|| format!("invalid step {index}"))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            description: raw.description,
            steps,
        })
    }
}

impl ScriptStep {
    fn from_value(value: serde_yaml::Value) -> Result<Self, serde_yaml::Error> {
        if value.get("wait_cycles").is_some() {
            let wait: RawWait = serde_yaml::from_value(value)?;
            Ok(ScriptStep::Wait {
                wait_cycles: wait.wait_cycles,
            })
        } else {
            serde_yaml::from_value(value).map(ScriptStep::Act)
        }
    }
}

pub struct ScriptLoader {
    base_dir: PathBuf,
}

impl ScriptLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Script> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read script file {}", path.display()))?;
        Script::from_yaml_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }
}

#[derive(Debug, Clone)]
pub struct ScriptRun {
    pub applied: usize,
    pub rejected: usize,
    pub cycles: Vec<CycleReport>,
    pub snapshot: SimulationSnapshot,
}

/// Deterministic headless session on a manual clock.
pub struct HeadlessRunner {
    state: SimulationState,
    clock: Arc<ManualClock>,
    applied: usize,
    rejected: usize,
    cycles: Vec<CycleReport>,
}

impl HeadlessRunner {
    pub fn new(config: &SimulationConfig) -> Self {
        let clock = Arc::new(ManualClock::new(0));
        Self {
            state: SimulationState::new(config, clock.clone()),
            clock,
            applied: 0,
            rejected: 0,
            cycles: Vec::new(),
        }
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Rejected actions are logged and skipped.
    pub fn run_script(&mut self, script: &Script) {
        for step in &script.steps {
            match step {
                ScriptStep::Wait { wait_cycles } => self.advance_cycles(*wait_cycles),
                ScriptStep::Act(action) => match self.state.apply(action) {
                    Ok(()) => self.applied += 1,
                    Err(err) => {
                        tracing::warn!(?action, %err, "scripted action rejected");
                        self.rejected += 1;
                    }
                },
            }
        }
    }

    /// Jumps the clock to each remaining deadline in turn.
    pub fn advance_cycles(&mut self, cycles: u32) {
        for _ in 0..cycles {
            let wait = self.state.time_until_next_cycle_ms().max(1).min(CYCLE_MS);
            self.clock.advance(wait);
            if let Some(report) = self.state.tick_if_due() {
                self.cycles.push(report);
            }
        }
    }

    pub fn finish(mut self) -> ScriptRun {
        self.state.stop();
        ScriptRun {
            applied: self.applied,
            rejected: self.rejected,
            cycles: self.cycles,
            snapshot: self.state.snapshot(),
        }
    }
}

pub mod action;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
pub mod ledger;
pub mod scheduler;
pub mod script;
pub mod snapshot;
pub mod state;
pub mod web;
pub mod workers;

pub use action::Action;
pub use config::SimulationConfig;
pub use engine::SharedSimulation;
pub use error::SimError;
pub use state::SimulationState;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use city_builder::{
    config::SimulationConfig,
    script::{HeadlessRunner, ScriptLoader},
    web::{self, WebServerConfig},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "City builder simulation core")]
struct Cli {
    /// Path to the session profile YAML file
    #[arg(long, global = true, default_value = "scenarios/default.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a session headlessly on a simulated clock and print the final state
    Simulate {
        /// Script of actions and waits to play before the extra cycles
        #[arg(long)]
        script: Option<PathBuf>,

        /// Production cycles to run after the script
        #[arg(long, default_value_t = 0)]
        cycles: u32,
    },
    /// Serve the JSON bridge for a browser presentation layer
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[arg(long, default_value_t = 9100)]
        port: u16,
    },
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = SimulationConfig::from_yaml(&cli.config)
        .with_context(|| format!("Failed to load profile {}", cli.config.display()))?;
    init_tracing(&config.logging.level);
    tracing::info!(profile = %config.name, placement = ?config.placement, "profile loaded");

    match cli.command {
        Command::Simulate { script, cycles } => {
            let mut runner = HeadlessRunner::new(&config);
            if let Some(path) = script {
                let script = ScriptLoader::new(".").load(&path)?;
                runner.run_script(&script);
            }
            runner.advance_cycles(cycles);
            let run = runner.finish();
            tracing::info!(
                applied = run.applied,
                rejected = run.rejected,
                cycles = run.cycles.len(),
                "headless session finished"
            );
            println!("{}", serde_json::to_string_pretty(&run.snapshot)?);
        }
        Command::Serve { host, port } => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(web::run(WebServerConfig {
                simulation: config,
                host,
                port,
            }))?;
        }
    }
    Ok(())
}

//! EOS command-line interface.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use eos_core::{EngineConfig, EosError};
use eos_observable::ObservableRegistry;
use eos_params::Parameters;

use commands::{
    evaluate::{self, EvaluateArgs},
    list::{self, ListConstraintsArgs, ListObservablesArgs, ListParametersArgs},
};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "eos", about = "Evaluate flavour physics observables", version)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    log_level: tracing::Level,
    /// YAML engine configuration.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List registered observables by section and group.
    ListObservables(ListObservablesArgs),
    /// List parameters of the default world with their ranges.
    ListParameters(ListParametersArgs),
    /// List the built-in experimental constraints.
    ListConstraints(ListConstraintsArgs),
    /// Evaluate one observable.
    Evaluate(EvaluateArgs),
}

/// Engine state shared by the subcommands.
pub struct Engine {
    /// Effective configuration.
    pub config: EngineConfig,
    /// Installed observable registry.
    pub registry: Arc<ObservableRegistry>,
}

impl Engine {
    fn load(config: Option<&PathBuf>) -> Result<Self, EosError> {
        let config = match config {
            Some(path) => EngineConfig::from_path(path)?,
            None => EngineConfig::default(),
        };
        let registry = eos_physics::init_with(&config)?;
        Ok(Self { config, registry })
    }

    /// Fresh world built from the defaults under the configured range policy.
    pub fn parameters(&self) -> Result<Parameters, EosError> {
        Parameters::from_config(&self.config)
    }
}

fn report(err: &EosError) {
    let info = err.info();
    eprintln!("error[{}]: {} ({})", err.kind(), info.message, info.code);
    for (key, value) in &info.context {
        eprintln!("  {key}: {value}");
    }
    if let Some(hint) = &info.hint {
        eprintln!("  hint: {hint}");
    }
}

fn run(cli: Cli) -> Result<(), EosError> {
    let engine = Engine::load(cli.config.as_ref())?;
    match cli.command {
        Command::ListObservables(args) => list::observables(&engine, &args),
        Command::ListParameters(args) => list::parameters(&engine, &args),
        Command::ListConstraints(args) => list::constraints(&args),
        Command::Evaluate(args) => evaluate::run(&engine, &args),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

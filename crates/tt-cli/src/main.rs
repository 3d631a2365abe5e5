use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    generate::{self, GenerateArgs},
    reconstruct::{self, ReconstructArgs},
    solve_nu::{self, SolveNuArgs},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "ttreco", about = "Semileptonic tt event reconstruction")]
struct Cli {
    /// Log filter; overrides `RUST_LOG` when given.
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reconstruct a JSONL file of events with a YAML configuration.
    Reconstruct(ReconstructArgs),
    /// Write deterministic toy events as JSONL.
    Generate(GenerateArgs),
    /// Print the mass-constraint neutrino candidates for one lepton and MET.
    SolveNu(SolveNuArgs),
}

fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time(),
        )
        .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());
    match cli.command {
        Command::Reconstruct(args) => reconstruct::run(&args),
        Command::Generate(args) => generate::run(&args),
        Command::SolveNu(args) => solve_nu::run(&args),
    }
}

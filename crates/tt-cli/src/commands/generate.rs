use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use tracing::info;
use tt_core::FourMomentum;
use tt_reco::{Event, RoleAssignment, ToyGenerator, ToySettings};

use super::write_jsonl;

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Master seed; event `i` depends only on the seed and `i`.
    #[arg(long, default_value_t = 2024)]
    pub seed: u64,
    /// Number of events to generate.
    #[arg(long, default_value_t = 1000)]
    pub events: usize,
    /// Output JSONL file of events.
    #[arg(long)]
    pub out: PathBuf,
    /// Optional JSONL file receiving the generator truth per event.
    #[arg(long)]
    pub truth: Option<PathBuf>,
    /// Half-width of the uniform smearing of each MET component.
    #[arg(long, default_value_t = 10.0)]
    pub met_smearing: f64,
    /// Maximal number of extra radiation jets.
    #[arg(long, default_value_t = 2)]
    pub max_extra_jets: usize,
}

#[derive(Debug, Serialize)]
struct TruthRecord {
    event: usize,
    assignment: RoleAssignment,
    neutrino: FourMomentum,
}

pub fn run(args: &GenerateArgs) -> Result<(), Box<dyn Error>> {
    let settings = ToySettings {
        met_smearing: args.met_smearing,
        max_extra_jets: args.max_extra_jets,
        ..ToySettings::default()
    };
    let toys = ToyGenerator::new(args.seed, settings).generate(args.events);

    let events: Vec<&Event> = toys.iter().map(|toy| &toy.event).collect();
    write_jsonl(&args.out, &events)?;

    if let Some(path) = &args.truth {
        let truth: Vec<TruthRecord> = toys
            .iter()
            .enumerate()
            .map(|(event, toy)| TruthRecord {
                event,
                assignment: toy.truth,
                neutrino: toy.neutrino,
            })
            .collect();
        write_jsonl(path, &truth)?;
    }

    info!(
        events = toys.len(),
        seed = args.seed,
        out = %args.out.display(),
        "toy events written"
    );
    Ok(())
}

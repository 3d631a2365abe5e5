use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;
use tracing::info;
use tt_core::{to_canonical_json_bytes, FourMomentum};
use tt_reco::{
    reconstruct_batch, BatchSummary, Event, RecoConfig, ReconstructionResult, RoleAssignment,
    TtObservables,
};

use super::write_jsonl;

#[derive(Args, Debug)]
pub struct ReconstructArgs {
    /// YAML reconstruction configuration.
    #[arg(long)]
    pub config: PathBuf,
    /// JSONL file with one event per line.
    #[arg(long)]
    pub events: PathBuf,
    /// Output JSONL file with one result per event.
    #[arg(long)]
    pub out: PathBuf,
    /// Worker threads.
    #[arg(long, default_value_t = 1)]
    pub threads: usize,
}

#[derive(Debug, Serialize)]
struct ResultRecord {
    event: usize,
    status: &'static str,
    code: u32,
    rank: Option<f64>,
    evaluated: usize,
    assignment: Option<RoleAssignment>,
    neutrino: Option<FourMomentum>,
    observables: Option<TtObservables>,
}

impl ResultRecord {
    fn new(event: usize, result: &ReconstructionResult) -> Self {
        let status = result.status();
        Self {
            event,
            status: status.name(),
            code: status.code(),
            rank: result.interpretation().map(|interp| interp.rank),
            evaluated: result.evaluated_assignments(),
            assignment: result.assignment(),
            neutrino: result.neutrino(),
            observables: TtObservables::from_result(result),
        }
    }
}

fn read_events(path: &Path) -> Result<Vec<Event>, Box<dyn Error>> {
    let text = fs::read_to_string(path)?;
    let mut events = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let event: Event = serde_json::from_str(line)
            .map_err(|err| format!("{}:{}: {err}", path.display(), line_no + 1))?;
        events.push(event);
    }
    Ok(events)
}

/// Summary path next to the results, e.g. `results.summary.json` for `results.jsonl`.
fn summary_path(out: &Path) -> PathBuf {
    out.with_extension("summary.json")
}

pub fn run(args: &ReconstructArgs) -> Result<(), Box<dyn Error>> {
    let config = RecoConfig::load(&args.config)?;
    let events = read_events(&args.events)?;
    let results = reconstruct_batch(&config, &events, args.threads)?;

    let records: Vec<ResultRecord> = results
        .iter()
        .enumerate()
        .map(|(event, result)| ResultRecord::new(event, result))
        .collect();
    write_jsonl(&args.out, &records)?;

    let summary = BatchSummary::new(&config, &results)?;
    fs::write(summary_path(&args.out), to_canonical_json_bytes(&summary)?)?;
    info!(
        events = summary.events,
        efficiency = summary.efficiency(),
        out = %args.out.display(),
        "reconstruction finished"
    );
    Ok(())
}

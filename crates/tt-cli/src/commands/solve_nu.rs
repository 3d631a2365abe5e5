use std::error::Error;

use clap::Args;
use serde::Serialize;
use tt_core::{FourMomentum, MissingMomentum, W_MASS};
use tt_nu::{MassConstraintBranch, MassConstraintSolver, QuadraticCoefficients};

use super::parse_components;

#[derive(Args, Debug)]
pub struct SolveNuArgs {
    /// Lepton as `pt,eta,phi,m`.
    #[arg(long, value_parser = parse_lepton, allow_hyphen_values = true)]
    pub lepton: FourMomentum,
    /// Missing transverse momentum as `px,py`.
    #[arg(long, value_parser = parse_met, allow_hyphen_values = true)]
    pub met: MissingMomentum,
    /// W-boson mass of the constraint.
    #[arg(long, default_value_t = W_MASS)]
    pub w_mass: f64,
}

#[derive(Debug, Serialize)]
struct SolveReport {
    branch: MassConstraintBranch,
    coefficients: QuadraticCoefficients,
    candidates: Vec<FourMomentum>,
}

fn parse_lepton(value: &str) -> Result<FourMomentum, String> {
    let [pt, eta, phi, mass] = parse_components::<4>(value)?;
    Ok(FourMomentum::from_pt_eta_phi_m(pt, eta, phi, mass))
}

fn parse_met(value: &str) -> Result<MissingMomentum, String> {
    let [px, py] = parse_components::<2>(value)?;
    Ok(MissingMomentum::new(px, py))
}

pub fn run(args: &SolveNuArgs) -> Result<(), Box<dyn Error>> {
    let solver = MassConstraintSolver::new(args.w_mass);
    let solution = solver.solve(&args.lepton, &args.met)?;
    let report = SolveReport {
        branch: solution.branch,
        coefficients: QuadraticCoefficients::new(
            &args.lepton,
            args.met.px,
            args.met.py,
            args.w_mass,
        ),
        candidates: solution.candidates,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

//! Likelihood ranking with the ellipse neutrino solver.
//!
//! The rank of an assignment is `ln p(d) + ln p(m_W, m_t)`, where `d` is the distance
//! between the best neutrino on the ellipse of the leptonic b jet and the measured
//! MET, and the masses are those of the hadronic W and top candidates. The neutrino
//! part depends only on the leptonic b jet, which the search keeps fixed over long
//! stretches, so it is cached under that jet's index for the duration of an event.

use std::path::PathBuf;
use std::sync::Arc;

use nalgebra::Matrix2;
use serde::{Deserialize, Serialize};
use tracing::trace;
use tt_core::errors::{ErrorInfo, RecoError};
use tt_core::{DensityLookup, FourMomentum};
use tt_nu::{EllipseSolver, MetCovariance};

use crate::event::EventView;
use crate::ranker::InterpretationRanker;
use crate::roles::RoleAssignment;
use crate::status::ReconstructionStatus;
use crate::tables::LikelihoodTables;

fn default_neutrino_table() -> String {
    "nusolver_chi2_right".to_string()
}

fn default_mass_table() -> String {
    "mWhad_vs_mtophad_right".to_string()
}

fn default_w_mass() -> f64 {
    80.0
}

fn default_top_mass() -> f64 {
    173.0
}

fn default_cache() -> bool {
    true
}

/// Settings of the likelihood ranker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LikelihoodSettings {
    /// JSON file holding the density tables.
    pub tables: PathBuf,
    /// Name of the one-dimensional neutrino distance table.
    #[serde(default = "default_neutrino_table")]
    pub neutrino_table: String,
    /// Name of the two-dimensional (m_W, m_t) table.
    #[serde(default = "default_mass_table")]
    pub mass_table: String,
    /// W-boson mass of the ellipse constraint.
    #[serde(default = "default_w_mass")]
    pub w_mass: f64,
    /// Top-quark mass of the ellipse constraint.
    #[serde(default = "default_top_mass")]
    pub top_mass: f64,
    /// MET resolution defining the distance metric.
    #[serde(default)]
    pub met_resolution: MetCovariance,
    /// Reuse the neutrino outcome while the leptonic b jet is unchanged.
    #[serde(default = "default_cache")]
    pub cache: bool,
}

impl LikelihoodSettings {
    /// Settings with default table names and masses for a table file.
    pub fn new(tables: impl Into<PathBuf>) -> Self {
        Self {
            tables: tables.into(),
            neutrino_table: default_neutrino_table(),
            mass_table: default_mass_table(),
            w_mass: default_w_mass(),
            top_mass: default_top_mass(),
            met_resolution: MetCovariance::default(),
            cache: default_cache(),
        }
    }

    /// Checks masses and the MET resolution.
    pub fn validate(&self) -> Result<(), RecoError> {
        if !(self.w_mass > 0.0) || !(self.top_mass > self.w_mass) || !self.top_mass.is_finite() {
            return Err(RecoError::Config(
                ErrorInfo::new("mass_constraints", "need 0 < w_mass < top_mass")
                    .with_context("w_mass", self.w_mass)
                    .with_context("top_mass", self.top_mass),
            ));
        }
        self.met_resolution.precision().map(|_| ())
    }
}

/// Neutrino part of the rank for one leptonic b jet.
#[derive(Debug, Clone, Copy, PartialEq)]
enum NeutrinoOutcome {
    Unreconstructable,
    OutOfRange,
    InRange {
        neutrino: FourMomentum,
        log_density: f64,
    },
}

/// Steps that succeeded at least once in the current event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LikelihoodFlags {
    /// Some leptonic b jet admitted a neutrino.
    pub neutrino_reconstructed: bool,
    /// Some neutrino distance fell inside the neutrino table.
    pub neutrino_in_range: bool,
    /// Some mass pair fell inside the mass table.
    pub mass_in_range: bool,
}

/// Ranks assignments by the log-likelihood of the neutrino distance and jet masses.
#[derive(Debug, Clone)]
pub struct LikelihoodRanker {
    tables: Arc<LikelihoodTables>,
    w_mass: f64,
    top_mass: f64,
    precision: Matrix2<f64>,
    cache_enabled: bool,
    cache: Option<(usize, NeutrinoOutcome)>,
    flags: LikelihoodFlags,
    best_neutrino: Option<FourMomentum>,
    solver_calls: u64,
}

impl LikelihoodRanker {
    /// Creates a ranker sharing the given tables.
    pub fn new(
        tables: Arc<LikelihoodTables>,
        settings: &LikelihoodSettings,
    ) -> Result<Self, RecoError> {
        settings.validate()?;
        Ok(Self {
            tables,
            w_mass: settings.w_mass,
            top_mass: settings.top_mass,
            precision: settings.met_resolution.precision()?,
            cache_enabled: settings.cache,
            cache: None,
            flags: LikelihoodFlags::default(),
            best_neutrino: None,
            solver_calls: 0,
        })
    }

    /// Shared density tables.
    pub fn tables(&self) -> &Arc<LikelihoodTables> {
        &self.tables
    }

    /// Enables or disables the neutrino cache.
    pub fn set_cache(&mut self, enabled: bool) {
        self.cache_enabled = enabled;
        self.cache = None;
    }

    /// Number of ellipse solver invocations since construction.
    pub fn solver_calls(&self) -> u64 {
        self.solver_calls
    }

    /// Flags collected in the current event.
    pub fn flags(&self) -> LikelihoodFlags {
        self.flags
    }

    fn neutrino_outcome(&mut self, event: &EventView<'_>, b_top_lep: usize) -> NeutrinoOutcome {
        if self.cache_enabled {
            if let Some((key, outcome)) = self.cache {
                if key == b_top_lep {
                    trace!(jet = b_top_lep, "reusing cached neutrino");
                    return outcome;
                }
            }
        }

        let outcome = self.solve_neutrino(event, b_top_lep);
        if self.cache_enabled {
            self.cache = Some((b_top_lep, outcome));
        }
        outcome
    }

    fn solve_neutrino(&mut self, event: &EventView<'_>, b_top_lep: usize) -> NeutrinoOutcome {
        let Some(lepton) = event.leading_lepton() else {
            return NeutrinoOutcome::Unreconstructable;
        };
        self.solver_calls += 1;
        let solver = EllipseSolver::new(
            &lepton.p4,
            &event.jets[b_top_lep].p4,
            self.w_mass,
            self.top_mass,
        );
        let solution = solver.best(&event.met, &self.precision);
        let Some(distance) = solution.distance() else {
            return NeutrinoOutcome::Unreconstructable;
        };
        self.flags.neutrino_reconstructed = true;

        match self.tables.neutrino.density(distance) {
            DensityLookup::OutOfRange => NeutrinoOutcome::OutOfRange,
            DensityLookup::InRange(density) => {
                self.flags.neutrino_in_range = true;
                NeutrinoOutcome::InRange {
                    neutrino: solution.neutrino,
                    log_density: density.ln(),
                }
            }
        }
    }
}

impl InterpretationRanker for LikelihoodRanker {
    fn begin_event(
        &mut self,
        event: &EventView<'_>,
    ) -> Result<Option<ReconstructionStatus>, RecoError> {
        self.cache = None;
        self.flags = LikelihoodFlags::default();
        self.best_neutrino = None;
        if event.leptons.is_empty() {
            return Ok(Some(ReconstructionStatus::NoLeptons));
        }
        Ok(None)
    }

    fn rank(&mut self, event: &EventView<'_>, assignment: &RoleAssignment, best_rank: f64) -> f64 {
        let NeutrinoOutcome::InRange {
            neutrino,
            log_density,
        } = self.neutrino_outcome(event, assignment.b_top_lep)
        else {
            return f64::NEG_INFINITY;
        };

        let b_had = event.jets[assignment.b_top_had].p4;
        let w_had = event.jets[assignment.q1_top_had].p4 + event.jets[assignment.q2_top_had].p4;
        let top_had = b_had + w_had;
        let mass_density = match self.tables.mass.density(w_had.mass(), top_had.mass()) {
            DensityLookup::InRange(density) => density,
            DensityLookup::OutOfRange => return f64::NEG_INFINITY,
        };
        self.flags.mass_in_range = true;

        let rank = log_density + mass_density.ln();
        if rank > best_rank {
            self.best_neutrino = Some(neutrino);
        }
        rank
    }

    fn best_neutrino(&self) -> Option<FourMomentum> {
        self.best_neutrino
    }

    fn diagnose_failure(&self) -> ReconstructionStatus {
        if !self.flags.neutrino_reconstructed {
            ReconstructionStatus::NeutrinoUnreconstructable
        } else if !self.flags.neutrino_in_range {
            ReconstructionStatus::NeutrinoLikelihoodOutOfRange
        } else if !self.flags.mass_in_range {
            ReconstructionStatus::MassLikelihoodOutOfRange
        } else {
            ReconstructionStatus::NoViableInterpretation
        }
    }
}

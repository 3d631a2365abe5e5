//! Chi-square ranking with the mass-constraint neutrino solver.

use serde::{Deserialize, Serialize};
use tracing::warn;
use tt_core::errors::{ErrorInfo, RecoError};
use tt_core::{FourMomentum, Jet, W_MASS};
use tt_nu::MassConstraintSolver;

use crate::event::EventView;
use crate::ranker::InterpretationRanker;
use crate::roles::RoleAssignment;
use crate::status::ReconstructionStatus;

/// Kinematic quantity entering a chi-square term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Expression {
    /// Mass of lepton, neutrino and leptonic-side b jet.
    MassTopLep,
    /// Mass of the three hadronic-side jets.
    MassTopHad,
    /// Mass of the two light jets.
    MassWHad,
    /// Transverse momentum of the full tt system.
    PtTt,
}

/// Objects of one interpretation with a fixed neutrino.
#[derive(Debug, Clone, Copy)]
pub struct Hypothesis<'a> {
    /// Charged lepton momentum.
    pub lepton: &'a FourMomentum,
    /// Neutrino candidate.
    pub neutrino: &'a FourMomentum,
    /// Jets ordered as bTopLep, bTopHad, q1TopHad, q2TopHad.
    pub jets: [&'a Jet; 4],
}

impl Expression {
    /// Evaluates the expression for a hypothesis.
    pub fn evaluate(self, hyp: &Hypothesis<'_>) -> f64 {
        let [b_lep, b_had, q1, q2] = hyp.jets;
        match self {
            Expression::MassTopLep => (*hyp.lepton + *hyp.neutrino + b_lep.p4).mass(),
            Expression::MassTopHad => (b_had.p4 + q1.p4 + q2.p4).mass(),
            Expression::MassWHad => (q1.p4 + q2.p4).mass(),
            Expression::PtTt => {
                (*hyp.lepton + *hyp.neutrino + b_lep.p4 + b_had.p4 + q1.p4 + q2.p4).pt()
            }
        }
    }
}

/// One term `((expression - mean) / variance)^2` of the chi-square.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Chi2Term {
    /// Kinematic quantity.
    pub expression: Expression,
    /// Expected value.
    pub mean: f64,
    /// Width dividing the deviation from the mean.
    pub variance: f64,
}

impl Chi2Term {
    /// Creates a term.
    pub fn new(expression: Expression, mean: f64, variance: f64) -> Self {
        Self {
            expression,
            mean,
            variance,
        }
    }

    /// Contribution of the term for a hypothesis.
    pub fn evaluate(&self, hyp: &Hypothesis<'_>) -> f64 {
        ((self.expression.evaluate(hyp) - self.mean) / self.variance).powi(2)
    }
}

fn default_w_mass() -> f64 {
    W_MASS
}

/// Settings of the chi-square ranker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chi2Settings {
    /// Terms summed into the chi-square.
    #[serde(default)]
    pub terms: Vec<Chi2Term>,
    /// W-boson mass of the neutrino mass constraint.
    #[serde(default = "default_w_mass")]
    pub w_mass: f64,
}

impl Default for Chi2Settings {
    fn default() -> Self {
        Self {
            terms: Vec::new(),
            w_mass: default_w_mass(),
        }
    }
}

impl Chi2Settings {
    /// Checks that every term has a finite mean and a positive finite width.
    pub fn validate(&self) -> Result<(), RecoError> {
        for (idx, term) in self.terms.iter().enumerate() {
            if !term.mean.is_finite() || !term.variance.is_finite() || term.variance <= 0.0 {
                return Err(RecoError::Config(
                    ErrorInfo::new(
                        "chi2_term_width",
                        "chi-square term needs a finite mean and a positive width",
                    )
                    .with_context("term", idx)
                    .with_context("mean", term.mean)
                    .with_context("variance", term.variance),
                ));
            }
        }
        if !(self.w_mass > 0.0) {
            return Err(RecoError::Config(
                ErrorInfo::new("w_mass", "W mass must be positive")
                    .with_context("w_mass", self.w_mass),
            ));
        }
        Ok(())
    }
}

/// Ranks assignments by minus the smallest chi-square over neutrino candidates.
#[derive(Debug, Clone)]
pub struct Chi2Ranker {
    terms: Vec<Chi2Term>,
    solver: MassConstraintSolver,
    lepton: FourMomentum,
    neutrinos: Vec<FourMomentum>,
    best_neutrino: Option<FourMomentum>,
}

impl Chi2Ranker {
    /// Creates a ranker from validated settings.
    pub fn new(settings: &Chi2Settings) -> Result<Self, RecoError> {
        settings.validate()?;
        if settings.terms.is_empty() {
            warn!("chi-square ranker has no terms; every assignment ranks equally");
        }
        Ok(Self {
            terms: settings.terms.clone(),
            solver: MassConstraintSolver::new(settings.w_mass),
            lepton: FourMomentum::zero(),
            neutrinos: Vec::new(),
            best_neutrino: None,
        })
    }

    /// Configured terms.
    pub fn terms(&self) -> &[Chi2Term] {
        &self.terms
    }

    /// Neutrino candidates of the current event.
    pub fn neutrinos(&self) -> &[FourMomentum] {
        &self.neutrinos
    }

    /// Chi-square of one hypothesis.
    pub fn chi2(&self, hyp: &Hypothesis<'_>) -> f64 {
        self.terms.iter().map(|term| term.evaluate(hyp)).sum()
    }
}

impl InterpretationRanker for Chi2Ranker {
    fn begin_event(
        &mut self,
        event: &EventView<'_>,
    ) -> Result<Option<ReconstructionStatus>, RecoError> {
        self.neutrinos.clear();
        self.best_neutrino = None;
        let Some(lepton) = event.leading_lepton() else {
            return Ok(Some(ReconstructionStatus::NoLeptons));
        };
        self.lepton = lepton.p4;
        let solution = self.solver.solve(&lepton.p4, &event.met)?;
        if solution.candidates.is_empty() {
            return Ok(Some(ReconstructionStatus::NoNeutrinoCandidates));
        }
        self.neutrinos = solution.candidates;
        Ok(None)
    }

    fn rank(&mut self, event: &EventView<'_>, assignment: &RoleAssignment, best_rank: f64) -> f64 {
        let jets = assignment.indices().map(|idx| &event.jets[idx]);
        let mut min_chi2 = f64::INFINITY;
        let mut min_neutrino = None;
        for neutrino in &self.neutrinos {
            let hyp = Hypothesis {
                lepton: &self.lepton,
                neutrino,
                jets,
            };
            let chi2 = self.chi2(&hyp);
            if chi2 < min_chi2 {
                min_chi2 = chi2;
                min_neutrino = Some(*neutrino);
            }
        }
        let rank = -min_chi2;
        if rank > best_rank {
            self.best_neutrino = min_neutrino;
        }
        rank
    }

    fn best_neutrino(&self) -> Option<FourMomentum> {
        self.best_neutrino
    }

    fn diagnose_failure(&self) -> ReconstructionStatus {
        ReconstructionStatus::NoViableInterpretation
    }
}

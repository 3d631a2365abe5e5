//! Reconstructed interpretation of an event and its accessors.

use serde::{Deserialize, Serialize};
use tt_core::{FourMomentum, Jet, Lepton};

use crate::roles::{DecayJet, RoleAssignment};
use crate::status::ReconstructionStatus;

/// Accepted interpretation of an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interpretation {
    /// Jet indices per role.
    pub assignment: RoleAssignment,
    /// Jets per role, ordered as [`DecayJet::ALL`].
    pub jets: [Jet; 4],
    /// Lepton used in the reconstruction.
    pub lepton: Lepton,
    /// Selected neutrino.
    pub neutrino: FourMomentum,
    /// Rank of the interpretation; higher is better.
    pub rank: f64,
}

impl Interpretation {
    /// Jet filling `role`.
    pub fn jet(&self, role: DecayJet) -> &Jet {
        &self.jets[role.slot()]
    }

    /// Four-momentum of the hadronically decaying W boson.
    pub fn w_had_p4(&self) -> FourMomentum {
        self.jet(DecayJet::Q1TopHad).p4 + self.jet(DecayJet::Q2TopHad).p4
    }

    /// Four-momentum of the semileptonically decaying top quark.
    pub fn top_lep_p4(&self) -> FourMomentum {
        self.lepton.p4 + self.neutrino + self.jet(DecayJet::BTopLep).p4
    }

    /// Four-momentum of the hadronically decaying top quark.
    pub fn top_had_p4(&self) -> FourMomentum {
        self.jet(DecayJet::BTopHad).p4 + self.w_had_p4()
    }
}

/// Outcome of reconstructing one event.
///
/// Accessors for jets, lepton and neutrino return `None` unless the status is
/// [`ReconstructionStatus::Success`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconstructionResult {
    status: ReconstructionStatus,
    interpretation: Option<Interpretation>,
    evaluated: usize,
}

impl ReconstructionResult {
    /// Successful reconstruction.
    pub fn success(interpretation: Interpretation, evaluated: usize) -> Self {
        Self {
            status: ReconstructionStatus::Success,
            interpretation: Some(interpretation),
            evaluated,
        }
    }

    /// Reconstruction stopped with a failure status.
    pub fn failed(status: ReconstructionStatus, evaluated: usize) -> Self {
        Self {
            status,
            interpretation: None,
            evaluated,
        }
    }

    /// Status of the reconstruction.
    pub fn status(&self) -> ReconstructionStatus {
        self.status
    }

    /// Whether a best interpretation was found.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Rank of the best interpretation, or negative infinity on failure.
    pub fn rank(&self) -> f64 {
        self.interpretation
            .as_ref()
            .map_or(f64::NEG_INFINITY, |interp| interp.rank)
    }

    /// Number of role assignments handed to the ranker.
    pub fn evaluated_assignments(&self) -> usize {
        self.evaluated
    }

    /// Best interpretation.
    pub fn interpretation(&self) -> Option<&Interpretation> {
        self.interpretation.as_ref()
    }

    /// Jet indices of the best interpretation.
    pub fn assignment(&self) -> Option<RoleAssignment> {
        self.interpretation.as_ref().map(|interp| interp.assignment)
    }

    /// Jet filling `role` in the best interpretation.
    pub fn jet(&self, role: DecayJet) -> Option<&Jet> {
        self.interpretation.as_ref().map(|interp| interp.jet(role))
    }

    /// Lepton of the best interpretation.
    pub fn lepton(&self) -> Option<&Lepton> {
        self.interpretation.as_ref().map(|interp| &interp.lepton)
    }

    /// Neutrino of the best interpretation.
    pub fn neutrino(&self) -> Option<FourMomentum> {
        self.interpretation.as_ref().map(|interp| interp.neutrino)
    }

    /// Four-momentum of the semileptonically decaying top quark.
    pub fn top_lep_p4(&self) -> Option<FourMomentum> {
        self.interpretation.as_ref().map(Interpretation::top_lep_p4)
    }

    /// Four-momentum of the hadronically decaying top quark.
    pub fn top_had_p4(&self) -> Option<FourMomentum> {
        self.interpretation.as_ref().map(Interpretation::top_had_p4)
    }
}

//! Outcome codes of an event reconstruction.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Reason why reconstruction of an event succeeded or stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconstructionStatus {
    /// A best interpretation was found.
    Success,
    /// The event has no charged lepton.
    NoLeptons,
    /// No b-jet candidate admits a neutrino satisfying both mass constraints.
    NeutrinoUnreconstructable,
    /// Neutrinos were found but their figure of merit is outside the likelihood table.
    NeutrinoLikelihoodOutOfRange,
    /// Jet masses are outside the mass likelihood table for every assignment.
    MassLikelihoodOutOfRange,
    /// Every step succeeded somewhere but no assignment obtained a finite rank.
    NoViableInterpretation,
    /// Fewer than four jets pass the selection.
    InsufficientJets,
    /// The mass-constraint neutrino solver returned no candidate.
    NoNeutrinoCandidates,
}

impl ReconstructionStatus {
    /// All statuses in order of their numeric codes.
    pub const ALL: [ReconstructionStatus; 8] = [
        ReconstructionStatus::Success,
        ReconstructionStatus::NoLeptons,
        ReconstructionStatus::NeutrinoUnreconstructable,
        ReconstructionStatus::NeutrinoLikelihoodOutOfRange,
        ReconstructionStatus::MassLikelihoodOutOfRange,
        ReconstructionStatus::NoViableInterpretation,
        ReconstructionStatus::InsufficientJets,
        ReconstructionStatus::NoNeutrinoCandidates,
    ];

    /// Stable numeric code; zero means success.
    pub fn code(self) -> u32 {
        match self {
            ReconstructionStatus::Success => 0,
            ReconstructionStatus::NoLeptons => 1,
            ReconstructionStatus::NeutrinoUnreconstructable => 2,
            ReconstructionStatus::NeutrinoLikelihoodOutOfRange => 3,
            ReconstructionStatus::MassLikelihoodOutOfRange => 4,
            ReconstructionStatus::NoViableInterpretation => 5,
            ReconstructionStatus::InsufficientJets => 6,
            ReconstructionStatus::NoNeutrinoCandidates => 7,
        }
    }

    /// Status carrying the given numeric code.
    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.code() == code)
    }

    /// Identifier used in serialized output.
    pub fn name(self) -> &'static str {
        match self {
            ReconstructionStatus::Success => "success",
            ReconstructionStatus::NoLeptons => "no_leptons",
            ReconstructionStatus::NeutrinoUnreconstructable => "neutrino_unreconstructable",
            ReconstructionStatus::NeutrinoLikelihoodOutOfRange => {
                "neutrino_likelihood_out_of_range"
            }
            ReconstructionStatus::MassLikelihoodOutOfRange => "mass_likelihood_out_of_range",
            ReconstructionStatus::NoViableInterpretation => "no_viable_interpretation",
            ReconstructionStatus::InsufficientJets => "insufficient_jets",
            ReconstructionStatus::NoNeutrinoCandidates => "no_neutrino_candidates",
        }
    }

    /// Whether the status denotes success.
    pub fn is_success(self) -> bool {
        self == ReconstructionStatus::Success
    }
}

impl fmt::Display for ReconstructionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ReconstructionStatus::Success => "success",
            ReconstructionStatus::NoLeptons => "no leptons",
            ReconstructionStatus::NeutrinoUnreconstructable => "neutrino unreconstructable",
            ReconstructionStatus::NeutrinoLikelihoodOutOfRange => {
                "neutrino likelihood out of range"
            }
            ReconstructionStatus::MassLikelihoodOutOfRange => "mass likelihood out of range",
            ReconstructionStatus::NoViableInterpretation => "no viable interpretation",
            ReconstructionStatus::InsufficientJets => "insufficient jets",
            ReconstructionStatus::NoNeutrinoCandidates => "no neutrino candidates",
        };
        f.write_str(label)
    }
}

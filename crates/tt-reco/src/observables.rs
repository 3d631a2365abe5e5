//! Observables of the reconstructed tt system.

use serde::{Deserialize, Serialize};

use crate::result::ReconstructionResult;

/// Kinematic summary of a successful reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TtObservables {
    /// Mass of the semileptonically decaying top.
    pub mass_top_lep: f64,
    /// Mass of the hadronically decaying top.
    pub mass_top_had: f64,
    /// Mass of the hadronic W.
    pub mass_w_had: f64,
    /// Transverse momentum of the semileptonically decaying top.
    pub pt_top_lep: f64,
    /// Transverse momentum of the hadronically decaying top.
    pub pt_top_had: f64,
    /// Mass of the tt system.
    pub mass_tt: f64,
    /// Transverse momentum of the tt system.
    pub pt_tt: f64,
    /// Rapidity of the tt system.
    pub rapidity_tt: f64,
    /// Angular separation of the two tops.
    pub delta_r_tt: f64,
    /// Cosine between the leptonic top in the tt rest frame and the tt direction.
    pub cos_top_lep_tt: f64,
}

impl TtObservables {
    /// Computes the observables; `None` unless the reconstruction succeeded.
    pub fn from_result(result: &ReconstructionResult) -> Option<Self> {
        let interp = result.interpretation()?;
        let top_lep = interp.top_lep_p4();
        let top_had = interp.top_had_p4();
        let tt = top_lep + top_had;
        let beta = tt.boost_vector();
        let top_lep_rest = top_lep.boost([-beta[0], -beta[1], -beta[2]]);

        Some(Self {
            mass_top_lep: top_lep.mass(),
            mass_top_had: top_had.mass(),
            mass_w_had: interp.w_had_p4().mass(),
            pt_top_lep: top_lep.pt(),
            pt_top_had: top_had.pt(),
            mass_tt: tt.mass(),
            pt_tt: tt.pt(),
            rapidity_tt: tt.rapidity(),
            delta_r_tt: top_lep.delta_r(&top_had),
            cos_top_lep_tt: top_lep_rest.cos_angle(&tt),
        })
    }
}

//! Deterministic toy generator of semileptonic tt events.
//!
//! Events are generated at parton level: each top decays isotropically in its rest
//! frame, decay products become jets or the lepton without showering, and extra jets
//! mimic additional radiation. MET is the neutrino transverse momentum with uniform
//! smearing. Event `i` depends only on the master seed and `i`.

use std::f64::consts::PI;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tt_core::{FourMomentum, Jet, Lepton, LeptonFlavour, MissingMomentum, RngHandle};

use crate::event::Event;
use crate::roles::RoleAssignment;

const TOP_MASS: f64 = 172.5;
const W_MASS: f64 = 80.4;
const B_MASS: f64 = 4.8;

fn default_extra_jets() -> usize {
    2
}

fn default_met_smearing() -> f64 {
    10.0
}

fn default_top_pt_scale() -> f64 {
    60.0
}

fn default_max_abs_eta() -> f64 {
    2.4
}

/// Parameters of the toy generator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToySettings {
    /// Maximal number of extra radiation jets per event.
    #[serde(default = "default_extra_jets")]
    pub max_extra_jets: usize,
    /// Half-width of the uniform smearing applied to each MET component.
    #[serde(default = "default_met_smearing")]
    pub met_smearing: f64,
    /// Mean of the exponential top transverse-momentum spectrum.
    #[serde(default = "default_top_pt_scale")]
    pub top_pt_scale: f64,
    /// Pseudorapidity range of the tops and extra jets.
    #[serde(default = "default_max_abs_eta")]
    pub max_abs_eta: f64,
}

impl Default for ToySettings {
    fn default() -> Self {
        Self {
            max_extra_jets: default_extra_jets(),
            met_smearing: default_met_smearing(),
            top_pt_scale: default_top_pt_scale(),
            max_abs_eta: default_max_abs_eta(),
        }
    }
}

/// Generated event together with its generator-level truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToyEvent {
    /// Reconstruction inputs.
    pub event: Event,
    /// Indices of the decay jets in the pt-ordered jet list.
    pub truth: RoleAssignment,
    /// Generated neutrino.
    pub neutrino: FourMomentum,
}

/// Seeded generator of toy events.
#[derive(Debug, Clone)]
pub struct ToyGenerator {
    seed: u64,
    settings: ToySettings,
}

impl ToyGenerator {
    /// Creates a generator.
    pub fn new(seed: u64, settings: ToySettings) -> Self {
        Self { seed, settings }
    }

    /// Master seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Generates the first `count` events.
    pub fn generate(&self, count: usize) -> Vec<ToyEvent> {
        (0..count as u64).map(|index| self.event(index)).collect()
    }

    /// Generates event number `index`.
    pub fn event(&self, index: u64) -> ToyEvent {
        let mut rng = RngHandle::substream(self.seed, index);
        let settings = &self.settings;

        let top_lep = random_top(&mut rng, settings);
        let top_had = random_top(&mut rng, settings);
        let (w_lep, b_lep) = decay(&mut rng, top_lep, W_MASS, B_MASS);
        let (w_had, b_had) = decay(&mut rng, top_had, W_MASS, B_MASS);
        let flavour = if rng.gen_bool(0.5) {
            LeptonFlavour::Electron
        } else {
            LeptonFlavour::Muon
        };
        let lepton_mass = match flavour {
            LeptonFlavour::Electron => 0.000511,
            LeptonFlavour::Muon => 0.106,
        };
        let (lepton, neutrino) = decay(&mut rng, w_lep, lepton_mass, 0.0);
        let (q1, q2) = decay(&mut rng, w_had, 0.0, 0.0);

        // Tag each jet with its role slot, or none for radiation.
        let mut tagged = vec![
            (Jet::new(b_lep, rng.gen_range(0.6..1.0)), Some(0)),
            (Jet::new(b_had, rng.gen_range(0.6..1.0)), Some(1)),
            (Jet::new(q1, rng.gen_range(0.0..0.5)), Some(2)),
            (Jet::new(q2, rng.gen_range(0.0..0.5)), Some(3)),
        ];
        let extra = rng.gen_range(0..=settings.max_extra_jets);
        for _ in 0..extra {
            let pt = 20.0 - 15.0 * (1.0 - rng.gen::<f64>()).ln();
            let eta = rng.gen_range(-settings.max_abs_eta..=settings.max_abs_eta);
            let phi = rng.gen_range(-PI..PI);
            let p4 = FourMomentum::from_pt_eta_phi_m(pt, eta, phi, 5.0);
            tagged.push((Jet::new(p4, rng.gen_range(0.0..0.5)), None));
        }
        tagged.sort_by(|a, b| b.0.pt().total_cmp(&a.0.pt()));

        let mut slots = [0usize; 4];
        for (idx, (_, slot)) in tagged.iter().enumerate() {
            if let Some(slot) = slot {
                slots[*slot] = idx;
            }
        }
        let (q_low, q_high) = (slots[2].min(slots[3]), slots[2].max(slots[3]));
        let truth = RoleAssignment::new(slots[0], slots[1], q_low, q_high);

        let smear = settings.met_smearing;
        let met = if smear > 0.0 {
            MissingMomentum::new(
                neutrino.px + rng.gen_range(-smear..smear),
                neutrino.py + rng.gen_range(-smear..smear),
            )
        } else {
            MissingMomentum::new(neutrino.px, neutrino.py)
        };

        let jets = tagged.into_iter().map(|(jet, _)| jet).collect();
        ToyEvent {
            event: Event::new(jets, vec![Lepton::new(lepton, flavour)], met),
            truth,
            neutrino,
        }
    }
}

fn random_top(rng: &mut RngHandle, settings: &ToySettings) -> FourMomentum {
    let pt = -settings.top_pt_scale * (1.0 - rng.gen::<f64>()).ln();
    let eta = rng.gen_range(-settings.max_abs_eta..=settings.max_abs_eta);
    let phi = rng.gen_range(-PI..PI);
    FourMomentum::from_pt_eta_phi_m(pt, eta, phi, TOP_MASS)
}

/// Isotropic two-body decay of `parent` into daughters of masses `m1` and `m2`.
fn decay(
    rng: &mut RngHandle,
    parent: FourMomentum,
    m1: f64,
    m2: f64,
) -> (FourMomentum, FourMomentum) {
    let m = parent.mass();
    let p = ((m * m - (m1 + m2).powi(2)) * (m * m - (m1 - m2).powi(2)))
        .max(0.0)
        .sqrt()
        / (2.0 * m);
    let cos_theta: f64 = rng.gen_range(-1.0..=1.0);
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let phi = rng.gen_range(-PI..PI);
    let (px, py, pz) = (
        p * sin_theta * phi.cos(),
        p * sin_theta * phi.sin(),
        p * cos_theta,
    );
    let first = FourMomentum::new(px, py, pz, (p * p + m1 * m1).sqrt());
    let second = FourMomentum::new(-px, -py, -pz, (p * p + m2 * m2).sqrt());
    let beta = parent.boost_vector();
    (first.boost(beta), second.boost(beta))
}

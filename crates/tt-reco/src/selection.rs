//! Jet selection applied before the assignment search.

use serde::{Deserialize, Serialize};
use tt_core::Jet;

fn default_min_pt() -> f64 {
    20.0
}

fn default_max_abs_eta() -> f64 {
    f64::INFINITY
}

/// How the b-tag threshold applies to the two b-jet roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BTagMode {
    /// Both b-jet roles must pass the threshold.
    #[default]
    Both,
    /// At least one b-jet role must pass the threshold.
    AtLeastOne,
}

/// Requirement on the b-tag discriminants of the b-jet roles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BTagRequirement {
    /// Minimal discriminant value for a jet to count as b-tagged.
    pub threshold: f64,
    /// Combination rule for the two b-jet roles.
    #[serde(default)]
    pub mode: BTagMode,
}

impl BTagRequirement {
    /// Whether the pair of b-jet candidates satisfies the requirement.
    pub fn accepts(&self, b_top_lep: &Jet, b_top_had: &Jet) -> bool {
        let lep = b_top_lep.b_tag >= self.threshold;
        let had = b_top_had.b_tag >= self.threshold;
        match self.mode {
            BTagMode::Both => lep && had,
            BTagMode::AtLeastOne => lep || had,
        }
    }
}

/// Kinematic thresholds and optional b-tag requirement for jets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JetSelection {
    /// Minimal transverse momentum.
    #[serde(default = "default_min_pt")]
    pub min_pt: f64,
    /// Maximal absolute pseudorapidity.
    #[serde(default = "default_max_abs_eta")]
    pub max_abs_eta: f64,
    /// Optional b-tag requirement on the b-jet roles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b_tag: Option<BTagRequirement>,
}

impl Default for JetSelection {
    fn default() -> Self {
        Self {
            min_pt: default_min_pt(),
            max_abs_eta: default_max_abs_eta(),
            b_tag: None,
        }
    }
}

impl JetSelection {
    /// Creates a selection without a b-tag requirement.
    pub fn new(min_pt: f64, max_abs_eta: f64) -> Self {
        Self {
            min_pt,
            max_abs_eta,
            b_tag: None,
        }
    }

    /// Adds a b-tag requirement.
    pub fn with_b_tag(mut self, requirement: BTagRequirement) -> Self {
        self.b_tag = Some(requirement);
        self
    }

    /// Collects indices of selected jets into `selected`, replacing its contents.
    ///
    /// Jets must be ordered in decreasing pt: scanning stops at the first jet below
    /// the pt threshold.
    pub fn select(&self, jets: &[Jet], selected: &mut Vec<usize>) {
        selected.clear();
        for (idx, jet) in jets.iter().enumerate() {
            if jet.pt() < self.min_pt {
                break;
            }
            if jet.eta().abs() > self.max_abs_eta {
                continue;
            }
            selected.push(idx);
        }
    }

    /// Whether a pair of b-jet candidates passes the b-tag requirement, if any.
    pub fn accepts_b_pair(&self, b_top_lep: &Jet, b_top_had: &Jet) -> bool {
        self.b_tag
            .as_ref()
            .map_or(true, |tag| tag.accepts(b_top_lep, b_top_had))
    }
}

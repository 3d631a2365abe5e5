//! Per-event inputs of the reconstruction.

use serde::{Deserialize, Serialize};
use tt_core::{Jet, Lepton, MissingMomentum};

/// Owned event record, as read from or written to JSON lines.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Event {
    /// Jets in descending order of transverse momentum.
    #[serde(default)]
    pub jets: Vec<Jet>,
    /// Charged leptons in descending order of transverse momentum.
    #[serde(default)]
    pub leptons: Vec<Lepton>,
    /// Missing transverse momentum.
    #[serde(default)]
    pub met: MissingMomentum,
}

impl Event {
    /// Creates an event from its collections.
    pub fn new(jets: Vec<Jet>, leptons: Vec<Lepton>, met: MissingMomentum) -> Self {
        Self { jets, leptons, met }
    }

    /// Borrowed view consumed by the reconstruction.
    pub fn view(&self) -> EventView<'_> {
        EventView {
            jets: &self.jets,
            leptons: &self.leptons,
            met: self.met,
        }
    }
}

/// Borrowed event inputs valid for one reconstruction call.
#[derive(Debug, Clone, Copy)]
pub struct EventView<'a> {
    /// Jets in descending order of transverse momentum.
    pub jets: &'a [Jet],
    /// Charged leptons in descending order of transverse momentum.
    pub leptons: &'a [Lepton],
    /// Missing transverse momentum.
    pub met: MissingMomentum,
}

impl<'a> EventView<'a> {
    /// Creates a view over externally owned collections.
    pub fn new(jets: &'a [Jet], leptons: &'a [Lepton], met: MissingMomentum) -> Self {
        Self { jets, leptons, met }
    }

    /// Leading lepton, if any.
    pub fn leading_lepton(&self) -> Option<&'a Lepton> {
        self.leptons.first()
    }
}

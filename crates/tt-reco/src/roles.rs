//! Decay roles of the four jets in a semileptonic tt interpretation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Role of a jet in the tt decay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecayJet {
    /// b jet from the semileptonically decaying top quark.
    BTopLep,
    /// b jet from the hadronically decaying top quark.
    BTopHad,
    /// First light-flavour jet from the hadronic W decay.
    Q1TopHad,
    /// Second light-flavour jet from the hadronic W decay.
    Q2TopHad,
}

impl DecayJet {
    /// All roles in the order used for storage.
    pub const ALL: [DecayJet; 4] = [
        DecayJet::BTopLep,
        DecayJet::BTopHad,
        DecayJet::Q1TopHad,
        DecayJet::Q2TopHad,
    ];

    /// Position of the role in [`DecayJet::ALL`].
    pub fn slot(self) -> usize {
        match self {
            DecayJet::BTopLep => 0,
            DecayJet::BTopHad => 1,
            DecayJet::Q1TopHad => 2,
            DecayJet::Q2TopHad => 3,
        }
    }
}

impl fmt::Display for DecayJet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DecayJet::BTopLep => "bTopLep",
            DecayJet::BTopHad => "bTopHad",
            DecayJet::Q1TopHad => "q1TopHad",
            DecayJet::Q2TopHad => "q2TopHad",
        };
        f.write_str(label)
    }
}

/// Indices into an event's jet collection, one per decay role.
///
/// Valid assignments use four distinct indices with `q1_top_had < q2_top_had`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleAssignment {
    /// Index of the leptonic-side b jet.
    pub b_top_lep: usize,
    /// Index of the hadronic-side b jet.
    pub b_top_had: usize,
    /// Index of the first light jet.
    pub q1_top_had: usize,
    /// Index of the second light jet.
    pub q2_top_had: usize,
}

impl RoleAssignment {
    /// Creates an assignment from jet indices.
    pub const fn new(
        b_top_lep: usize,
        b_top_had: usize,
        q1_top_had: usize,
        q2_top_had: usize,
    ) -> Self {
        Self {
            b_top_lep,
            b_top_had,
            q1_top_had,
            q2_top_had,
        }
    }

    /// Jet index filling `role`.
    pub fn index(&self, role: DecayJet) -> usize {
        self.indices()[role.slot()]
    }

    /// Indices ordered as [`DecayJet::ALL`].
    pub fn indices(&self) -> [usize; 4] {
        [
            self.b_top_lep,
            self.b_top_had,
            self.q1_top_had,
            self.q2_top_had,
        ]
    }

    /// Checks distinctness and the light-jet ordering convention.
    pub fn is_valid(&self) -> bool {
        let idx = self.indices();
        let distinct = (0..4).all(|i| (i + 1..4).all(|j| idx[i] != idx[j]));
        distinct && self.q1_top_had < self.q2_top_had
    }
}

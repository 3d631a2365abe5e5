//! Exhaustive search over jet-to-role assignments.

use crate::event::EventView;
use crate::ranker::InterpretationRanker;
use crate::roles::RoleAssignment;
use crate::selection::JetSelection;

/// Result of one search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SearchOutcome {
    /// Fewer than four jets passed the selection.
    InsufficientJets,
    /// No assignment obtained a rank above negative infinity.
    Exhausted,
    /// Best assignment and its rank.
    Found {
        /// Best assignment, first in enumeration order among equal ranks.
        assignment: RoleAssignment,
        /// Its rank.
        rank: f64,
    },
}

/// Enumerates role assignments over selected jets and keeps the best ranked one.
///
/// Assignments are visited with bTopLep in the outer loop, then bTopHad, then the
/// light-jet pair with `q1 < q2`. For `n` selected jets and no b-tag requirement
/// that is `n (n - 1) (n - 2) (n - 3) / 2` assignments.
#[derive(Debug, Clone, Default)]
pub struct JetAssignmentSearch {
    selection: JetSelection,
    selected: Vec<usize>,
    evaluated: usize,
}

impl JetAssignmentSearch {
    /// Creates a search with the given jet selection.
    pub fn new(selection: JetSelection) -> Self {
        Self {
            selection,
            selected: Vec::new(),
            evaluated: 0,
        }
    }

    /// Jet selection in use.
    pub fn selection(&self) -> &JetSelection {
        &self.selection
    }

    /// Indices of the jets selected in the last search.
    pub fn selected(&self) -> &[usize] {
        &self.selected
    }

    /// Number of assignments ranked in the last search.
    pub fn evaluated(&self) -> usize {
        self.evaluated
    }

    /// Runs the search for one event. The ranker must already be prepared for it.
    pub fn run<R>(&mut self, event: &EventView<'_>, ranker: &mut R) -> SearchOutcome
    where
        R: InterpretationRanker + ?Sized,
    {
        self.selection.select(event.jets, &mut self.selected);
        self.evaluated = 0;
        if self.selected.len() < 4 {
            return SearchOutcome::InsufficientJets;
        }

        let mut best: Option<RoleAssignment> = None;
        let mut best_rank = f64::NEG_INFINITY;
        let selected = &self.selected;

        for &b_lep in selected {
            for &b_had in selected {
                if b_had == b_lep
                    || !self
                        .selection
                        .accepts_b_pair(&event.jets[b_lep], &event.jets[b_had])
                {
                    continue;
                }
                for (pos, &q1) in selected.iter().enumerate() {
                    if q1 == b_lep || q1 == b_had {
                        continue;
                    }
                    for &q2 in &selected[pos + 1..] {
                        if q2 == b_lep || q2 == b_had {
                            continue;
                        }
                        let assignment = RoleAssignment::new(b_lep, b_had, q1, q2);
                        self.evaluated += 1;
                        let rank = ranker.rank(event, &assignment, best_rank);
                        if rank > best_rank {
                            best_rank = rank;
                            best = Some(assignment);
                        }
                    }
                }
            }
        }

        match best {
            Some(assignment) => SearchOutcome::Found {
                assignment,
                rank: best_rank,
            },
            None => SearchOutcome::Exhausted,
        }
    }
}

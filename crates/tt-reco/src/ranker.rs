//! Interface between the assignment search and the ranking strategies.

use tt_core::{FourMomentum, RecoError};

use crate::event::EventView;
use crate::roles::RoleAssignment;
use crate::status::ReconstructionStatus;

/// Scores role assignments of one event.
///
/// The search calls [`begin_event`](Self::begin_event) once, then
/// [`rank`](Self::rank) for every assignment, and finally reads
/// [`best_neutrino`](Self::best_neutrino) or [`diagnose_failure`](Self::diagnose_failure).
pub trait InterpretationRanker {
    /// Resets per-event state. Returns a status when the event cannot be reconstructed
    /// at all, before any assignment is tried.
    fn begin_event(
        &mut self,
        event: &EventView<'_>,
    ) -> Result<Option<ReconstructionStatus>, RecoError>;

    /// Rank of `assignment`; higher is better and negative infinity marks an assignment
    /// that cannot be evaluated. `best_rank` is the best rank seen so far in the event.
    fn rank(&mut self, event: &EventView<'_>, assignment: &RoleAssignment, best_rank: f64) -> f64;

    /// Neutrino belonging to the best ranked assignment so far.
    fn best_neutrino(&self) -> Option<FourMomentum>;

    /// Most specific failure status when no assignment obtained a finite rank.
    fn diagnose_failure(&self) -> ReconstructionStatus;
}

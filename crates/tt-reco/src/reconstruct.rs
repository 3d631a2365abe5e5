//! Per-event driver combining the search with a ranking strategy.

use std::sync::Arc;

use tracing::debug;
use tt_core::errors::RecoError;
use tt_core::FourMomentum;

use crate::chi2::Chi2Ranker;
use crate::config::{RankerConfig, RecoConfig};
use crate::event::EventView;
use crate::likelihood::LikelihoodRanker;
use crate::ranker::InterpretationRanker;
use crate::result::{Interpretation, ReconstructionResult};
use crate::roles::RoleAssignment;
use crate::search::{JetAssignmentSearch, SearchOutcome};
use crate::selection::JetSelection;
use crate::status::ReconstructionStatus;
use crate::tables::LikelihoodTables;

/// One of the two ranking strategies.
#[derive(Debug, Clone)]
pub enum Ranker {
    /// Chi-square ranking.
    Chi2(Chi2Ranker),
    /// Likelihood ranking.
    Likelihood(LikelihoodRanker),
}

impl Ranker {
    /// Builds the ranker described by `config`, loading likelihood tables from disk.
    pub fn from_config(config: &RankerConfig) -> Result<Self, RecoError> {
        match config {
            RankerConfig::Chi2(settings) => Ok(Ranker::Chi2(Chi2Ranker::new(settings)?)),
            RankerConfig::Likelihood(settings) => {
                let tables = LikelihoodTables::load(
                    &settings.tables,
                    &settings.neutrino_table,
                    &settings.mass_table,
                )?;
                Ok(Ranker::Likelihood(LikelihoodRanker::new(Arc::new(tables), settings)?))
            }
        }
    }
}

impl InterpretationRanker for Ranker {
    fn begin_event(
        &mut self,
        event: &EventView<'_>,
    ) -> Result<Option<ReconstructionStatus>, RecoError> {
        match self {
            Ranker::Chi2(ranker) => ranker.begin_event(event),
            Ranker::Likelihood(ranker) => ranker.begin_event(event),
        }
    }

    fn rank(&mut self, event: &EventView<'_>, assignment: &RoleAssignment, best_rank: f64) -> f64 {
        match self {
            Ranker::Chi2(ranker) => ranker.rank(event, assignment, best_rank),
            Ranker::Likelihood(ranker) => ranker.rank(event, assignment, best_rank),
        }
    }

    fn best_neutrino(&self) -> Option<FourMomentum> {
        match self {
            Ranker::Chi2(ranker) => ranker.best_neutrino(),
            Ranker::Likelihood(ranker) => ranker.best_neutrino(),
        }
    }

    fn diagnose_failure(&self) -> ReconstructionStatus {
        match self {
            Ranker::Chi2(ranker) => ranker.diagnose_failure(),
            Ranker::Likelihood(ranker) => ranker.diagnose_failure(),
        }
    }
}

/// Reconstructs events one at a time with its own search buffers and ranker state.
#[derive(Debug, Clone)]
pub struct Reconstructor {
    search: JetAssignmentSearch,
    ranker: Ranker,
}

impl Reconstructor {
    /// Combines a jet selection with a ranker.
    pub fn new(selection: JetSelection, ranker: Ranker) -> Self {
        Self {
            search: JetAssignmentSearch::new(selection),
            ranker,
        }
    }

    /// Builds a reconstructor from a validated configuration.
    pub fn from_config(config: &RecoConfig) -> Result<Self, RecoError> {
        config.validate()?;
        Ok(Self::new(config.selection, Ranker::from_config(&config.ranker)?))
    }

    /// Assignment search.
    pub fn search(&self) -> &JetAssignmentSearch {
        &self.search
    }

    /// Ranking strategy.
    pub fn ranker(&self) -> &Ranker {
        &self.ranker
    }

    /// Mutable access to the ranking strategy.
    pub fn ranker_mut(&mut self) -> &mut Ranker {
        &mut self.ranker
    }

    /// Reconstructs one event.
    ///
    /// Kinematic dead ends yield a result with a failure status. An `Err` means the
    /// inputs violate a precondition and the run should stop.
    pub fn process(&mut self, event: &EventView<'_>) -> Result<ReconstructionResult, RecoError> {
        if let Some(status) = self.ranker.begin_event(event)? {
            debug!(%status, "event rejected before the search");
            return Ok(ReconstructionResult::failed(status, 0));
        }

        let outcome = self.search.run(event, &mut self.ranker);
        let evaluated = self.search.evaluated();
        let result = match outcome {
            SearchOutcome::InsufficientJets => {
                ReconstructionResult::failed(ReconstructionStatus::InsufficientJets, evaluated)
            }
            SearchOutcome::Exhausted => {
                ReconstructionResult::failed(self.ranker.diagnose_failure(), evaluated)
            }
            SearchOutcome::Found { assignment, rank } => {
                let neutrino = self.ranker.best_neutrino().ok_or_else(|| {
                    RecoError::precondition(
                        "missing_best_neutrino",
                        "ranker accepted an assignment without recording its neutrino",
                    )
                })?;
                let lepton = *event.leading_lepton().ok_or_else(|| {
                    RecoError::precondition("missing_lepton", "ranked an event without leptons")
                })?;
                let interpretation = Interpretation {
                    assignment,
                    jets: assignment.indices().map(|idx| event.jets[idx]),
                    lepton,
                    neutrino,
                    rank,
                };
                ReconstructionResult::success(interpretation, evaluated)
            }
        };
        debug!(
            status = %result.status(),
            rank = result.rank(),
            evaluated,
            "event reconstructed"
        );
        Ok(result)
    }
}

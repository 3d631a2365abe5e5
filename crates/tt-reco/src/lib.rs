#![deny(missing_docs)]
#![doc = "Semileptonic tt reconstruction: jet assignment search and its ranking strategies."]

pub mod batch;
pub mod chi2;
pub mod config;
pub mod event;
pub mod likelihood;
pub mod observables;
pub mod ranker;
pub mod reconstruct;
pub mod result;
pub mod roles;
pub mod search;
pub mod selection;
pub mod status;
pub mod tables;
pub mod toy;

pub use batch::{reconstruct_batch, reconstruct_with, BatchSummary};
pub use chi2::{Chi2Ranker, Chi2Settings, Chi2Term, Expression, Hypothesis};
pub use config::{RankerConfig, RecoConfig};
pub use event::{Event, EventView};
pub use likelihood::{LikelihoodFlags, LikelihoodRanker, LikelihoodSettings};
pub use observables::TtObservables;
pub use ranker::InterpretationRanker;
pub use reconstruct::{Ranker, Reconstructor};
pub use result::{Interpretation, ReconstructionResult};
pub use roles::{DecayJet, RoleAssignment};
pub use search::{JetAssignmentSearch, SearchOutcome};
pub use selection::{BTagMode, BTagRequirement, JetSelection};
pub use status::ReconstructionStatus;
pub use tables::{LikelihoodTables, TableFile, TableSpec};
pub use toy::{ToyEvent, ToyGenerator, ToySettings};

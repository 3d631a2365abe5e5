#![deny(missing_docs)]
#![doc = "Core value types for semileptonic tt reconstruction: kinematics, density tables, errors."]

pub mod density;
pub mod errors;
pub mod hash;
pub mod kinematics;
pub mod rng;
pub mod serde;

pub use density::{AxisBin, BinnedAxis, Density1D, Density2D, DensityLookup};
pub use errors::{ErrorInfo, RecoError};
pub use hash::stable_hash_string;
pub use kinematics::{FourMomentum, Jet, Lepton, LeptonFlavour, MissingMomentum};
pub use rng::{derive_substream_seed, RngHandle};

pub use crate::serde::{from_json_slice, from_yaml_slice, to_canonical_json_bytes, to_yaml_string};

/// Mass of the W boson used by the mass-constraint neutrino solver.
pub const W_MASS: f64 = 80.419;

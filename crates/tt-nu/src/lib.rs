#![deny(missing_docs)]
#![doc = "Neutrino momentum solvers: the W-mass constraint quadratic and the W/top mass ellipse."]

pub mod ellipse;
pub mod mass_constraint;

pub use ellipse::{EllipseSolution, EllipseSolver, MetCovariance, UNSOLVED_FIGURE_OF_MERIT};
pub use mass_constraint::{
    MassConstraintBranch, MassConstraintSolution, MassConstraintSolver, MetAdjustment,
    QuadraticCoefficients,
};

//! Neutrino reconstruction from the W-boson mass constraint alone.
//!
//! The longitudinal neutrino momentum solves `a pz^2 + b pz + c = 0`, which follows
//! from `m(l + nu) = m_W` with the neutrino transverse momentum set to the measured
//! MET. When the equation has no real roots the magnitude of MET is rescaled, keeping
//! its direction, to the value that makes the discriminant vanish.

use serde::{Deserialize, Serialize};
use tracing::trace;
use tt_core::errors::{ErrorInfo, RecoError};
use tt_core::{FourMomentum, MissingMomentum, W_MASS};

/// Coefficients of the quadratic equation for the neutrino longitudinal momentum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuadraticCoefficients {
    /// Quadratic coefficient.
    pub a: f64,
    /// Linear coefficient.
    pub b: f64,
    /// Constant term.
    pub c: f64,
    /// Constraint term combining the W mass and the transverse products.
    pub lambda: f64,
}

impl QuadraticCoefficients {
    /// Builds the coefficients for a lepton and a neutrino transverse momentum.
    pub fn new(lepton: &FourMomentum, nu_px: f64, nu_py: f64, w_mass: f64) -> Self {
        let lambda = (w_mass * w_mass - lepton.mass_squared()
            + 2.0 * (nu_px * lepton.px + nu_py * lepton.py))
            / (2.0 * lepton.e);
        let ratio = lepton.pz / lepton.e;
        let a = 1.0 - ratio * ratio;
        let b = -2.0 * ratio * lambda;
        let c = nu_px * nu_px + nu_py * nu_py - lambda * lambda;
        Self { a, b, c, lambda }
    }

    /// Discriminant `b^2 - 4ac`.
    pub fn discriminant(&self) -> f64 {
        self.b * self.b - 4.0 * self.a * self.c
    }

    /// Value of the quadratic polynomial at `pz`.
    pub fn residual(&self, pz: f64) -> f64 {
        (self.a * pz + self.b) * pz + self.c
    }
}

/// Coefficients of `u met^2 + v met + w = 0` giving the MET magnitudes at which the
/// discriminant of the `pz` equation vanishes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetAdjustment {
    /// Quadratic coefficient.
    pub u: f64,
    /// Linear coefficient.
    pub v: f64,
    /// Constant term.
    pub w: f64,
}

impl MetAdjustment {
    /// Builds the coefficients for a lepton and the azimuth of MET.
    pub fn new(lepton: &FourMomentum, met_phi: f64, w_mass: f64) -> Self {
        // Projection of the lepton transverse momentum onto the MET direction.
        let gamma = lepton.px * met_phi.cos() + lepton.py * met_phi.sin();
        let e = lepton.e;
        let mass_term = w_mass * w_mass - lepton.mass_squared();
        let u = (lepton.pz / e).powi(2) + (gamma / e).powi(2) - 1.0;
        let v = gamma * mass_term / (e * e);
        let w = (mass_term / (2.0 * e)).powi(2);
        Self { u, v, w }
    }

    /// Discriminant `v^2 - 4uw`.
    pub fn discriminant(&self) -> f64 {
        self.v * self.v - 4.0 * self.u * self.w
    }
}

/// Branch of the solver that produced the candidates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MassConstraintBranch {
    /// Positive discriminant; two real roots.
    TwoRoots,
    /// Vanishing quadratic coefficient; unique root of the linear equation.
    Linear,
    /// Discriminant exactly zero; one double root.
    Degenerate,
    /// Negative discriminant; MET magnitude rescaled to `met`.
    AdjustedMet {
        /// Adjusted MET magnitude.
        met: f64,
    },
    /// Negative discriminant and no positive MET magnitude restores a solution.
    NoSolution,
}

/// Neutrino candidates produced for one lepton and MET.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MassConstraintSolution {
    /// Zero, one or two neutrino candidates.
    pub candidates: Vec<FourMomentum>,
    /// Branch that produced the candidates.
    pub branch: MassConstraintBranch,
}

/// Solver imposing `m(l + nu) = m_W` on the neutrino.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MassConstraintSolver {
    w_mass: f64,
}

impl Default for MassConstraintSolver {
    fn default() -> Self {
        Self::new(W_MASS)
    }
}

impl MassConstraintSolver {
    /// Creates a solver with the given W-boson mass.
    pub fn new(w_mass: f64) -> Self {
        Self { w_mass }
    }

    /// W-boson mass used in the constraint.
    pub fn w_mass(&self) -> f64 {
        self.w_mass
    }

    /// Solves for the neutrino candidates.
    ///
    /// Physically ill-posed inputs never fail: they produce zero candidates. An error is
    /// returned only for inconsistent input, when the equation degenerates to a linear one
    /// with a vanishing slope.
    pub fn solve(
        &self,
        lepton: &FourMomentum,
        met: &MissingMomentum,
    ) -> Result<MassConstraintSolution, RecoError> {
        let coeffs = QuadraticCoefficients::new(lepton, met.px, met.py, self.w_mass);

        if coeffs.a == 0.0 {
            if coeffs.b == 0.0 {
                return Err(RecoError::Precondition(
                    ErrorInfo::new(
                        "linear_zero_slope",
                        "neutrino pz equation is linear with a vanishing slope",
                    )
                    .with_context("c", coeffs.c),
                ));
            }
            let pz = -coeffs.c / coeffs.b;
            return Ok(MassConstraintSolution {
                candidates: vec![FourMomentum::massless(met.px, met.py, pz)],
                branch: MassConstraintBranch::Linear,
            });
        }

        let discriminant = coeffs.discriminant();
        if discriminant > 0.0 {
            let sqrt_disc = discriminant.sqrt();
            let candidates = [-sqrt_disc, sqrt_disc]
                .into_iter()
                .map(|root| {
                    FourMomentum::massless(met.px, met.py, (-coeffs.b + root) / (2.0 * coeffs.a))
                })
                .collect();
            return Ok(MassConstraintSolution {
                candidates,
                branch: MassConstraintBranch::TwoRoots,
            });
        }
        if discriminant == 0.0 {
            let pz = -coeffs.b / (2.0 * coeffs.a);
            return Ok(MassConstraintSolution {
                candidates: vec![FourMomentum::massless(met.px, met.py, pz)],
                branch: MassConstraintBranch::Degenerate,
            });
        }

        let Some(adjusted) = self.adjusted_met(lepton, met)? else {
            trace!(
                met = met.pt(),
                "no positive MET magnitude restores a real pz root"
            );
            return Ok(MassConstraintSolution {
                candidates: Vec::new(),
                branch: MassConstraintBranch::NoSolution,
            });
        };

        trace!(
            measured = met.pt(),
            adjusted,
            "rescaled MET to restore a real pz root"
        );
        let phi = met.phi();
        let (nu_px, nu_py) = (adjusted * phi.cos(), adjusted * phi.sin());
        let coeffs = QuadraticCoefficients::new(lepton, nu_px, nu_py, self.w_mass);
        let pz = -coeffs.b / (2.0 * coeffs.a);
        Ok(MassConstraintSolution {
            candidates: vec![FourMomentum::massless(nu_px, nu_py, pz)],
            branch: MassConstraintBranch::AdjustedMet { met: adjusted },
        })
    }

    /// Finds the MET magnitude, along the measured MET direction, at which the
    /// discriminant of the `pz` equation vanishes. Returns `None` when no positive
    /// magnitude exists.
    pub fn adjusted_met(
        &self,
        lepton: &FourMomentum,
        met: &MissingMomentum,
    ) -> Result<Option<f64>, RecoError> {
        let adjustment = MetAdjustment::new(lepton, met.phi(), self.w_mass);
        let MetAdjustment { u, v, w } = adjustment;

        if u == 0.0 {
            if v == 0.0 {
                return Err(RecoError::Precondition(
                    ErrorInfo::new(
                        "met_linear_zero_slope",
                        "MET adjustment equation is linear with a vanishing slope",
                    )
                    .with_context("w", w),
                ));
            }
            let root = -w / v;
            return Ok((root > 0.0).then_some(root));
        }

        let mut discriminant = adjustment.discriminant();
        if discriminant < 0.0 {
            // Non-negative for any physical lepton; tolerate rounding only.
            let scale = v * v + (4.0 * u * w).abs();
            if discriminant < -1e-12 * scale {
                return Err(RecoError::Precondition(
                    ErrorInfo::new(
                        "met_negative_discriminant",
                        "MET adjustment equation has no real roots",
                    )
                    .with_context("discriminant", discriminant),
                ));
            }
            discriminant = 0.0;
        }

        let sqrt_disc = discriminant.sqrt();
        let roots = ((-v - sqrt_disc) / (2.0 * u), (-v + sqrt_disc) / (2.0 * u));
        Ok(choose_met_root(met.pt(), roots))
    }
}

/// Picks a positive root, preferring the one closest to the measured magnitude.
pub(crate) fn choose_met_root(measured: f64, (met1, met2): (f64, f64)) -> Option<f64> {
    match (met1 > 0.0, met2 > 0.0) {
        (true, true) => {
            if (measured - met1).abs() < (measured - met2).abs() {
                Some(met1)
            } else {
                Some(met2)
            }
        }
        (true, false) => Some(met1),
        (false, true) => Some(met2),
        (false, false) => None,
    }
}

//! Neutrino reconstruction on the ellipse of momenta allowed by the W and top masses.
//!
//! For a given lepton and b-jet, every massless neutrino with `m(l + nu) = m_W` and
//! `m(l + b + nu) = m_t` lies on an ellipse in momentum space. The ellipse is built in
//! a frame where the lepton points along `+x` and the b-jet lies in the `xy` half-plane
//! with `y > 0`, then rotated back to the lab with the inverse of
//! `R = Rx(c) Ry(pi/2 - theta_l) Rz(-phi_l)`. Points are `nu(t) = H (cos t, sin t, 1)`.
//!
//! The solution reported for an event is the point whose transverse momentum is
//! closest to the measured MET in the metric given by the inverse MET covariance.

use std::f64::consts::TAU;

use nalgebra::{Matrix2, Matrix3, Vector2, Vector3};
use serde::{Deserialize, Serialize};
use tt_core::errors::{ErrorInfo, RecoError};
use tt_core::{FourMomentum, MissingMomentum};

/// Figure of merit reported when no neutrino satisfies both mass constraints.
pub const UNSOLVED_FIGURE_OF_MERIT: f64 = -1.0;

const GRID_POINTS: usize = 64;
const GOLDEN_ITERATIONS: usize = 80;
const GOLDEN_TOLERANCE: f64 = 1e-12;

fn default_sigma() -> f64 {
    1.0
}

/// Resolution of the measured missing transverse momentum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetCovariance {
    /// Standard deviation of the x component.
    #[serde(default = "default_sigma")]
    pub sigma_x: f64,
    /// Standard deviation of the y component.
    #[serde(default = "default_sigma")]
    pub sigma_y: f64,
    /// Correlation coefficient between the components.
    #[serde(default)]
    pub rho: f64,
}

impl Default for MetCovariance {
    fn default() -> Self {
        Self::identity()
    }
}

impl MetCovariance {
    /// Unit covariance; the figure of merit becomes the squared Euclidean distance.
    pub fn identity() -> Self {
        Self {
            sigma_x: 1.0,
            sigma_y: 1.0,
            rho: 0.0,
        }
    }

    /// Covariance matrix of the MET components.
    pub fn covariance(&self) -> Matrix2<f64> {
        let off = self.rho * self.sigma_x * self.sigma_y;
        Matrix2::new(
            self.sigma_x * self.sigma_x,
            off,
            off,
            self.sigma_y * self.sigma_y,
        )
    }

    /// Inverse of the covariance matrix.
    pub fn precision(&self) -> Result<Matrix2<f64>, RecoError> {
        let valid_sigma = |sigma: f64| sigma.is_finite() && sigma > 0.0;
        if !valid_sigma(self.sigma_x) || !valid_sigma(self.sigma_y) || !(self.rho.abs() < 1.0) {
            return Err(RecoError::Config(
                ErrorInfo::new(
                    "singular_met_covariance",
                    "MET covariance is not invertible",
                )
                .with_context("sigma_x", self.sigma_x)
                .with_context("sigma_y", self.sigma_y)
                .with_context("rho", self.rho)
                .with_hint("use positive widths and |rho| < 1"),
            ));
        }
        self.covariance().try_inverse().ok_or_else(|| {
            RecoError::config(
                "singular_met_covariance",
                "MET covariance is not invertible",
            )
        })
    }
}

/// Minimising point on the ellipse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EllipseSolution {
    /// Neutrino four-momentum; zero when unsolved.
    pub neutrino: FourMomentum,
    /// Weighted squared distance to MET, or [`UNSOLVED_FIGURE_OF_MERIT`].
    pub figure_of_merit: f64,
    /// Ellipse parameter of the solution in `[0, 2 pi)`.
    pub parameter: f64,
}

impl EllipseSolution {
    /// Sentinel solution for unreconstructable inputs.
    pub fn unsolved() -> Self {
        Self {
            neutrino: FourMomentum::zero(),
            figure_of_merit: UNSOLVED_FIGURE_OF_MERIT,
            parameter: 0.0,
        }
    }

    /// Whether the solution carries a neutrino.
    pub fn is_solved(&self) -> bool {
        self.figure_of_merit >= 0.0
    }

    /// Square root of the figure of merit, if solved.
    pub fn distance(&self) -> Option<f64> {
        self.is_solved().then(|| self.figure_of_merit.sqrt())
    }
}

/// Ellipse of neutrino momenta compatible with one lepton and one b-jet.
#[derive(Debug, Clone, PartialEq)]
pub struct EllipseSolver {
    h: Matrix3<f64>,
    reconstructable: bool,
}

impl EllipseSolver {
    /// Builds the ellipse for a lepton and a b-jet under the given W and top masses.
    ///
    /// Never fails: degenerate geometry yields an unreconstructable solver.
    pub fn new(lepton: &FourMomentum, b_jet: &FourMomentum, w_mass: f64, top_mass: f64) -> Self {
        match ellipse_matrix(lepton, b_jet, w_mass, top_mass) {
            Some(h) => Self {
                h,
                reconstructable: true,
            },
            None => Self {
                h: Matrix3::zeros(),
                reconstructable: false,
            },
        }
    }

    /// Whether any neutrino satisfies both mass constraints.
    pub fn is_reconstructable(&self) -> bool {
        self.reconstructable
    }

    /// Lab-frame ellipse matrix `H`; zero when unreconstructable.
    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.h
    }

    /// Massless neutrino at parameter `t`.
    pub fn point(&self, t: f64) -> FourMomentum {
        let p = self.h * Vector3::new(t.cos(), t.sin(), 1.0);
        FourMomentum::massless(p[0], p[1], p[2])
    }

    fn transverse(&self, t: f64) -> Vector2<f64> {
        let (sin, cos) = t.sin_cos();
        Vector2::new(
            self.h[(0, 0)] * cos + self.h[(0, 1)] * sin + self.h[(0, 2)],
            self.h[(1, 0)] * cos + self.h[(1, 1)] * sin + self.h[(1, 2)],
        )
    }

    /// Weighted squared distance between `nu_T(t)` and MET.
    pub fn figure_of_merit(&self, t: f64, met: &MissingMomentum, precision: &Matrix2<f64>) -> f64 {
        chi2(self.transverse(t) - Vector2::new(met.px, met.py), precision)
    }

    /// Finds the point minimising the figure of merit over the whole ellipse.
    ///
    /// A coarse scan locates every local minimum on a regular grid of `t`; each is
    /// refined with a golden-section search inside its neighbouring grid cells.
    pub fn best(&self, met: &MissingMomentum, precision: &Matrix2<f64>) -> EllipseSolution {
        if !self.reconstructable {
            return EllipseSolution::unsolved();
        }
        let objective = |t: f64| self.figure_of_merit(t, met, precision);
        let step = TAU / GRID_POINTS as f64;
        let samples: Vec<f64> = (0..GRID_POINTS)
            .map(|idx| objective(idx as f64 * step))
            .collect();

        let mut best_t = 0.0;
        let mut best_value = f64::INFINITY;
        for (idx, &value) in samples.iter().enumerate() {
            let prev = samples[(idx + GRID_POINTS - 1) % GRID_POINTS];
            let next = samples[(idx + 1) % GRID_POINTS];
            if value > prev || value > next {
                continue;
            }
            let centre = idx as f64 * step;
            let (t, refined) = golden_section(&objective, centre - step, centre + step);
            let (t, refined) = if refined <= value {
                (t, refined)
            } else {
                (centre, value)
            };
            if refined < best_value {
                best_t = t;
                best_value = refined;
            }
        }

        if !best_value.is_finite() {
            return EllipseSolution::unsolved();
        }
        let parameter = best_t.rem_euclid(TAU);
        EllipseSolution {
            neutrino: self.point(parameter),
            figure_of_merit: best_value.max(0.0),
            parameter,
        }
    }
}

fn chi2(delta: Vector2<f64>, precision: &Matrix2<f64>) -> f64 {
    delta.dot(&(precision * delta))
}

fn golden_section(objective: &impl Fn(f64) -> f64, mut low: f64, mut high: f64) -> (f64, f64) {
    let ratio = (5f64.sqrt() - 1.0) / 2.0;
    let mut left = high - ratio * (high - low);
    let mut right = low + ratio * (high - low);
    let mut f_left = objective(left);
    let mut f_right = objective(right);
    for _ in 0..GOLDEN_ITERATIONS {
        if high - low < GOLDEN_TOLERANCE {
            break;
        }
        if f_left <= f_right {
            high = right;
            right = left;
            f_right = f_left;
            left = high - ratio * (high - low);
            f_left = objective(left);
        } else {
            low = left;
            left = right;
            f_left = f_right;
            right = low + ratio * (high - low);
            f_right = objective(right);
        }
    }
    if f_left <= f_right {
        (left, f_left)
    } else {
        (right, f_right)
    }
}

fn rotation_x(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(1.0, 0.0, 0.0, 0.0, c, -s, 0.0, s, c)
}

fn rotation_y(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(c, 0.0, s, 0.0, 1.0, 0.0, -s, 0.0, c)
}

fn rotation_z(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(c, -s, 0.0, s, c, 0.0, 0.0, 0.0, 1.0)
}

fn vector(p4: &FourMomentum) -> Vector3<f64> {
    Vector3::new(p4.px, p4.py, p4.pz)
}

/// Rotation taking the lepton to `+x` and the b-jet into the `xy` plane with `y >= 0`.
fn frame_rotation(lepton: &FourMomentum, b_jet: &FourMomentum) -> Matrix3<f64> {
    let align = rotation_y(lepton.pz.atan2(lepton.pt())) * rotation_z(-lepton.phi());
    let b = align * vector(b_jet);
    rotation_x(-b[2].atan2(b[1])) * align
}

fn ellipse_matrix(
    lepton: &FourMomentum,
    b_jet: &FourMomentum,
    w_mass: f64,
    top_mass: f64,
) -> Option<Matrix3<f64>> {
    if !(lepton.e > 0.0) || (*lepton + *b_jet).mass() > top_mass {
        return None;
    }
    let rotation = frame_rotation(lepton, b_jet);
    let p_l = (rotation * vector(lepton))[0];
    let b = rotation * vector(b_jet);
    let (bx, by) = (b[0], b[1]);
    if !(p_l > 0.0) || !(by > 1e-9 * b_jet.p().max(1.0)) {
        return None;
    }

    let (e_l, e_b) = (lepton.e, b_jet.e);
    let w2 = w_mass * w_mass;
    let lepton_m2 = lepton.mass_squared().max(0.0);
    let b_m2 = b_jet.mass_squared().max(0.0);

    // W constraint: E_nu = a_w + beta_l x.
    let beta_l = p_l / e_l;
    let a_w = (w2 - lepton_m2) / (2.0 * e_l);
    // Top constraint: y = omega x + y0.
    let k_top = (top_mass * top_mass - w2 - b_m2) / 2.0;
    let omega = (e_b * beta_l - bx) / by;
    let y0 = (e_b * (a_w + e_l) - bx * p_l - k_top) / by;

    // z^2 = -alpha (x - x_c)^2 + z2
    let alpha = 1.0 - beta_l * beta_l + omega * omega;
    if !(alpha > 0.0) {
        return None;
    }
    let linear = a_w * beta_l - omega * y0;
    let x_c = linear / alpha;
    let z2 = a_w * a_w - y0 * y0 + linear * linear / alpha;
    if !(z2 >= 0.0) {
        return None;
    }
    let z = z2.sqrt();
    let half_x = z / alpha.sqrt();

    let frame = Matrix3::new(
        half_x,
        0.0,
        x_c,
        omega * half_x,
        0.0,
        omega * x_c + y0,
        0.0,
        z,
        0.0,
    );
    let h = rotation.transpose() * frame;
    h.iter().all(|value| value.is_finite()).then_some(h)
}

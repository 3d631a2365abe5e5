//! Relativistic kinematics value types used by the reconstruction.

use std::f64::consts::PI;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub};

use serde::{Deserialize, Serialize};

/// Four-momentum in natural units, stored as Cartesian components.
///
/// Derived quantities (mass, transverse momentum, pseudorapidity, angular separations)
/// are pure functions of the four components.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FourMomentum {
    /// Momentum x component.
    pub px: f64,
    /// Momentum y component.
    pub py: f64,
    /// Momentum z component (along the beam).
    pub pz: f64,
    /// Energy.
    pub e: f64,
}

impl FourMomentum {
    /// Creates a four-momentum from Cartesian components.
    pub const fn new(px: f64, py: f64, pz: f64, e: f64) -> Self {
        Self { px, py, pz, e }
    }

    /// Creates a four-momentum with all components set to zero.
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Creates a four-momentum from transverse momentum, pseudorapidity, azimuth and mass.
    pub fn from_pt_eta_phi_m(pt: f64, eta: f64, phi: f64, mass: f64) -> Self {
        let px = pt * phi.cos();
        let py = pt * phi.sin();
        let pz = pt * eta.sinh();
        let p2 = px * px + py * py + pz * pz;
        let e = if mass >= 0.0 {
            (p2 + mass * mass).sqrt()
        } else {
            (p2 - mass * mass).max(0.0).sqrt()
        };
        Self::new(px, py, pz, e)
    }

    /// Creates a massless four-momentum with the given three-momentum.
    pub fn massless(px: f64, py: f64, pz: f64) -> Self {
        Self::new(px, py, pz, (px * px + py * py + pz * pz).sqrt())
    }

    /// Returns the three-momentum as an array.
    pub fn p3(&self) -> [f64; 3] {
        [self.px, self.py, self.pz]
    }

    /// Magnitude of the three-momentum.
    pub fn p(&self) -> f64 {
        (self.px * self.px + self.py * self.py + self.pz * self.pz).sqrt()
    }

    /// Transverse momentum.
    pub fn pt(&self) -> f64 {
        self.px.hypot(self.py)
    }

    /// Azimuthal angle in `(-pi, pi]`; zero for a vanishing transverse momentum.
    pub fn phi(&self) -> f64 {
        if self.px == 0.0 && self.py == 0.0 {
            0.0
        } else {
            self.py.atan2(self.px)
        }
    }

    /// Polar angle with respect to the beam axis.
    pub fn theta(&self) -> f64 {
        if self.px == 0.0 && self.py == 0.0 && self.pz == 0.0 {
            0.0
        } else {
            self.pt().atan2(self.pz)
        }
    }

    /// Pseudorapidity. Infinite for momenta parallel to the beam axis.
    pub fn eta(&self) -> f64 {
        let pt = self.pt();
        if pt == 0.0 {
            return if self.pz > 0.0 {
                f64::INFINITY
            } else if self.pz < 0.0 {
                f64::NEG_INFINITY
            } else {
                0.0
            };
        }
        (self.pz / pt).asinh()
    }

    /// Rapidity along the beam axis.
    pub fn rapidity(&self) -> f64 {
        0.5 * ((self.e + self.pz) / (self.e - self.pz)).ln()
    }

    /// Invariant mass squared; may be slightly negative through rounding.
    pub fn mass_squared(&self) -> f64 {
        self.e * self.e - self.px * self.px - self.py * self.py - self.pz * self.pz
    }

    /// Invariant mass. A negative mass squared yields `-sqrt(-m2)`.
    pub fn mass(&self) -> f64 {
        let m2 = self.mass_squared();
        if m2 < 0.0 {
            -(-m2).sqrt()
        } else {
            m2.sqrt()
        }
    }

    /// Minkowski product with metric (+, -, -, -).
    pub fn dot(&self, other: &Self) -> f64 {
        self.e * other.e - self.px * other.px - self.py * other.py - self.pz * other.pz
    }

    /// Azimuthal separation wrapped into `[-pi, pi]`.
    pub fn delta_phi(&self, other: &Self) -> f64 {
        let mut dphi = self.phi() - other.phi();
        while dphi > PI {
            dphi -= 2.0 * PI;
        }
        while dphi < -PI {
            dphi += 2.0 * PI;
        }
        dphi
    }

    /// Angular separation in the (eta, phi) plane.
    pub fn delta_r(&self, other: &Self) -> f64 {
        let deta = self.eta() - other.eta();
        deta.hypot(self.delta_phi(other))
    }

    /// Velocity vector `p / E` of the frame in which this momentum is at rest.
    pub fn boost_vector(&self) -> [f64; 3] {
        [self.px / self.e, self.py / self.e, self.pz / self.e]
    }

    /// Applies a Lorentz boost with velocity `beta`.
    pub fn boost(&self, beta: [f64; 3]) -> Self {
        let [bx, by, bz] = beta;
        let b2 = bx * bx + by * by + bz * bz;
        let gamma = 1.0 / (1.0 - b2).sqrt();
        let bp = bx * self.px + by * self.py + bz * self.pz;
        let gamma2 = if b2 > 0.0 { (gamma - 1.0) / b2 } else { 0.0 };
        Self::new(
            self.px + gamma2 * bp * bx + gamma * bx * self.e,
            self.py + gamma2 * bp * by + gamma * by * self.e,
            self.pz + gamma2 * bp * bz + gamma * bz * self.e,
            gamma * (self.e + bp),
        )
    }

    /// Cosine of the angle between the three-momenta of two four-momenta.
    pub fn cos_angle(&self, other: &Self) -> f64 {
        let denom = self.p() * other.p();
        if denom == 0.0 {
            return 1.0;
        }
        (self.px * other.px + self.py * other.py + self.pz * other.pz) / denom
    }
}

impl Add for FourMomentum {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(
            self.px + other.px,
            self.py + other.py,
            self.pz + other.pz,
            self.e + other.e,
        )
    }
}

impl AddAssign for FourMomentum {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sub for FourMomentum {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(
            self.px - other.px,
            self.py - other.py,
            self.pz - other.pz,
            self.e - other.e,
        )
    }
}

impl Neg for FourMomentum {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.px, -self.py, -self.pz, -self.e)
    }
}

impl Sum for FourMomentum {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), Add::add)
    }
}

/// Reconstructed jet: four-momentum plus b-tagging discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Jet {
    /// Jet four-momentum.
    pub p4: FourMomentum,
    /// Output of the b-tagging algorithm; larger means more b-like.
    #[serde(default)]
    pub b_tag: f64,
}

impl Jet {
    /// Creates a jet from its four-momentum and b-tag discriminant.
    pub fn new(p4: FourMomentum, b_tag: f64) -> Self {
        Self { p4, b_tag }
    }

    /// Transverse momentum of the jet.
    pub fn pt(&self) -> f64 {
        self.p4.pt()
    }

    /// Pseudorapidity of the jet.
    pub fn eta(&self) -> f64 {
        self.p4.eta()
    }
}

/// Charged lepton flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LeptonFlavour {
    /// Electron or positron.
    Electron,
    /// Muon or antimuon.
    #[default]
    Muon,
}

/// Reconstructed charged lepton.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lepton {
    /// Lepton four-momentum.
    pub p4: FourMomentum,
    /// Lepton flavour.
    #[serde(default)]
    pub flavour: LeptonFlavour,
}

impl Lepton {
    /// Creates a lepton from its four-momentum and flavour.
    pub fn new(p4: FourMomentum, flavour: LeptonFlavour) -> Self {
        Self { p4, flavour }
    }

    /// Transverse momentum of the lepton.
    pub fn pt(&self) -> f64 {
        self.p4.pt()
    }
}

/// Missing transverse momentum of an event.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MissingMomentum {
    /// x component.
    pub px: f64,
    /// y component.
    pub py: f64,
}

impl MissingMomentum {
    /// Creates a missing momentum from its Cartesian components.
    pub const fn new(px: f64, py: f64) -> Self {
        Self { px, py }
    }

    /// Creates a missing momentum from magnitude and azimuth.
    pub fn from_pt_phi(pt: f64, phi: f64) -> Self {
        Self::new(pt * phi.cos(), pt * phi.sin())
    }

    /// Magnitude of the missing transverse momentum.
    pub fn pt(&self) -> f64 {
        self.px.hypot(self.py)
    }

    /// Azimuthal direction.
    pub fn phi(&self) -> f64 {
        if self.px == 0.0 && self.py == 0.0 {
            0.0
        } else {
            self.py.atan2(self.px)
        }
    }

    /// Massless four-momentum with vanishing longitudinal component.
    pub fn p4(&self) -> FourMomentum {
        FourMomentum::massless(self.px, self.py, 0.0)
    }
}

use proptest::prelude::*;
use std::f64::consts::{PI, TAU};
use tt_core::{FourMomentum, MissingMomentum, RecoError};
use tt_nu::{EllipseSolver, MetCovariance, UNSOLVED_FIGURE_OF_MERIT};

const W: f64 = 80.0;
const TOP: f64 = 173.0;

fn two_body(
    parent: FourMomentum,
    m1: f64,
    m2: f64,
    theta: f64,
    phi: f64,
) -> (FourMomentum, FourMomentum) {
    let m = parent.mass();
    let p = ((m * m - (m1 + m2).powi(2)) * (m * m - (m1 - m2).powi(2))).sqrt() / (2.0 * m);
    let dir = [
        theta.sin() * phi.cos(),
        theta.sin() * phi.sin(),
        theta.cos(),
    ];
    let first = FourMomentum::new(p * dir[0], p * dir[1], p * dir[2], (p * p + m1 * m1).sqrt());
    let second = FourMomentum::new(-first.px, -first.py, -first.pz, (p * p + m2 * m2).sqrt());
    let beta = parent.boost_vector();
    (first.boost(beta), second.boost(beta))
}

/// Returns (lepton, b, neutrino) from a leptonic top decay.
fn leptonic_top(
    pt: f64,
    eta: f64,
    phi: f64,
    decay: (f64, f64, f64, f64),
) -> (FourMomentum, FourMomentum, FourMomentum) {
    let top = FourMomentum::from_pt_eta_phi_m(pt, eta, phi, TOP);
    let (w, b) = two_body(top, W, 4.8, decay.0, decay.1);
    let (lepton, nu) = two_body(w, 0.0, 0.0, decay.2, decay.3);
    (lepton, b, nu)
}

#[test]
fn true_neutrino_is_recovered_from_exact_met() {
    let (lepton, b, nu) = leptonic_top(80.0, 0.4, 0.5, (1.0, 0.3, 2.0, -1.0));
    let solver = EllipseSolver::new(&lepton, &b, W, TOP);
    assert!(solver.is_reconstructable());

    let precision = MetCovariance::identity().precision().expect("precision");
    let solution = solver.best(&MissingMomentum::new(nu.px, nu.py), &precision);
    assert!(solution.is_solved());
    assert!(
        solution.figure_of_merit < 1e-8,
        "fom {}",
        solution.figure_of_merit
    );
    assert!((solution.neutrino.px - nu.px).abs() < 1e-3);
    assert!((solution.neutrino.py - nu.py).abs() < 1e-3);
    assert!((solution.neutrino.pz - nu.pz).abs() < 1e-3);
    assert!((0.0..TAU).contains(&solution.parameter));
}

#[test]
fn minimum_beats_a_dense_scan() {
    let (lepton, b, nu) = leptonic_top(150.0, -1.1, 2.4, (2.2, 1.7, 0.6, 2.9));
    let solver = EllipseSolver::new(&lepton, &b, W, TOP);
    let met = MissingMomentum::new(nu.px + 25.0, nu.py - 40.0);
    let precision = MetCovariance {
        sigma_x: 12.0,
        sigma_y: 18.0,
        rho: 0.3,
    }
    .precision()
    .expect("precision");
    let solution = solver.best(&met, &precision);
    for step in 0..2000 {
        let t = step as f64 * TAU / 2000.0;
        assert!(solution.figure_of_merit <= solver.figure_of_merit(t, &met, &precision) + 1e-9);
    }
}

#[test]
fn identity_covariance_is_squared_euclidean_distance() {
    let (lepton, b, _) = leptonic_top(60.0, 0.2, -1.0, (0.8, 2.0, 1.3, 0.1));
    let solver = EllipseSolver::new(&lepton, &b, W, TOP);
    let precision = MetCovariance::identity().precision().expect("precision");
    let met = MissingMomentum::new(-12.0, 33.0);
    for t in [0.0, 0.7, 2.0, 4.5] {
        let nu = solver.point(t);
        let expected = (nu.px - met.px).powi(2) + (nu.py - met.py).powi(2);
        let fom = solver.figure_of_merit(t, &met, &precision);
        assert!((fom - expected).abs() <= 1e-9 * expected.max(1.0));
    }
}

#[test]
fn heavy_lepton_b_system_is_unreconstructable() {
    let lepton = FourMomentum::from_pt_eta_phi_m(100.0, 0.0, 0.0, 0.0);
    let b = FourMomentum::from_pt_eta_phi_m(150.0, 0.0, PI, 4.8);
    assert!((lepton + b).mass() > TOP);
    let solver = EllipseSolver::new(&lepton, &b, W, TOP);
    assert!(!solver.is_reconstructable());

    let precision = MetCovariance::identity().precision().expect("precision");
    let solution = solver.best(&MissingMomentum::new(20.0, 5.0), &precision);
    assert!(!solution.is_solved());
    assert_eq!(solution.figure_of_merit, UNSOLVED_FIGURE_OF_MERIT);
    assert_eq!(solution.neutrino, FourMomentum::zero());
    assert_eq!(solution.distance(), None);
}

#[test]
fn correlated_covariance_inverts() {
    let precision = MetCovariance {
        sigma_x: 2.0,
        sigma_y: 1.0,
        rho: 0.0,
    }
    .precision()
    .expect("precision");
    assert!((precision[(0, 0)] - 0.25).abs() < 1e-15);
    assert!((precision[(1, 1)] - 1.0).abs() < 1e-15);
    assert_eq!(precision[(0, 1)], 0.0);
}

#[test]
fn fully_correlated_covariance_is_rejected() {
    let err = MetCovariance {
        sigma_x: 10.0,
        sigma_y: 10.0,
        rho: 1.0,
    }
    .precision()
    .expect_err("singular");
    match err {
        RecoError::Config(info) => assert_eq!(info.code, "singular_met_covariance"),
        other => panic!("unexpected error {other:?}"),
    }
}

proptest! {
    #[test]
    fn ellipse_points_satisfy_both_mass_constraints(
        pt in 0.0f64..300.0,
        eta in -2.0f64..2.0,
        phi in -3.1f64..3.1,
        theta_b in 0.2f64..2.9,
        phi_b in -3.1f64..3.1,
        theta_l in 0.2f64..2.9,
        phi_l in -3.1f64..3.1,
        t in 0.0f64..TAU,
    ) {
        let (lepton, b, _) = leptonic_top(pt, eta, phi, (theta_b, phi_b, theta_l, phi_l));
        let solver = EllipseSolver::new(&lepton, &b, W, TOP);
        prop_assume!(solver.is_reconstructable());

        let nu = solver.point(t);
        let w = lepton + nu;
        let top = w + b;
        prop_assert!(nu.e > 0.0);
        prop_assert!((w.mass() - W).abs() < 1e-6 * (1.0 + top.e), "m_W {}", w.mass());
        prop_assert!((top.mass() - TOP).abs() < 1e-6 * (1.0 + top.e), "m_t {}", top.mass());
    }
}

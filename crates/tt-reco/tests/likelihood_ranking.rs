use std::sync::Arc;

use tt_core::{BinnedAxis, Density1D, Density2D, FourMomentum, Jet, MissingMomentum};
use tt_nu::{EllipseSolver, MetCovariance};
use tt_reco::{
    DecayJet, Event, InterpretationRanker, JetSelection, LikelihoodRanker, LikelihoodSettings,
    LikelihoodTables, Ranker, ReconstructionStatus, Reconstructor, RoleAssignment, ToyEvent,
    ToyGenerator, ToySettings,
};

fn neutrino_table(low: f64, high: f64) -> Density1D {
    let contents = (1..=10).map(f64::from).collect();
    Density1D::from_contents(BinnedAxis::uniform(10, low, high).unwrap(), contents).unwrap()
}

fn mass_table(x: (f64, f64), y: (f64, f64)) -> Density2D {
    let contents = (0..5)
        .map(|ix| (0..5).map(|iy| f64::from(1 + ix + iy)).collect())
        .collect();
    Density2D::from_contents(
        BinnedAxis::uniform(5, x.0, x.1).unwrap(),
        BinnedAxis::uniform(5, y.0, y.1).unwrap(),
        contents,
    )
    .unwrap()
}

fn wide_tables() -> LikelihoodTables {
    LikelihoodTables::new(
        neutrino_table(0.0, 2000.0),
        mass_table((0.0, 2000.0), (0.0, 4000.0)),
    )
}

fn reconstructor(tables: LikelihoodTables, settings: LikelihoodSettings) -> Reconstructor {
    let ranker = LikelihoodRanker::new(Arc::new(tables), &settings).unwrap();
    Reconstructor::new(
        JetSelection::new(0.0, f64::INFINITY),
        Ranker::Likelihood(ranker),
    )
}

fn settings(cache: bool) -> LikelihoodSettings {
    let mut settings = LikelihoodSettings::new("tables.json");
    settings.cache = cache;
    settings
}

fn likelihood_ranker() -> LikelihoodRanker {
    LikelihoodRanker::new(Arc::new(wide_tables()), &settings(true)).unwrap()
}

/// Starts `event` on `ranker` and ranks the assignment (0, 1, 2, 3).
fn first_assignment_rank(ranker: &mut LikelihoodRanker, event: &Event) -> f64 {
    let view = event.view();
    ranker.begin_event(&view).unwrap();
    ranker.rank(&view, &RoleAssignment::new(0, 1, 2, 3), f64::NEG_INFINITY)
}

fn solver_calls(reco: &Reconstructor) -> u64 {
    match reco.ranker() {
        Ranker::Likelihood(ranker) => ranker.solver_calls(),
        Ranker::Chi2(_) => panic!("expected a likelihood ranker"),
    }
}

fn toys(seed: u64, count: usize) -> Vec<ToyEvent> {
    let settings = ToySettings {
        met_smearing: 15.0,
        ..ToySettings::default()
    };
    ToyGenerator::new(seed, settings).generate(count)
}

fn statuses(reco: &mut Reconstructor, events: &[ToyEvent]) -> Vec<ReconstructionStatus> {
    events
        .iter()
        .map(|toy| reco.process(&toy.event.view()).unwrap().status())
        .collect()
}

#[test]
fn cache_is_invisible_in_ranks_but_saves_solves() {
    let events = toys(11, 25);
    let mut cached = reconstructor(wide_tables(), settings(true));
    let mut uncached = reconstructor(wide_tables(), settings(false));

    let mut successes = 0;
    for toy in &events {
        let a = cached.process(&toy.event.view()).unwrap();
        let b = uncached.process(&toy.event.view()).unwrap();
        assert_eq!(a.status(), b.status());
        assert_eq!(a.rank().to_bits(), b.rank().to_bits());
        assert_eq!(a.assignment(), b.assignment());
        assert_eq!(a.neutrino(), b.neutrino());
        if a.is_success() {
            successes += 1;
        }
    }
    assert!(successes > 0);
    assert!(solver_calls(&cached) < solver_calls(&uncached));
}

#[test]
fn four_jet_event_solves_once_per_leptonic_b_candidate() {
    let settings_exact = ToySettings {
        max_extra_jets: 0,
        met_smearing: 0.0,
        ..ToySettings::default()
    };
    let toy = ToyGenerator::new(4, settings_exact).event(0);
    let mut cached = reconstructor(wide_tables(), settings(true));
    let mut uncached = reconstructor(wide_tables(), settings(false));
    cached.process(&toy.event.view()).unwrap();
    uncached.process(&toy.event.view()).unwrap();
    assert_eq!(solver_calls(&cached), 4);
    assert_eq!(solver_calls(&uncached), 12);
}

#[test]
fn cache_does_not_leak_between_events() {
    let events = toys(23, 6);
    let mut warm = reconstructor(wide_tables(), settings(true));
    for toy in &events[..5] {
        warm.process(&toy.event.view()).unwrap();
    }
    let last = &events[5].event;
    let reused = warm.process(&last.view()).unwrap();
    let fresh = reconstructor(wide_tables(), settings(true))
        .process(&last.view())
        .unwrap();
    assert_eq!(reused, fresh);
}

#[test]
fn cache_is_cleared_between_events() {
    let first = toys(67, 20)
        .into_iter()
        .map(|toy| toy.event)
        .find(|event| first_assignment_rank(&mut likelihood_ranker(), event).is_finite())
        .expect("an event with a finite rank for the first assignment");

    // Same leptonic b index, but a jet recoiling against the lepton puts m(l + b) far
    // above the top mass, so no neutrino exists.
    let lepton = first.leptons[0].p4;
    let scale = 1.0e6 / (lepton.p() * lepton.p());
    let mut second = first.clone();
    second.jets[0] = Jet::new(
        FourMomentum::massless(-scale * lepton.px, -scale * lepton.py, -scale * lepton.pz),
        0.9,
    );

    let mut warm = likelihood_ranker();
    let first_rank = first_assignment_rank(&mut warm, &first);
    let reused = first_assignment_rank(&mut warm, &second);
    let mut fresh_ranker = likelihood_ranker();
    let fresh = first_assignment_rank(&mut fresh_ranker, &second);

    assert!(first_rank.is_finite());
    assert_eq!(fresh, f64::NEG_INFINITY);
    assert_eq!(reused.to_bits(), fresh.to_bits());
    assert_eq!(warm.solver_calls(), 2);
    assert_eq!(warm.flags(), fresh_ranker.flags());
    assert_eq!(warm.best_neutrino(), None);
}

#[test]
fn best_neutrino_belongs_to_the_winning_b_jet() {
    let events = toys(31, 15);
    let mut reco = reconstructor(wide_tables(), settings(true));
    let precision = MetCovariance::identity().precision().unwrap();
    let mut checked = 0;
    for toy in &events {
        let result = reco.process(&toy.event.view()).unwrap();
        if !result.is_success() {
            continue;
        }
        let b_jet = result.jet(DecayJet::BTopLep).unwrap();
        let lepton = result.lepton().unwrap();
        let expected = EllipseSolver::new(&lepton.p4, &b_jet.p4, 80.0, 173.0)
            .best(&toy.event.met, &precision)
            .neutrino;
        assert_eq!(result.neutrino(), Some(expected));
        checked += 1;
    }
    assert!(checked > 0);
}

#[test]
fn masses_outside_the_table_are_diagnosed() {
    let tables = LikelihoodTables::new(
        neutrino_table(0.0, 2000.0),
        mass_table((1.0e5, 2.0e5), (1.0e5, 2.0e5)),
    );
    let mut reco = reconstructor(tables, settings(true));
    let found = statuses(&mut reco, &toys(41, 10));
    assert!(found.iter().all(|status| matches!(
        status,
        ReconstructionStatus::MassLikelihoodOutOfRange
            | ReconstructionStatus::NeutrinoUnreconstructable
    )));
    assert!(found.contains(&ReconstructionStatus::MassLikelihoodOutOfRange));
}

#[test]
fn neutrino_distance_outside_the_table_is_diagnosed() {
    let tables = LikelihoodTables::new(
        neutrino_table(1.0e5, 2.0e5),
        mass_table((0.0, 2000.0), (0.0, 4000.0)),
    );
    let mut reco = reconstructor(tables, settings(true));
    let found = statuses(&mut reco, &toys(43, 10));
    assert!(found.iter().all(|status| matches!(
        status,
        ReconstructionStatus::NeutrinoLikelihoodOutOfRange
            | ReconstructionStatus::NeutrinoUnreconstructable
    )));
    assert!(found.contains(&ReconstructionStatus::NeutrinoLikelihoodOutOfRange));
}

#[test]
fn impossible_top_mass_leaves_neutrino_unreconstructable() {
    let mut custom = settings(true);
    custom.top_mass = 80.5;
    let mut reco = reconstructor(wide_tables(), custom);
    let found = statuses(&mut reco, &toys(47, 5));
    assert!(found
        .iter()
        .all(|status| *status == ReconstructionStatus::NeutrinoUnreconstructable));
}

#[test]
fn empty_density_bins_leave_no_viable_interpretation() {
    let mass = Density2D::from_contents(
        BinnedAxis::new(vec![0.0, 1.0, 1.0e4]).unwrap(),
        BinnedAxis::new(vec![0.0, 1.0, 1.0e4]).unwrap(),
        vec![vec![1.0, 0.0], vec![0.0, 0.0]],
    )
    .unwrap();
    let tables = LikelihoodTables::new(neutrino_table(0.0, 2000.0), mass);
    let mut reco = reconstructor(tables, settings(true));
    let found = statuses(&mut reco, &toys(53, 10));
    assert!(found.iter().all(|status| matches!(
        status,
        ReconstructionStatus::NoViableInterpretation
            | ReconstructionStatus::NeutrinoUnreconstructable
    )));
    assert!(found.contains(&ReconstructionStatus::NoViableInterpretation));
}

#[test]
fn event_without_leptons_never_calls_the_solver() {
    let mut event: Event = toys(59, 1).remove(0).event;
    event.leptons.clear();
    let mut reco = reconstructor(wide_tables(), settings(true));
    let result = reco.process(&event.view()).unwrap();
    assert_eq!(result.status(), ReconstructionStatus::NoLeptons);
    assert_eq!(solver_calls(&reco), 0);
}

#[test]
fn flags_reset_at_event_start() {
    let event = toys(61, 1).remove(0).event;
    let tables = Arc::new(wide_tables());
    let mut ranker = LikelihoodRanker::new(tables, &settings(true)).unwrap();
    let view = event.view();
    ranker.begin_event(&view).unwrap();
    ranker.rank(&view, &RoleAssignment::new(0, 1, 2, 3), f64::NEG_INFINITY);

    let empty = Event::new(
        Vec::new(),
        event.leptons.clone(),
        MissingMomentum::default(),
    );
    ranker.begin_event(&empty.view()).unwrap();
    assert_eq!(ranker.flags(), Default::default());
    assert_eq!(ranker.best_neutrino(), None);
}

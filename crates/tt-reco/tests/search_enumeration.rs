use std::collections::HashSet;

use proptest::prelude::*;
use tt_core::{FourMomentum, Jet, MissingMomentum, RecoError};
use tt_reco::{
    BTagMode, BTagRequirement, EventView, InterpretationRanker, JetAssignmentSearch, JetSelection,
    ReconstructionStatus, RoleAssignment, SearchOutcome,
};

/// Records every assignment and scores it with a closure.
struct RecordingRanker<F> {
    seen: Vec<RoleAssignment>,
    score: F,
}

impl<F: FnMut(&RoleAssignment) -> f64> RecordingRanker<F> {
    fn new(score: F) -> Self {
        Self {
            seen: Vec::new(),
            score,
        }
    }
}

impl<F: FnMut(&RoleAssignment) -> f64> InterpretationRanker for RecordingRanker<F> {
    fn begin_event(
        &mut self,
        _: &EventView<'_>,
    ) -> Result<Option<ReconstructionStatus>, RecoError> {
        self.seen.clear();
        Ok(None)
    }

    fn rank(&mut self, _: &EventView<'_>, assignment: &RoleAssignment, _: f64) -> f64 {
        self.seen.push(*assignment);
        (self.score)(assignment)
    }

    fn best_neutrino(&self) -> Option<FourMomentum> {
        None
    }

    fn diagnose_failure(&self) -> ReconstructionStatus {
        ReconstructionStatus::NoViableInterpretation
    }
}

fn jets_with_pt(pts: &[f64]) -> Vec<Jet> {
    pts.iter()
        .enumerate()
        .map(|(idx, pt)| {
            let p4 = FourMomentum::from_pt_eta_phi_m(*pt, 0.1 * idx as f64, 0.5 * idx as f64, 5.0);
            Jet::new(p4, 0.0)
        })
        .collect()
}

fn descending_jets(n: usize) -> Vec<Jet> {
    let pts: Vec<f64> = (0..n).map(|idx| 200.0 - 15.0 * idx as f64).collect();
    jets_with_pt(&pts)
}

fn run_search<F: FnMut(&RoleAssignment) -> f64>(
    selection: JetSelection,
    jets: &[Jet],
    ranker: &mut RecordingRanker<F>,
) -> (SearchOutcome, usize) {
    let view = EventView::new(jets, &[], MissingMomentum::default());
    ranker.begin_event(&view).unwrap();
    let mut search = JetAssignmentSearch::new(selection);
    let outcome = search.run(&view, ranker);
    (outcome, search.evaluated())
}

fn standard_selection() -> JetSelection {
    JetSelection::new(20.0, 2.4)
}

#[test]
fn four_jets_give_twelve_assignments() {
    let jets = jets_with_pt(&[100.0, 80.0, 60.0, 50.0]);
    let mut ranker = RecordingRanker::new(|_: &RoleAssignment| 0.0);
    let (outcome, evaluated) = run_search(standard_selection(), &jets, &mut ranker);

    assert_eq!(evaluated, 12);
    assert_eq!(ranker.seen.len(), 12);
    let unique: HashSet<_> = ranker.seen.iter().copied().collect();
    assert_eq!(unique.len(), 12);
    assert!(ranker.seen.iter().all(RoleAssignment::is_valid));
    assert!(matches!(outcome, SearchOutcome::Found { .. }));
}

#[test]
fn enumeration_order_is_b_lep_then_b_had_then_light_pair() {
    let jets = jets_with_pt(&[100.0, 80.0, 60.0, 50.0]);
    let mut ranker = RecordingRanker::new(|_: &RoleAssignment| 0.0);
    run_search(standard_selection(), &jets, &mut ranker);

    assert_eq!(
        &ranker.seen[..4],
        &[
            RoleAssignment::new(0, 1, 2, 3),
            RoleAssignment::new(0, 2, 1, 3),
            RoleAssignment::new(0, 3, 1, 2),
            RoleAssignment::new(1, 0, 2, 3),
        ]
    );
}

#[test]
fn equal_ranks_keep_the_first_assignment() {
    let jets = descending_jets(6);
    let mut ranker = RecordingRanker::new(|_: &RoleAssignment| -3.0);
    let (outcome, _) = run_search(standard_selection(), &jets, &mut ranker);
    assert_eq!(
        outcome,
        SearchOutcome::Found {
            assignment: RoleAssignment::new(0, 1, 2, 3),
            rank: -3.0,
        }
    );
}

#[test]
fn fewer_than_four_jets_is_insufficient() {
    let jets = jets_with_pt(&[100.0, 80.0, 60.0]);
    let mut ranker = RecordingRanker::new(|_: &RoleAssignment| 0.0);
    let (outcome, evaluated) = run_search(standard_selection(), &jets, &mut ranker);
    assert_eq!(outcome, SearchOutcome::InsufficientJets);
    assert_eq!(evaluated, 0);
    assert!(ranker.seen.is_empty());
}

#[test]
fn scan_stops_at_first_soft_jet() {
    // The 60 and 50 GeV jets come after a soft one and are never looked at.
    let jets = jets_with_pt(&[100.0, 80.0, 15.0, 60.0, 50.0]);
    let mut ranker = RecordingRanker::new(|_: &RoleAssignment| 0.0);
    let (outcome, _) = run_search(standard_selection(), &jets, &mut ranker);
    assert_eq!(outcome, SearchOutcome::InsufficientJets);
}

#[test]
fn forward_jets_are_skipped() {
    let mut jets = jets_with_pt(&[100.0, 90.0, 80.0, 60.0, 50.0]);
    jets[1] = Jet::new(FourMomentum::from_pt_eta_phi_m(90.0, 3.0, 1.0, 5.0), 0.0);
    let mut ranker = RecordingRanker::new(|_: &RoleAssignment| 0.0);
    let (_, evaluated) = run_search(standard_selection(), &jets, &mut ranker);
    assert_eq!(evaluated, 12);
    assert!(ranker.seen.iter().all(|a| !a.indices().contains(&1)));
}

#[test]
fn unevaluable_assignments_exhaust_the_search() {
    let jets = descending_jets(5);
    let mut ranker = RecordingRanker::new(|_: &RoleAssignment| f64::NEG_INFINITY);
    let (outcome, evaluated) = run_search(standard_selection(), &jets, &mut ranker);
    assert_eq!(outcome, SearchOutcome::Exhausted);
    assert_eq!(evaluated, 60);
}

#[test]
fn b_tag_requirement_restricts_b_roles() {
    let mut jets = descending_jets(5);
    for (jet, tag) in jets.iter_mut().zip([0.9, 0.1, 0.8, 0.2, 0.1]) {
        jet.b_tag = tag;
    }

    let both = standard_selection().with_b_tag(BTagRequirement {
        threshold: 0.5,
        mode: BTagMode::Both,
    });
    let mut ranker = RecordingRanker::new(|_: &RoleAssignment| 0.0);
    let (_, evaluated) = run_search(both, &jets, &mut ranker);
    assert_eq!(evaluated, 6);
    for assignment in &ranker.seen {
        assert!(jets[assignment.b_top_lep].b_tag >= 0.5);
        assert!(jets[assignment.b_top_had].b_tag >= 0.5);
    }

    let at_least_one = standard_selection().with_b_tag(BTagRequirement {
        threshold: 0.5,
        mode: BTagMode::AtLeastOne,
    });
    let mut ranker = RecordingRanker::new(|_: &RoleAssignment| 0.0);
    let (_, evaluated) = run_search(at_least_one, &jets, &mut ranker);
    assert_eq!(evaluated, 42);
}

fn pseudo_score(assignment: &RoleAssignment, seed: u64) -> f64 {
    let key = assignment
        .indices()
        .iter()
        .fold(seed, |acc, idx| {
            acc.wrapping_mul(31).wrapping_add(*idx as u64 + 1)
        });
    (key.wrapping_mul(0x9E37_79B9_7F4A_7C15) >> 40) as f64 % 1000.0
}

proptest! {
    #[test]
    fn assignment_count_matches_closed_form(n in 4usize..10) {
        let jets = descending_jets(n);
        let mut ranker = RecordingRanker::new(|_: &RoleAssignment| 0.0);
        let (_, evaluated) = run_search(standard_selection(), &jets, &mut ranker);
        prop_assert_eq!(evaluated, n * (n - 1) * (n - 2) * (n - 3) / 2);
        let unique: HashSet<_> = ranker.seen.iter().copied().collect();
        prop_assert_eq!(unique.len(), evaluated);
    }

    #[test]
    fn best_assignment_dominates_all_others(n in 4usize..8, seed in any::<u64>()) {
        let jets = descending_jets(n);
        let mut ranker = RecordingRanker::new(|a: &RoleAssignment| pseudo_score(a, seed));
        let (outcome, _) = run_search(standard_selection(), &jets, &mut ranker);
        let SearchOutcome::Found { assignment, rank } = outcome else {
            panic!("search found nothing");
        };
        let scores: Vec<f64> = ranker.seen.iter().map(|a| pseudo_score(a, seed)).collect();
        prop_assert!(scores.iter().all(|score| *score <= rank));
        let first_best = ranker.seen[scores.iter().position(|score| *score == rank).unwrap()];
        prop_assert_eq!(first_best, assignment);
    }
}

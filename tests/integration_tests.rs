use assert_float_eq::assert_float_absolute_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use labranch::scripted::{ScriptedProblem, ScriptedSolve};
use labranch::{BranchingDirection, Config, LookaheadBrancher, VariableIndex, Verdict};

const DOWN: BranchingDirection = BranchingDirection::Down;
const UP: BranchingDirection = BranchingDirection::Up;

fn base_config() -> Config {
    Config::default()
}

fn feasible(objective: f64) -> ScriptedSolve {
    ScriptedSolve::Feasible { objective, iterations: 1 }
}

/// Two fractional candidates, all four probes feasible. The engine must
/// branch on the candidate whose weaker child gains more, prove the bound
/// min(down, up) of that comparison for the current node and seed the
/// created children with the probed child bounds.
#[test]
fn branches_on_the_best_weaker_child() {
    let x = VariableIndex(0);
    let y = VariableIndex(1);
    let mut problem = ScriptedProblem::new(2);
    problem.set_objective(10.0);
    problem.make_binary(x);
    problem.add_candidate(x, 0.5);
    problem.add_candidate(y, 1.3);
    problem.script_solve(&[(x, DOWN)], feasible(11.0));
    problem.script_solve(&[(x, UP)], feasible(13.0));
    problem.script_solve(&[(y, DOWN)], feasible(12.0));
    problem.script_solve(&[(y, UP)], feasible(12.5));

    let mut brancher = LookaheadBrancher::<false>::new(base_config());
    match brancher.select(&mut problem) {
        Verdict::Branched(decision) => {
            assert_eq!(y, decision.variable);
            assert_float_absolute_eq!(1.3, decision.value);
            // y proves min(12, 12.5) = 12, which beats x's min(11, 13)
            assert_float_absolute_eq!(12.0, decision.proven_bound);
            assert!(decision.down_valid && decision.up_valid);
            assert_float_absolute_eq!(12.0, decision.down_bound);
            assert_float_absolute_eq!(12.5, decision.up_bound);
        }
        other => panic!("expected a branching, got {:?}", other),
    }
    assert_eq!(Some((y, 1.3)), problem.branched_on());
    let bounds: Vec<f64> = problem.child_bounds().iter().map(|(_, b)| *b).collect();
    assert_eq!(vec![12.0, 12.5], bounds);
    assert_eq!(4, problem.probing_solves());
}

/// Equal scores are broken towards the later candidate, so repeated
/// invocations rotate over equally good variables instead of starving one.
#[test]
fn equal_scores_prefer_the_later_candidate() {
    let x = VariableIndex(0);
    let y = VariableIndex(1);
    let mut problem = ScriptedProblem::new(2);
    problem.set_objective(0.0);
    problem.add_candidate(x, 1.5);
    problem.add_candidate(y, 2.5);
    for variable in [x, y] {
        problem.script_solve(&[(variable, DOWN)], feasible(1.0));
        problem.script_solve(&[(variable, UP)], feasible(2.0));
    }

    let mut brancher = LookaheadBrancher::<false>::new(base_config());
    match brancher.select(&mut problem) {
        Verdict::Branched(decision) => assert_eq!(y, decision.variable),
        other => panic!("expected a branching, got {:?}", other),
    }
}

/// A candidate with exactly one infeasible child yields a bound tightening
/// of the real node instead of a branching.
#[test]
fn one_sided_cutoff_becomes_a_domain_reduction() {
    let x = VariableIndex(0);
    let y = VariableIndex(1);
    let mut problem = ScriptedProblem::new(2);
    problem.set_objective(10.0);
    problem.make_binary(x);
    problem.add_candidate(x, 0.5);
    problem.add_candidate(y, 1.3);
    problem.script_solve(&[(x, DOWN)], feasible(11.0));
    problem.script_solve(&[(x, UP)], ScriptedSolve::Infeasible);
    problem.script_solve(&[(y, DOWN)], feasible(12.0));
    problem.script_solve(&[(y, UP)], feasible(12.5));

    let mut brancher = LookaheadBrancher::<false>::new(base_config());
    let verdict = brancher.select(&mut problem);
    assert_eq!(Verdict::ReducedDomain, verdict);
    // x >= 1 is infeasible, so x gets fixed to 0 at the real node
    assert_eq!(&[(x, 0.0)], problem.tightened_upper());
    assert!(problem.branched_on().is_none());
}

/// Both children infeasible proves the current node infeasible; nothing
/// else is applied.
#[test]
fn both_cutoffs_prove_the_node_infeasible() {
    let x = VariableIndex(0);
    let y = VariableIndex(1);
    let mut problem = ScriptedProblem::new(2);
    problem.set_objective(10.0);
    problem.add_candidate(x, 1.5);
    problem.add_candidate(y, 2.5);
    problem.script_solve(&[(x, DOWN)], ScriptedSolve::Infeasible);
    problem.script_solve(&[(x, UP)], ScriptedSolve::Infeasible);

    let mut brancher = LookaheadBrancher::<false>::new(base_config());
    assert_eq!(Verdict::CutOff, brancher.select(&mut problem));
    // scanning stopped at the first candidate
    assert_eq!(2, problem.probing_solves());
    assert!(problem.tightened_lower().is_empty());
    assert!(problem.tightened_upper().is_empty());
}

/// With a single fractional candidate there is nothing to compare, the
/// engine branches immediately without a single probing solve.
#[test]
fn single_candidate_branches_without_probing() {
    let x = VariableIndex(0);
    let mut problem = ScriptedProblem::new(1);
    problem.set_objective(7.0);
    problem.add_candidate(x, 1.5);

    let mut brancher = LookaheadBrancher::<false>::new(base_config());
    match brancher.select(&mut problem) {
        Verdict::Branched(decision) => {
            assert_eq!(x, decision.variable);
            assert_float_absolute_eq!(7.0, decision.proven_bound);
            assert!(!decision.down_valid && !decision.up_valid);
        }
        other => panic!("expected a branching, got {:?}", other),
    }
    assert_eq!(0, problem.probing_solves());
    assert!(problem.child_bounds().is_empty());
}

/// Deep cutoffs on an all-binary path materialize implied clauses; the
/// ones violated by the base solution are added to the real node.
#[test]
fn deep_cutoffs_yield_implied_clauses() {
    let x = VariableIndex(0);
    let y = VariableIndex(1);
    let mut problem = ScriptedProblem::new(2);
    problem.set_objective(10.0);
    problem.make_binary(x);
    problem.make_binary(y);
    problem.add_candidate(x, 0.2);
    problem.add_candidate(y, 0.3);
    problem.script_solve(&[(x, DOWN)], feasible(10.1));
    problem.script_solve(&[(x, UP)], feasible(11.0));
    // fixing x to 0 makes y unroundable in either direction
    problem.script_solve(&[(x, DOWN), (y, DOWN)], ScriptedSolve::Infeasible);
    problem.script_solve(&[(x, DOWN), (y, UP)], ScriptedSolve::Infeasible);

    // force probing even when a deeper frame is left with one candidate
    let mut config = base_config();
    config.set_force_branching(true);
    let mut brancher = LookaheadBrancher::<false>::new(config);
    let verdict = brancher.select(&mut problem);
    assert_eq!(Verdict::ConstraintsAdded, verdict);
    // (x=0, y=0) infeasible gives x + y >= 1, (x=0, y=1) gives x + !y >= 1,
    // and both are violated at (0.2, 0.3)
    assert_eq!(2, problem.added_clauses().len());
    // the down child of x became infeasible through its subtree while the
    // up child survived, so x also gets fixed to 1
    assert_eq!(&[(x, 1.0)], problem.tightened_lower());
}

/// A failed probing solve aborts the selection without touching the real
/// node: the harvested information might be based on wrong LP answers.
#[test]
fn lp_failure_applies_nothing() {
    let x = VariableIndex(0);
    let y = VariableIndex(1);
    let mut problem = ScriptedProblem::new(2);
    problem.set_objective(10.0);
    problem.add_candidate(x, 1.5);
    problem.add_candidate(y, 2.5);
    problem.script_solve(&[(x, DOWN)], ScriptedSolve::Failure);

    let mut brancher = LookaheadBrancher::<false>::new(base_config());
    assert_eq!(Verdict::DidNotFind, brancher.select(&mut problem));
    assert!(problem.branched_on().is_none());
    assert!(problem.tightened_lower().is_empty());
    assert!(problem.added_clauses().is_empty());
}

/// An iteration-limited probe leaves the pair inconclusive and hands the
/// node back to the caller without branching.
#[test]
fn iteration_limit_hands_back_without_branching() {
    let x = VariableIndex(0);
    let y = VariableIndex(1);
    let mut problem = ScriptedProblem::new(2);
    problem.set_objective(10.0);
    problem.add_candidate(x, 1.5);
    problem.add_candidate(y, 2.5);
    problem.script_solve(
        &[(x, DOWN)],
        ScriptedSolve::LimitReached { objective: 10.5, iterations: 1000 },
    );

    let mut brancher = LookaheadBrancher::<false>::new(base_config());
    assert_eq!(Verdict::DidNotRun, brancher.select(&mut problem));
    assert!(problem.branched_on().is_none());
    assert!(problem.tightened_upper().is_empty());
}

#[test]
fn external_stop_runs_nothing() {
    let x = VariableIndex(0);
    let mut problem = ScriptedProblem::new(1);
    problem.add_candidate(x, 1.5);
    problem.request_stop();

    let mut brancher = LookaheadBrancher::<false>::new(base_config());
    assert_eq!(Verdict::DidNotRun, brancher.select(&mut problem));
    assert_eq!(0, problem.probing_solves());
}

#[test]
fn too_little_tree_depth_runs_nothing() {
    let x = VariableIndex(0);
    let y = VariableIndex(1);
    let mut problem = ScriptedProblem::new(2);
    problem.add_candidate(x, 1.5);
    problem.add_candidate(y, 2.5);
    problem.set_depth(99);
    problem.set_depth_limit(100);

    let mut brancher = LookaheadBrancher::<false>::new(base_config());
    assert_eq!(Verdict::DidNotRun, brancher.select(&mut problem));
    assert_eq!(0, problem.probing_solves());
}

/// An immediately repeated call on a bit-identical LP solution replays the
/// stored decision without any probing work.
#[test]
fn identical_solution_replays_the_decision() {
    let x = VariableIndex(0);
    let y = VariableIndex(1);
    let mut problem = ScriptedProblem::new(2);
    problem.set_objective(10.0);
    problem.add_candidate(x, 1.5);
    problem.add_candidate(y, 2.5);
    problem.script_solve(&[(x, DOWN)], feasible(11.0));
    problem.script_solve(&[(x, UP)], feasible(13.0));
    problem.script_solve(&[(y, DOWN)], feasible(12.0));
    problem.script_solve(&[(y, UP)], feasible(12.5));

    let mut brancher = LookaheadBrancher::<false>::new(base_config());
    let first = brancher.select(&mut problem);
    assert_eq!(4, problem.probing_solves());
    let second = brancher.select(&mut problem);
    assert_eq!(first, second);
    // not a single additional probing solve
    assert_eq!(4, problem.probing_solves());
}

/// With a reevaluation age configured, a second selection at the same node
/// reuses the stored probe pairs instead of solving again.
#[test]
fn recent_probe_pairs_are_reused() {
    let x = VariableIndex(0);
    let y = VariableIndex(1);
    let mut problem = ScriptedProblem::new(2);
    problem.set_objective(10.0);
    problem.add_candidate(x, 1.5);
    problem.add_candidate(y, 2.5);
    problem.script_solve(&[(x, DOWN)], feasible(11.0));
    problem.script_solve(&[(x, UP)], feasible(13.0));
    problem.script_solve(&[(y, DOWN)], feasible(12.0));
    problem.script_solve(&[(y, UP)], feasible(12.5));

    let mut config = base_config();
    config.set_reeval_age(100);
    // disable the replay shortcut so the second call rescans the candidates
    config.set_store_unviolated_decision(false);
    let mut brancher = LookaheadBrancher::<false>::new(config);
    let first = brancher.select(&mut problem);
    assert_eq!(4, problem.probing_solves());
    let second = brancher.select(&mut problem);
    assert_eq!(first, second);
    assert_eq!(4, problem.probing_solves());
}

/// Propagation findings proven by both children are merged into one bound
/// valid for the current node.
#[test]
fn propagation_bounds_proven_by_both_children_are_applied() {
    use labranch::{BoundChange, PropagationOutcome};
    let x = VariableIndex(0);
    let y = VariableIndex(1);
    let mut problem = ScriptedProblem::new(2);
    problem.set_objective(10.0);
    problem.add_candidate(x, 1.5);
    problem.add_candidate(y, 3.3);
    problem.script_solve(&[(x, DOWN)], feasible(11.0));
    problem.script_solve(&[(x, UP)], feasible(11.5));
    problem.script_propagation(
        &[(x, DOWN)],
        PropagationOutcome {
            cutoff: false,
            bound_changes: vec![BoundChange { variable: y, direction: UP, bound: 2.0 }],
        },
    );
    problem.script_propagation(
        &[(x, UP)],
        PropagationOutcome {
            cutoff: false,
            bound_changes: vec![BoundChange { variable: y, direction: UP, bound: 1.0 }],
        },
    );

    let mut config = base_config();
    config.set_max_prop_rounds(-1);
    let mut brancher = LookaheadBrancher::<false>::new(config);
    assert_eq!(Verdict::ReducedDomain, brancher.select(&mut problem));
    // both children prove a lower bound on y, the weaker one survives
    assert_eq!(&[(y, 1.0)], problem.tightened_lower());
}

/// The abbreviated variant first ranks all candidates with one cheap probe
/// pair each, then runs the full scheme on the best few only.
#[test]
fn abbreviated_mode_prefilters_the_candidates() {
    let x = VariableIndex(0);
    let y = VariableIndex(1);
    let z = VariableIndex(2);
    let mut problem = ScriptedProblem::new(3);
    problem.set_objective(10.0);
    problem.add_candidate(x, 1.5);
    problem.add_candidate(y, 2.5);
    problem.add_candidate(z, 3.5);
    problem.script_solve(&[(x, DOWN)], feasible(10.2));
    problem.script_solve(&[(x, UP)], feasible(10.4));
    problem.script_solve(&[(y, DOWN)], feasible(11.0));
    problem.script_solve(&[(y, UP)], feasible(12.0));
    problem.script_solve(&[(z, DOWN)], feasible(10.5));
    problem.script_solve(&[(z, UP)], feasible(13.0));

    let mut config = base_config();
    config.set_abbreviated(true);
    config.set_max_candidates(2);
    config.set_recursion_depth(1);
    let mut brancher = LookaheadBrancher::<false>::new(config);
    match brancher.select(&mut problem) {
        Verdict::Branched(decision) => assert_eq!(y, decision.variable),
        other => panic!("expected a branching, got {:?}", other),
    }
    // 6 prefilter solves, then 4 full solves on the two kept candidates
    assert_eq!(10, problem.probing_solves());
    // the prefilter saved warm starts that the full pass restored
    assert!(problem.warm_restores() > 0);
}

/// Reliable pseudocost records replace the prefilter probes entirely.
#[test]
fn reliable_pseudocosts_skip_the_prefilter_probes() {
    let x = VariableIndex(0);
    let y = VariableIndex(1);
    let z = VariableIndex(2);
    let mut problem = ScriptedProblem::new(3);
    problem.set_objective(10.0);
    problem.add_candidate(x, 1.5);
    problem.add_candidate(y, 2.5);
    problem.add_candidate(z, 3.5);
    for (variable, unit_gain) in [(x, 0.2), (y, 3.0), (z, 2.0)] {
        problem.seed_pseudocost(variable, DOWN, unit_gain, 10);
        problem.seed_pseudocost(variable, UP, unit_gain, 10);
    }
    problem.script_solve(&[(y, DOWN)], feasible(11.0));
    problem.script_solve(&[(y, UP)], feasible(12.0));
    problem.script_solve(&[(z, DOWN)], feasible(10.5));
    problem.script_solve(&[(z, UP)], feasible(13.0));

    let mut config = base_config();
    config.set_abbreviated(true);
    config.set_max_candidates(2);
    config.set_recursion_depth(1);
    config.set_reliability_threshold(5);
    let mut brancher = LookaheadBrancher::<false>::new(config);
    match brancher.select(&mut problem) {
        Verdict::Branched(decision) => assert_eq!(y, decision.variable),
        other => panic!("expected a branching, got {:?}", other),
    }
    // only the full pass on the two kept candidates solved anything
    assert_eq!(4, problem.probing_solves());
}

/// Recording telemetry must not change any decision.
#[test]
fn telemetry_does_not_influence_the_outcome() {
    fn build() -> ScriptedProblem {
        let x = VariableIndex(0);
        let y = VariableIndex(1);
        let mut problem = ScriptedProblem::new(2);
        problem.set_objective(10.0);
        problem.add_candidate(x, 1.5);
        problem.add_candidate(y, 2.5);
        problem.script_solve(&[(x, DOWN)], feasible(11.0));
        problem.script_solve(&[(x, UP)], feasible(13.0));
        problem.script_solve(&[(y, DOWN)], feasible(12.0));
        problem.script_solve(&[(y, UP)], feasible(12.5));
        problem
    }

    let mut quiet_problem = build();
    let mut quiet = LookaheadBrancher::<false>::new(base_config());
    let quiet_verdict = quiet.select(&mut quiet_problem);

    let mut verbose_problem = build();
    let mut verbose = LookaheadBrancher::<true>::new(base_config());
    let verbose_verdict = verbose.select(&mut verbose_problem);

    assert_eq!(quiet_verdict, verbose_verdict);
    assert_eq!(quiet_problem.probing_solves(), verbose_problem.probing_solves());
}

/// The proven bound never drops below the invocation objective and equals
/// the best over all candidates of the weaker child bound.
#[test]
fn proven_bound_is_monotone_on_random_instances() {
    let mut rng = StdRng::seed_from_u64(0xb01d);
    for _ in 0..25 {
        let base: f64 = rng.gen_range(-50.0..50.0);
        let mut problem = ScriptedProblem::new(3);
        problem.set_objective(base);
        let values = [1.5, 2.5, 3.5];
        let mut expected = base;
        for v in 0..3 {
            let variable = VariableIndex(v);
            problem.add_candidate(variable, values[v]);
            let down = base + rng.gen_range(0.0..5.0);
            let up = base + rng.gen_range(0.0..5.0);
            problem.script_solve(&[(variable, DOWN)], feasible(down));
            problem.script_solve(&[(variable, UP)], feasible(up));
            expected = expected.max(down.min(up));
        }

        let mut brancher = LookaheadBrancher::<false>::new(base_config());
        match brancher.select(&mut problem) {
            Verdict::Branched(decision) => {
                assert!(decision.proven_bound >= base);
                assert_float_absolute_eq!(expected, decision.proven_bound);
            }
            other => panic!("expected a branching, got {:?}", other),
        }
    }
}

/// A second probing level can only strengthen the proven bound. The same
/// three-candidate node is evaluated once with one level of lookahead and
/// once with two; the deeper run folds the grandchild objectives into the
/// child dual bounds and must prove at least as much as the shallow run.
#[test]
fn deeper_lookahead_never_weakens_the_proven_bound() {
    let x = VariableIndex(0);
    let y = VariableIndex(1);
    let z = VariableIndex(2);
    let build = || {
        let mut problem = ScriptedProblem::new(3);
        problem.set_objective(10.0);
        problem.add_candidate(x, 1.5);
        problem.add_candidate(y, 2.5);
        problem.add_candidate(z, 3.5);
        problem.script_solve(&[(x, DOWN)], feasible(11.0));
        problem.script_solve(&[(x, UP)], feasible(12.0));
        problem.script_solve(&[(y, DOWN)], feasible(11.5));
        problem.script_solve(&[(y, UP)], feasible(11.5));
        problem.script_solve(&[(z, DOWN)], feasible(10.5));
        problem.script_solve(&[(z, UP)], feasible(13.0));
        // Below the x-down child the remaining candidates improve further.
        problem.script_solve(&[(x, DOWN), (y, DOWN)], feasible(12.5));
        problem.script_solve(&[(x, DOWN), (y, UP)], feasible(12.5));
        problem.script_solve(&[(x, DOWN), (z, DOWN)], feasible(12.0));
        problem.script_solve(&[(x, DOWN), (z, UP)], feasible(14.0));
        problem
    };

    let mut shallow_config = base_config();
    shallow_config.set_recursion_depth(1);
    let mut problem = build();
    let mut brancher = LookaheadBrancher::<false>::new(shallow_config);
    let shallow_bound = match brancher.select(&mut problem) {
        Verdict::Branched(decision) => {
            assert_eq!(y, decision.variable);
            decision.proven_bound
        }
        other => panic!("expected a branching, got {:?}", other),
    };
    assert_eq!(6, problem.probing_solves());
    assert_float_absolute_eq!(11.5, shallow_bound);

    let mut problem = build();
    let mut brancher = LookaheadBrancher::<false>::new(base_config());
    let deep_bound = match brancher.select(&mut problem) {
        Verdict::Branched(decision) => {
            assert_eq!(y, decision.variable);
            decision.proven_bound
        }
        other => panic!("expected a branching, got {:?}", other),
    };
    assert_eq!(30, problem.probing_solves());
    assert_float_absolute_eq!(12.0, deep_bound);
    assert!(deep_bound >= shallow_bound);
}

/// An external stop in the middle of the candidate scan must abandon the
/// whole selection: the domain reduction already harvested from the first
/// candidate is discarded, not committed to the node.
#[test]
fn a_stop_during_the_scan_commits_nothing() {
    let x = VariableIndex(0);
    let y = VariableIndex(1);
    let mut problem = ScriptedProblem::new(2);
    problem.set_objective(10.0);
    problem.add_candidate(x, 2.5);
    problem.add_candidate(y, 1.5);
    problem.script_solve(&[(x, DOWN)], ScriptedSolve::Infeasible);
    problem.script_solve(&[(x, UP)], feasible(11.0));
    // the signal raises right between the two candidates
    problem.stop_after_solves(2);

    let mut brancher = LookaheadBrancher::<false>::new(base_config());
    assert_eq!(Verdict::DidNotRun, brancher.select(&mut problem));
    assert_eq!(2, problem.probing_solves());
    assert!(problem.tightened_lower().is_empty());
    assert!(problem.tightened_upper().is_empty());
    assert!(problem.added_clauses().is_empty());
    assert_eq!(None, problem.branched_on());
}

/// A reduction proven by both children and not violated by the base LP is
/// applied, yet the selected decision stays cached: a follow-up call on the
/// bit-identical LP solution replays it without any new probing solve.
#[test]
fn an_unviolated_reduction_keeps_the_decision_replayable() {
    use labranch::{BoundChange, PropagationOutcome};
    let x = VariableIndex(0);
    let y = VariableIndex(1);
    let mut problem = ScriptedProblem::new(2);
    problem.set_objective(10.0);
    problem.add_candidate(x, 1.5);
    problem.add_candidate(y, 3.3);
    problem.script_solve(&[(x, DOWN)], feasible(11.0));
    problem.script_solve(&[(x, UP)], feasible(11.5));
    problem.script_propagation(
        &[(x, DOWN)],
        PropagationOutcome {
            cutoff: false,
            bound_changes: vec![BoundChange { variable: y, direction: UP, bound: 2.0 }],
        },
    );
    problem.script_propagation(
        &[(x, UP)],
        PropagationOutcome {
            cutoff: false,
            bound_changes: vec![BoundChange { variable: y, direction: UP, bound: 1.0 }],
        },
    );

    let mut config = base_config();
    config.set_max_prop_rounds(-1);
    let mut brancher = LookaheadBrancher::<false>::new(config);
    assert_eq!(Verdict::ReducedDomain, brancher.select(&mut problem));
    assert_eq!(&[(y, 1.0)], problem.tightened_lower());
    assert_eq!(4, problem.probing_solves());

    match brancher.select(&mut problem) {
        Verdict::Branched(decision) => assert_eq!(x, decision.variable),
        other => panic!("expected a replayed branching, got {:?}", other),
    }
    assert_eq!(4, problem.probing_solves());
}

/// Pre-filter scores survive between calls: a candidate scored by an
/// earlier invocation is filtered on its remembered score instead of being
/// probed again.
#[test]
fn prefilter_scores_persist_across_calls() {
    let x = VariableIndex(0);
    let y = VariableIndex(1);
    let z = VariableIndex(2);
    let mut problem = ScriptedProblem::new(3);
    problem.set_objective(10.0);
    problem.add_candidate(x, 1.5);
    problem.add_candidate(y, 2.5);
    problem.add_candidate(z, 3.5);
    problem.script_solve(&[(x, DOWN)], feasible(10.2));
    problem.script_solve(&[(x, UP)], feasible(10.4));
    problem.script_solve(&[(y, DOWN)], feasible(11.0));
    problem.script_solve(&[(y, UP)], feasible(12.0));
    problem.script_solve(&[(z, DOWN)], feasible(10.5));
    problem.script_solve(&[(z, UP)], feasible(13.0));

    let mut config = base_config();
    config.set_abbreviated(true);
    config.set_max_candidates(2);
    config.set_recursion_depth(1);
    config.set_store_unviolated_decision(false);
    let mut brancher = LookaheadBrancher::<false>::new(config);
    match brancher.select(&mut problem) {
        Verdict::Branched(decision) => assert_eq!(y, decision.variable),
        other => panic!("expected a branching, got {:?}", other),
    }
    // 6 pre-filter solves plus 4 full solves on the two kept candidates
    assert_eq!(10, problem.probing_solves());

    match brancher.select(&mut problem) {
        Verdict::Branched(decision) => assert_eq!(y, decision.variable),
        other => panic!("expected a branching, got {:?}", other),
    }
    // all three candidates are already scored, only the full pass solves
    assert_eq!(14, problem.probing_solves());
}

/// A one-sided infeasible pre-filter probe is a discovered domain
/// reduction: filtering stops right there and the node restarts with the
/// tightened bound instead of branching.
#[test]
fn an_infeasible_prefilter_probe_restarts_the_node() {
    let x = VariableIndex(0);
    let y = VariableIndex(1);
    let z = VariableIndex(2);
    let mut problem = ScriptedProblem::new(3);
    problem.set_objective(10.0);
    problem.add_candidate(x, 2.5);
    problem.add_candidate(y, 1.5);
    problem.add_candidate(z, 3.5);
    problem.script_solve(&[(x, DOWN)], ScriptedSolve::Infeasible);
    problem.script_solve(&[(x, UP)], feasible(11.0));

    let mut config = base_config();
    config.set_abbreviated(true);
    config.set_max_candidates(2);
    let mut brancher = LookaheadBrancher::<false>::new(config);
    assert_eq!(Verdict::ReducedDomain, brancher.select(&mut problem));
    // only the first candidate's probe pair ran
    assert_eq!(2, problem.probing_solves());
    assert_eq!(&[(x, 3.0)], problem.tightened_lower());
    assert_eq!(None, problem.branched_on());
}

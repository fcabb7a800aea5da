//Labranch
//Copyright (C) 2025 The labranch developers
//
//This program is free software: you can redistribute it and/or modify
//it under the terms of the GNU Affero General Public License as published by
//the Free Software Foundation, either version 3 of the License, or
//(at your option) any later version.
//
//This program is distributed in the hope that it will be useful,
//but WITHOUT ANY WARRANTY; without even the implied warranty of
//MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//GNU Affero General Public License for more details.
//
//You should have received a copy of the GNU Affero General Public License
//along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! A table-driven [`SearchContext`] implementation. Probing solves,
//! propagation passes and candidate lists are looked up by the sequence of
//! branching decisions on the current probing path, so a test can script
//! the exact LP behavior the engine will observe and afterwards inspect
//! what was applied to the real node.
//!
//! Probing bounds live in a [`StateManager`] trail, so opening and closing
//! probing nodes restores variable domains the same way a backtracking
//! solver would.

use rustc_hash::FxHashMap;
use search_trail::{F64Manager, ReversibleF64, SaveAndRestore, StateManager};

use crate::common::{BranchingDirection, Literal, NodeIndex, VariableIndex, FEAS_EPSILON};
use crate::interface::{
    BoundApplication, CliqueApplication, LpError, LpOutcome, LpResult, NodeConstraints,
    PropagationOutcome, ProbingLp, PseudocostHistory,
};

/// The scripted behavior of one probing LP solve.
#[derive(Debug, Copy, Clone)]
pub enum ScriptedSolve {
    Feasible { objective: f64, iterations: u64 },
    Infeasible,
    LimitReached { objective: f64, iterations: u64 },
    Failure,
}

/// Opaque warm-start token handed out by [`ScriptedProblem`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ScriptedWarmStart(usize);

type PathKey = Vec<(usize, BranchingDirection)>;

/// A problem whose probing behavior is a lookup table.
pub struct ScriptedProblem {
    state: StateManager,
    lower: Vec<ReversibleF64>,
    upper: Vec<ReversibleF64>,
    binary: Vec<bool>,
    root_candidates: Vec<(VariableIndex, f64, f64)>,
    root_solution: Vec<f64>,
    root_objective: f64,
    cutoff: f64,
    node: NodeIndex,
    depth: usize,
    depth_limit: usize,
    stop: bool,
    stop_after: Option<usize>,
    probing: bool,
    open_nodes: usize,
    path: PathKey,
    solves: FxHashMap<PathKey, ScriptedSolve>,
    propagations: FxHashMap<PathKey, PropagationOutcome>,
    candidate_scripts: FxHashMap<PathKey, Vec<(VariableIndex, f64, f64)>>,
    clique_response: CliqueApplication,
    lp_count: u64,
    probing_solves: usize,
    warm_saves: usize,
    warm_restores: usize,
    next_child: u64,
    real_lower: Vec<f64>,
    real_upper: Vec<f64>,
    tightened_lower: Vec<(VariableIndex, f64)>,
    tightened_upper: Vec<(VariableIndex, f64)>,
    added_clauses: Vec<Vec<Literal>>,
    added_cliques: Vec<[Literal; 2]>,
    branched_on: Option<(VariableIndex, f64)>,
    child_bounds: Vec<(NodeIndex, f64)>,
    pseudocosts: FxHashMap<(usize, BranchingDirection), (f64, u64)>,
}

impl ScriptedProblem {
    /// A problem with `number_variables` integer variables, each with
    /// domain [0, 10], no fractional candidates and objective 0.
    pub fn new(number_variables: usize) -> Self {
        let mut state = StateManager::default();
        let lower = (0..number_variables).map(|_| state.manage_f64(0.0)).collect();
        let upper = (0..number_variables).map(|_| state.manage_f64(10.0)).collect();
        Self {
            state,
            lower,
            upper,
            binary: vec![false; number_variables],
            root_candidates: Vec::new(),
            root_solution: vec![0.0; number_variables],
            root_objective: 0.0,
            cutoff: f64::INFINITY,
            node: NodeIndex(1),
            depth: 0,
            depth_limit: 100,
            stop: false,
            stop_after: None,
            probing: false,
            open_nodes: 0,
            path: Vec::new(),
            solves: FxHashMap::default(),
            propagations: FxHashMap::default(),
            candidate_scripts: FxHashMap::default(),
            clique_response: CliqueApplication::default(),
            lp_count: 0,
            probing_solves: 0,
            warm_saves: 0,
            warm_restores: 0,
            next_child: 1000,
            real_lower: vec![0.0; number_variables],
            real_upper: vec![10.0; number_variables],
            tightened_lower: Vec::new(),
            tightened_upper: Vec::new(),
            added_clauses: Vec::new(),
            added_cliques: Vec::new(),
            branched_on: None,
            child_bounds: Vec::new(),
            pseudocosts: FxHashMap::default(),
        }
    }

    fn key(path: &[(VariableIndex, BranchingDirection)]) -> PathKey {
        path.iter().map(|(v, d)| (v.0, *d)).collect()
    }

    pub fn set_objective(&mut self, objective: f64) {
        self.root_objective = objective;
    }

    pub fn set_cutoff_bound(&mut self, bound: f64) {
        self.cutoff = bound;
    }

    pub fn set_depth(&mut self, depth: usize) {
        self.depth = depth;
    }

    pub fn set_depth_limit(&mut self, limit: usize) {
        self.depth_limit = limit;
    }

    pub fn set_node(&mut self, node: u64) {
        self.node = NodeIndex(node);
    }

    pub fn request_stop(&mut self) {
        self.stop = true;
    }

    /// The stop signal raises once `count` probing LPs have been solved,
    /// mimicking a time or node limit hit in the middle of a selection.
    pub fn stop_after_solves(&mut self, count: usize) {
        self.stop_after = Some(count);
    }

    pub fn make_binary(&mut self, variable: VariableIndex) {
        self.binary[variable.0] = true;
        self.set_bounds(variable, 0.0, 1.0);
    }

    pub fn set_bounds(&mut self, variable: VariableIndex, lower: f64, upper: f64) {
        self.state.set_f64(self.lower[variable.0], lower);
        self.state.set_f64(self.upper[variable.0], upper);
        self.real_lower[variable.0] = lower;
        self.real_upper[variable.0] = upper;
    }

    /// Declares `variable` fractional at `lp_value` in the base solution.
    pub fn add_candidate(&mut self, variable: VariableIndex, lp_value: f64) {
        let fractionality = lp_value - lp_value.floor();
        self.root_candidates.push((variable, lp_value, fractionality));
        self.root_solution[variable.0] = lp_value;
    }

    /// Scripts the LP solve observed after taking exactly the decisions in
    /// `path` from the invocation node.
    pub fn script_solve(
        &mut self,
        path: &[(VariableIndex, BranchingDirection)],
        solve: ScriptedSolve,
    ) {
        let _ = self.solves.insert(Self::key(path), solve);
    }

    pub fn script_propagation(
        &mut self,
        path: &[(VariableIndex, BranchingDirection)],
        outcome: PropagationOutcome,
    ) {
        let _ = self.propagations.insert(Self::key(path), outcome);
    }

    /// Scripts the fractional candidates visible after taking the
    /// decisions in `path`. Without a script the base candidates are
    /// reused, filtered down to those still inside the probing domains.
    pub fn script_candidates(
        &mut self,
        path: &[(VariableIndex, BranchingDirection)],
        candidates: Vec<(VariableIndex, f64, f64)>,
    ) {
        let _ = self.candidate_scripts.insert(Self::key(path), candidates);
    }

    pub fn set_clique_response(&mut self, response: CliqueApplication) {
        self.clique_response = response;
    }

    /// Seeds the pseudocost record of one direction with an average
    /// objective gain per unit of fractionality and a sample count.
    pub fn seed_pseudocost(
        &mut self,
        variable: VariableIndex,
        direction: BranchingDirection,
        unit_gain: f64,
        samples: u64,
    ) {
        let _ = self
            .pseudocosts
            .insert((variable.0, direction), (unit_gain, samples));
    }

    pub fn probing_solves(&self) -> usize {
        self.probing_solves
    }

    pub fn warm_restores(&self) -> usize {
        self.warm_restores
    }

    pub fn tightened_lower(&self) -> &[(VariableIndex, f64)] {
        &self.tightened_lower
    }

    pub fn tightened_upper(&self) -> &[(VariableIndex, f64)] {
        &self.tightened_upper
    }

    pub fn added_clauses(&self) -> &[Vec<Literal>] {
        &self.added_clauses
    }

    pub fn added_cliques(&self) -> &[[Literal; 2]] {
        &self.added_cliques
    }

    pub fn branched_on(&self) -> Option<(VariableIndex, f64)> {
        self.branched_on
    }

    pub fn child_bounds(&self) -> &[(NodeIndex, f64)] {
        &self.child_bounds
    }
}

impl ProbingLp for ScriptedProblem {
    type WarmStart = ScriptedWarmStart;

    fn start_probing(&mut self) {
        debug_assert!(!self.probing);
        self.probing = true;
    }

    fn end_probing(&mut self) {
        self.backtrack_probing(0);
        self.probing = false;
    }

    fn new_probing_node(&mut self) {
        debug_assert!(self.probing);
        self.state.save_state();
        self.open_nodes += 1;
    }

    fn backtrack_probing(&mut self, depth: usize) {
        while self.open_nodes > depth {
            self.state.restore_state();
            self.open_nodes -= 1;
        }
        self.path.truncate(depth.min(self.path.len()));
    }

    fn probing_depth(&self) -> usize {
        self.open_nodes
    }

    fn tighten_probing_bound(
        &mut self,
        variable: VariableIndex,
        bound: f64,
        direction: BranchingDirection,
    ) {
        match direction {
            BranchingDirection::Down => self.state.set_f64(self.upper[variable.0], bound),
            BranchingDirection::Up => self.state.set_f64(self.lower[variable.0], bound),
        };
        self.path.push((variable.0, direction));
    }

    fn solve_probing_lp(&mut self, _iteration_limit: i64) -> LpResult<LpOutcome> {
        self.probing_solves += 1;
        self.lp_count += 1;
        match self.solves.get(&self.path).copied() {
            Some(ScriptedSolve::Feasible { objective, iterations }) => Ok(LpOutcome {
                objective,
                infeasible: false,
                limit_reached: false,
                iterations,
            }),
            Some(ScriptedSolve::Infeasible) => Ok(LpOutcome {
                objective: f64::INFINITY,
                infeasible: true,
                limit_reached: false,
                iterations: 1,
            }),
            Some(ScriptedSolve::LimitReached { objective, iterations }) => Ok(LpOutcome {
                objective,
                infeasible: false,
                limit_reached: true,
                iterations,
            }),
            Some(ScriptedSolve::Failure) => Err(LpError),
            // an unscripted child keeps the parent objective
            None => Ok(LpOutcome {
                objective: self.root_objective,
                infeasible: false,
                limit_reached: false,
                iterations: 1,
            }),
        }
    }

    fn save_warm_start(&mut self) -> ScriptedWarmStart {
        self.warm_saves += 1;
        ScriptedWarmStart(self.warm_saves)
    }

    fn restore_warm_start(&mut self, _warm_start: &ScriptedWarmStart) {
        self.warm_restores += 1;
    }

    fn propagate(&mut self, _max_rounds: i32) -> PropagationOutcome {
        let outcome = match self.propagations.get(&self.path) {
            Some(outcome) => outcome.clone(),
            None => PropagationOutcome::default(),
        };
        for change in &outcome.bound_changes {
            match change.direction {
                BranchingDirection::Up => {
                    self.state.set_f64(self.lower[change.variable.0], change.bound)
                }
                BranchingDirection::Down => {
                    self.state.set_f64(self.upper[change.variable.0], change.bound)
                }
            };
        }
        outcome
    }

    fn fractional_candidates(&self) -> Vec<(VariableIndex, f64, f64)> {
        if let Some(scripted) = self.candidate_scripts.get(&self.path) {
            return scripted.clone();
        }
        self.root_candidates
            .iter()
            .filter(|(variable, value, _)| {
                let lower = self.state.get_f64(self.lower[variable.0]);
                let upper = self.state.get_f64(self.upper[variable.0]);
                *value > lower + FEAS_EPSILON && *value < upper - FEAS_EPSILON
            })
            .copied()
            .collect()
    }

    fn cutoff_bound(&self) -> f64 {
        self.cutoff
    }

    fn lp_objective(&self) -> f64 {
        self.root_objective
    }

    fn lp_solution(&self) -> Vec<f64> {
        self.root_solution.clone()
    }

    fn current_node(&self) -> NodeIndex {
        self.node
    }

    fn lp_solve_count(&self) -> u64 {
        self.lp_count
    }

    fn depth(&self) -> usize {
        self.depth
    }

    fn depth_limit(&self) -> usize {
        self.depth_limit
    }

    fn is_binary(&self, variable: VariableIndex) -> bool {
        self.binary[variable.0]
    }

    fn lower_bound(&self, variable: VariableIndex) -> f64 {
        self.real_lower[variable.0]
    }

    fn upper_bound(&self, variable: VariableIndex) -> f64 {
        self.real_upper[variable.0]
    }

    fn number_variables(&self) -> usize {
        self.lower.len()
    }

    fn stop_requested(&self) -> bool {
        self.stop || self.stop_after.is_some_and(|count| self.probing_solves >= count)
    }
}

impl NodeConstraints for ScriptedProblem {
    fn tighten_lower_bound(&mut self, variable: VariableIndex, value: f64) -> BoundApplication {
        if value > self.real_upper[variable.0] + FEAS_EPSILON {
            return BoundApplication { infeasible: true, tightened: false };
        }
        let tightened = value > self.real_lower[variable.0] + FEAS_EPSILON;
        if tightened {
            self.real_lower[variable.0] = value;
            self.tightened_lower.push((variable, value));
        }
        BoundApplication { infeasible: false, tightened }
    }

    fn tighten_upper_bound(&mut self, variable: VariableIndex, value: f64) -> BoundApplication {
        if value < self.real_lower[variable.0] - FEAS_EPSILON {
            return BoundApplication { infeasible: true, tightened: false };
        }
        let tightened = value < self.real_upper[variable.0] - FEAS_EPSILON;
        if tightened {
            self.real_upper[variable.0] = value;
            self.tightened_upper.push((variable, value));
        }
        BoundApplication { infeasible: false, tightened }
    }

    fn add_clause(&mut self, literals: &[Literal]) {
        self.added_clauses.push(literals.to_vec());
    }

    fn add_two_literal_clique(&mut self, literals: &[Literal; 2]) -> CliqueApplication {
        self.added_cliques.push(*literals);
        self.clique_response.clone()
    }

    fn branch(&mut self, variable: VariableIndex, value: f64) -> (NodeIndex, NodeIndex) {
        self.branched_on = Some((variable, value));
        let down = NodeIndex(self.next_child);
        let up = NodeIndex(self.next_child + 1);
        self.next_child += 2;
        (down, up)
    }

    fn update_node_lower_bound(&mut self, node: NodeIndex, bound: f64) {
        self.child_bounds.push((node, bound));
    }
}

impl PseudocostHistory for ScriptedProblem {
    fn pseudocost(&self, variable: VariableIndex, frac_delta: f64) -> f64 {
        let direction = if frac_delta < 0.0 {
            BranchingDirection::Down
        } else {
            BranchingDirection::Up
        };
        match self.pseudocosts.get(&(variable.0, direction)) {
            Some((unit_gain, _)) => unit_gain * frac_delta.abs(),
            None => 0.0,
        }
    }

    fn update_pseudocost(
        &mut self,
        variable: VariableIndex,
        frac_delta: f64,
        gain: f64,
        weight: f64,
    ) {
        if frac_delta.abs() < FEAS_EPSILON {
            return;
        }
        let direction = if frac_delta < 0.0 {
            BranchingDirection::Down
        } else {
            BranchingDirection::Up
        };
        let unit_gain = (gain / frac_delta.abs()).max(0.0);
        let entry = self
            .pseudocosts
            .entry((variable.0, direction))
            .or_insert((0.0, 0));
        let samples = entry.1 as f64;
        entry.0 = (entry.0 * samples + unit_gain * weight) / (samples + weight);
        entry.1 += weight.round() as u64;
    }

    fn reliability_samples(&self, variable: VariableIndex, direction: BranchingDirection) -> u64 {
        match self.pseudocosts.get(&(variable.0, direction)) {
            Some((_, samples)) => *samples,
            None => 0,
        }
    }
}

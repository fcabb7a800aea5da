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

//! The three collaborators the branching engine talks to: the LP relaxation
//! with its probing tree, the constraint/bound layer of the real search
//! node, and the pseudocost bookkeeping of the surrounding solver. The
//! engine never reaches past these traits, so a table-driven implementation
//! (see the `scripted` module) is enough to exercise every code path.

use crate::common::{BranchingDirection, Literal, NodeIndex, VariableIndex};

/// A probing LP solve failed without producing a status. This is a solver
/// failure, distinct from infeasibility (a legitimate outcome) and from
/// hitting an iteration limit (a recoverable status).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LpError;

pub type LpResult<T> = Result<T, LpError>;

/// What a single probing LP solve reported back.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LpOutcome {
    pub objective: f64,
    /// The probing LP was detected infeasible
    pub infeasible: bool,
    /// The solve stopped on an iteration/time limit before proving
    /// optimality; the objective is a snapshot, not a bound
    pub limit_reached: bool,
    pub iterations: u64,
}

/// One bound tightening reported by a propagation pass inside a probing node.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BoundChange {
    pub variable: VariableIndex,
    pub direction: BranchingDirection,
    pub bound: f64,
}

/// The result of a bounded propagation pass inside the current probing node.
#[derive(Debug, Clone, Default)]
pub struct PropagationOutcome {
    pub cutoff: bool,
    pub bound_changes: Vec<BoundChange>,
}

/// The result of tightening a bound on the real search node.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BoundApplication {
    pub infeasible: bool,
    pub tightened: bool,
}

/// The result of asserting a two-literal clause as a clique at the root.
#[derive(Debug, Clone, Default)]
pub struct CliqueApplication {
    pub infeasible: bool,
    pub bound_changes: Vec<BoundChange>,
}

/// The LP relaxation together with its backtrackable probing tree. Probing
/// nodes are opened and closed in strict stack discipline; the probing
/// depth visible here always equals the engine's recursion depth.
pub trait ProbingLp {
    /// Opaque saved LP basis/state for warm-starting a related solve.
    type WarmStart;

    fn start_probing(&mut self);
    fn end_probing(&mut self);
    fn new_probing_node(&mut self);
    /// Discards probing nodes until `depth` nodes remain open.
    fn backtrack_probing(&mut self, depth: usize);
    fn probing_depth(&self) -> usize;

    /// Tightens one bound of `variable` inside the current probing node:
    /// the upper bound for a down branch, the lower bound for an up branch.
    fn tighten_probing_bound(
        &mut self,
        variable: VariableIndex,
        bound: f64,
        direction: BranchingDirection,
    );

    /// Solves the probing LP. `iteration_limit < 0` means no limit.
    fn solve_probing_lp(&mut self, iteration_limit: i64) -> LpResult<LpOutcome>;

    fn save_warm_start(&mut self) -> Self::WarmStart;
    fn restore_warm_start(&mut self, warm_start: &Self::WarmStart);

    /// Runs at most `max_rounds` propagation rounds in the current probing
    /// node (`max_rounds < 0` means no limit) and reports the bound
    /// tightenings it found.
    fn propagate(&mut self, max_rounds: i32) -> PropagationOutcome;

    /// The integer-constrained variables whose current LP value is not
    /// integral, as (variable, LP value, fractional part).
    fn fractional_candidates(&self) -> Vec<(VariableIndex, f64, f64)>;

    fn cutoff_bound(&self) -> f64;
    fn lp_objective(&self) -> f64;
    /// A snapshot of the LP solution at the node the engine was invoked at,
    /// indexed by variable. Used for violation statistics and for the
    /// replay-cache equality check.
    fn lp_solution(&self) -> Vec<f64>;

    fn current_node(&self) -> NodeIndex;
    /// Total LP solves of the surrounding search, the clock for the
    /// reevaluation age of cached probe results.
    fn lp_solve_count(&self) -> u64;
    fn depth(&self) -> usize;
    fn depth_limit(&self) -> usize;

    fn is_binary(&self, variable: VariableIndex) -> bool;
    fn lower_bound(&self, variable: VariableIndex) -> f64;
    fn upper_bound(&self, variable: VariableIndex) -> f64;
    fn number_variables(&self) -> usize;

    /// External stop/limit signal of the surrounding search driver.
    fn stop_requested(&self) -> bool;
}

/// The constraint and bound layer of the real (non-probing) search node.
pub trait NodeConstraints {
    fn tighten_lower_bound(&mut self, variable: VariableIndex, value: f64) -> BoundApplication;
    fn tighten_upper_bound(&mut self, variable: VariableIndex, value: f64) -> BoundApplication;

    /// Adds the clause "at least one of `literals` holds" to the current
    /// real node.
    fn add_clause(&mut self, literals: &[Literal]);

    /// Asserts a two-literal clause globally as a clique at the root node.
    fn add_two_literal_clique(&mut self, literals: &[Literal; 2]) -> CliqueApplication;

    /// Creates the two real children around `value` and returns them as
    /// (down child, up child).
    fn branch(&mut self, variable: VariableIndex, value: f64) -> (NodeIndex, NodeIndex);

    /// Raises the initial dual bound of a freshly created child.
    fn update_node_lower_bound(&mut self, node: NodeIndex, bound: f64);
}

/// Pseudocost and reliability bookkeeping of the surrounding solver.
pub trait PseudocostHistory {
    /// Estimated objective degradation for moving `variable` by
    /// `frac_delta` (negative for a down branch).
    fn pseudocost(&self, variable: VariableIndex, frac_delta: f64) -> f64;

    fn update_pseudocost(
        &mut self,
        variable: VariableIndex,
        frac_delta: f64,
        gain: f64,
        weight: f64,
    );

    /// Number of recorded samples for the given direction, used to decide
    /// whether the pseudocost is statistically reliable.
    fn reliability_samples(&self, variable: VariableIndex, direction: BranchingDirection) -> u64;
}

/// Everything the engine needs from its environment, in one bound.
pub trait SearchContext: ProbingLp + NodeConstraints + PseudocostHistory {}

impl<T: ProbingLp + NodeConstraints + PseudocostHistory> SearchContext for T {}

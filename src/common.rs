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

use clap::ValueEnum;

/// Tolerance under which two LP values are considered equal. It mirrors the
/// feasibility tolerance of the surrounding solver.
pub const FEAS_EPSILON: f64 = 1e-6;

/// Abstraction used as a typesafe way of referring to a problem variable
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct VariableIndex(pub usize);

/// Abstraction used as a typesafe way of referring to a node of the real search tree
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NodeIndex(pub u64);

/// The two child problems a fractional variable can be branched into
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum)]
pub enum BranchingDirection {
    /// Tighten the upper bound to floor(x')
    Down,
    /// Tighten the lower bound to ceil(x')
    Up,
}

impl BranchingDirection {
    pub fn opposite(self) -> BranchingDirection {
        match self {
            BranchingDirection::Down => BranchingDirection::Up,
            BranchingDirection::Up => BranchingDirection::Down,
        }
    }
}

impl std::fmt::Display for BranchingDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BranchingDirection::Down => write!(f, "down"),
            BranchingDirection::Up => write!(f, "up"),
        }
    }
}

/// A binary branching decision taken along a probing path: `variable` was
/// fixed to `value`. The negation of a conjunction of such literals is the
/// implied clause harvested from a probing cutoff.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Literal {
    pub variable: VariableIndex,
    pub value: bool,
}

impl Literal {
    pub fn new(variable: VariableIndex, value: bool) -> Self {
        Self { variable, value }
    }

    /// The literal forbidding this decision, used when the decision path is
    /// turned into an "at least one must flip" clause.
    pub fn negated(self) -> Literal {
        Literal { variable: self.variable, value: !self.value }
    }
}

/// The outcome of a single probing sub-solve for one (candidate, direction)
/// pair. The dual bound is only meaningful when `dual_bound_valid` holds;
/// a solve interrupted by an iteration limit yields an unvalidated bound.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ProbeResult {
    pub objective: f64,
    pub dual_bound: f64,
    pub dual_bound_valid: bool,
    pub cutoff: bool,
    pub iterations: u64,
}

impl ProbeResult {
    pub fn cutoff(iterations: u64) -> Self {
        Self {
            objective: f64::INFINITY,
            dual_bound: f64::INFINITY,
            dual_bound_valid: false,
            cutoff: true,
            iterations,
        }
    }

    pub fn solved(objective: f64, cutoff: bool, iterations: u64) -> Self {
        Self {
            objective,
            dual_bound: objective,
            dual_bound_valid: true,
            cutoff,
            iterations,
        }
    }

    /// A solve stopped by an internal limit. The objective seen so far is
    /// kept as a hint but must not be used as a proven bound.
    pub fn interrupted(objective: f64, iterations: u64) -> Self {
        Self {
            objective,
            dual_bound: objective,
            dual_bound_valid: false,
            cutoff: false,
            iterations,
        }
    }
}

/// The output of one (top-level or recursive) variable selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    /// The selected branching variable
    pub variable: VariableIndex,
    /// Its LP relaxation value, i.e. the value to branch around
    pub value: f64,
    /// Dual bound of the down child, meaningful iff `down_valid`
    pub down_bound: f64,
    pub down_valid: bool,
    /// Dual bound of the up child, meaningful iff `up_valid`
    pub up_bound: f64,
    pub up_valid: bool,
    /// A dual bound proven to hold for the node the decision was taken at.
    /// Never smaller than the LP objective of that node.
    pub proven_bound: f64,
}

impl Decision {
    pub fn from_candidate(variable: VariableIndex, value: f64, proven_bound: f64) -> Self {
        Self {
            variable,
            value,
            down_bound: f64::NEG_INFINITY,
            down_valid: false,
            up_bound: f64::NEG_INFINITY,
            up_valid: false,
            proven_bound,
        }
    }
}

/// The single status channel shared by every stage of a top-level call.
/// Filtering, recursion and application all report through these flags, so
/// the caller cannot tell which stage produced e.g. a cutoff.
#[derive(Debug, Default, Copy, Clone)]
pub struct Status {
    /// The current search node was proven infeasible or bounded out
    pub cutoff: bool,
    /// At least one implied clause was added to the real node
    pub added_constraints: bool,
    /// At least one domain reduction was applied to the real node
    pub domain_reduction: bool,
    /// Bound propagation fixed the chosen candidate's own domain, so the
    /// decision had to be discarded
    pub propagation_domred: bool,
    /// A probing LP solve failed without producing a status
    pub lp_error: bool,
    /// An iteration/time/node limit was hit inside a probing solve
    pub limit_reached: bool,
    /// The search tree does not have enough room below the current node for
    /// the configured recursion depth
    pub depth_too_small: bool,
    /// The cap on harvested violated constraints was reached, scanning of
    /// further candidates stopped
    pub max_constraints_reached: bool,
}

impl Status {
    /// True when a recursion frame that observes this status must stop
    /// scanning remaining candidates.
    pub fn stops_scanning(&self) -> bool {
        self.cutoff
            || self.lp_error
            || self.limit_reached
            || self.depth_too_small
            || self.max_constraints_reached
    }
}

/// The outward result of one branching decision, in the shape the
/// surrounding branch-and-bound driver consumes.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// A precondition failed (not enough tree depth, external stop signal);
    /// the driver should fall back to its default rule
    DidNotRun,
    /// The engine ran but could not produce a usable decision, typically
    /// after an LP error
    DidNotFind,
    /// The current node is infeasible or bounded out
    CutOff,
    /// Domain reductions were applied to the current node; its LP must be
    /// re-solved before branching
    ReducedDomain,
    /// Implied clauses were added to the current node
    ConstraintsAdded,
    /// The branch was executed with the contained decision
    Branched(Decision),
}

/// Composes the dual bounds of two sibling probing children into a bound
/// provable for their common parent. Valid for minimization problems: the
/// weaker (smaller) of two child dual bounds still holds for the parent,
/// and when one child is cut off the surviving child's bound holds alone.
pub fn combine_child_bounds(down: &ProbeResult, up: &ProbeResult) -> Option<f64> {
    match (down.cutoff, up.cutoff) {
        (true, true) => None,
        (true, false) if up.dual_bound_valid => Some(up.dual_bound),
        (false, true) if down.dual_bound_valid => Some(down.dual_bound),
        (false, false) if down.dual_bound_valid && up.dual_bound_valid => {
            Some(down.dual_bound.min(up.dual_bound))
        }
        _ => None,
    }
}

#[cfg(test)]
mod test_common {
    use super::*;

    #[test]
    fn combine_prefers_weaker_child() {
        let down = ProbeResult::solved(11.0, false, 10);
        let up = ProbeResult::solved(13.0, false, 12);
        assert_eq!(Some(11.0), combine_child_bounds(&down, &up));
    }

    #[test]
    fn combine_one_sided_cutoff_keeps_survivor() {
        let down = ProbeResult::cutoff(4);
        let up = ProbeResult::solved(12.0, false, 9);
        assert_eq!(Some(12.0), combine_child_bounds(&down, &up));
    }

    #[test]
    fn combine_ignores_unvalidated_bounds() {
        let down = ProbeResult::interrupted(11.0, 100);
        let up = ProbeResult::solved(13.0, false, 12);
        assert_eq!(None, combine_child_bounds(&down, &up));
    }

    #[test]
    fn combine_both_cutoff_is_infeasible() {
        assert_eq!(None, combine_child_bounds(&ProbeResult::cutoff(1), &ProbeResult::cutoff(1)));
    }
}

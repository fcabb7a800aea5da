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

//! Sparse per-variable record of the bound tightenings discovered by
//! probing. One instance is owned by each top-level call; in addition two
//! transient instances are created per recursion level, one per branching
//! direction, so that bounds found under only one branch can be combined
//! with the sibling's via the "valid under both children" rule before they
//! reach the parent.

use rustc_hash::FxHashMap;

use crate::common::{FEAS_EPSILON, VariableIndex};

/// One stored bound together with the number of probing nodes that were
/// needed to prove it. The proof size is accounting only and never affects
/// which bound is kept, except to break exact ties.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BoundEntry {
    pub bound: f64,
    pub proof_nodes: u64,
}

#[derive(Debug, Default, Clone)]
struct VarDomain {
    lower: Option<BoundEntry>,
    upper: Option<BoundEntry>,
    /// The bound cuts off the LP solution of the base node
    violated: bool,
}

/// The domain reductions harvested during one (sub-)probe, keyed by
/// variable. A stored lower bound only ever grows and a stored upper bound
/// only ever shrinks; ties keep the smaller proof.
#[derive(Debug, Default)]
pub struct DomainReductions {
    entries: FxHashMap<VariableIndex, VarDomain>,
    violated_count: usize,
}

impl DomainReductions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of variables with at least one recorded bound change.
    pub fn changed_count(&self) -> usize {
        self.entries.len()
    }

    /// Number of variables with a recorded bound that cuts off the base LP
    /// solution.
    pub fn violated_count(&self) -> usize {
        self.violated_count
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lower_bound(&self, variable: VariableIndex) -> Option<BoundEntry> {
        self.entries.get(&variable).and_then(|d| d.lower)
    }

    pub fn upper_bound(&self, variable: VariableIndex) -> Option<BoundEntry> {
        self.entries.get(&variable).and_then(|d| d.upper)
    }

    /// True if the recorded bounds leave no room around `value`, i.e.
    /// branching on the variable at `value` is no longer meaningful.
    pub fn fixes_out(&self, variable: VariableIndex, value: f64) -> bool {
        let Some(domain) = self.entries.get(&variable) else {
            return false;
        };
        let above = domain.lower.map_or(false, |e| e.bound > value + FEAS_EPSILON);
        let below = domain.upper.map_or(false, |e| e.bound < value - FEAS_EPSILON);
        let fixed = match (domain.lower, domain.upper) {
            (Some(lower), Some(upper)) => upper.bound - lower.bound < FEAS_EPSILON,
            _ => false,
        };
        above || below || fixed
    }

    /// Records `bound` as a valid lower bound for `variable`. The stronger
    /// of the old and the new bound is kept; `base_value` is the value of
    /// the variable in the base LP solution, used to track violation.
    pub fn add_lower_bound(
        &mut self,
        variable: VariableIndex,
        bound: f64,
        proof_nodes: u64,
        base_value: f64,
    ) {
        let domain = self.entries.entry(variable).or_default();
        let entry = BoundEntry { bound, proof_nodes };
        domain.lower = Some(match domain.lower {
            Some(old) => tighten(old, entry, true),
            None => entry,
        });
        let violated = base_value < domain.lower.unwrap().bound - FEAS_EPSILON;
        Self::update_violation(&mut self.violated_count, domain, violated);
    }

    /// Records `bound` as a valid upper bound for `variable`, keeping the
    /// smaller of the old and the new value.
    pub fn add_upper_bound(
        &mut self,
        variable: VariableIndex,
        bound: f64,
        proof_nodes: u64,
        base_value: f64,
    ) {
        let domain = self.entries.entry(variable).or_default();
        let entry = BoundEntry { bound, proof_nodes };
        domain.upper = Some(match domain.upper {
            Some(old) => tighten(old, entry, false),
            None => entry,
        });
        let violated = base_value > domain.upper.unwrap().bound + FEAS_EPSILON;
        Self::update_violation(&mut self.violated_count, domain, violated);
    }

    fn update_violation(count: &mut usize, domain: &mut VarDomain, violated: bool) {
        if violated && !domain.violated {
            domain.violated = true;
            *count += 1;
        }
    }

    /// Merges the reductions of the two sibling children of one branching.
    /// A bound is valid for the parent only if both children prove one for
    /// the same variable; the parent then gets the weaker of the two. The
    /// proof sizes add up, plus the two branch nodes themselves.
    pub fn merge_children(&mut self, down: &DomainReductions, up: &DomainReductions, base: &[f64]) {
        let mut variables: Vec<VariableIndex> = down
            .entries
            .keys()
            .filter(|v| up.entries.contains_key(v))
            .copied()
            .collect();
        variables.sort_unstable();
        for variable in variables {
            let base_value = base[variable.0];
            if let (Some(d), Some(u)) = (down.lower_bound(variable), up.lower_bound(variable)) {
                let bound = d.bound.min(u.bound);
                self.add_lower_bound(variable, bound, d.proof_nodes + u.proof_nodes + 2, base_value);
            }
            if let (Some(d), Some(u)) = (down.upper_bound(variable), up.upper_bound(variable)) {
                let bound = d.bound.max(u.bound);
                self.add_upper_bound(variable, bound, d.proof_nodes + u.proof_nodes + 2, base_value);
            }
        }
    }

    /// The recorded variables in ascending order, for deterministic
    /// application to the real node.
    pub fn variables_sorted(&self) -> Vec<VariableIndex> {
        let mut variables: Vec<VariableIndex> = self.entries.keys().copied().collect();
        variables.sort_unstable();
        variables
    }
}

fn tighten(old: BoundEntry, new: BoundEntry, is_lower: bool) -> BoundEntry {
    let stronger = if is_lower { new.bound > old.bound } else { new.bound < old.bound };
    if stronger {
        new
    } else if new.bound == old.bound && new.proof_nodes < old.proof_nodes {
        new
    } else {
        old
    }
}

#[cfg(test)]
mod test_domain_reductions {
    use super::*;

    const BASE: [f64; 4] = [0.5, 1.5, 2.5, 3.5];

    #[test]
    fn lower_bound_only_tightens() {
        let mut domreds = DomainReductions::new();
        domreds.add_lower_bound(VariableIndex(1), 2.0, 1, BASE[1]);
        domreds.add_lower_bound(VariableIndex(1), 1.0, 1, BASE[1]);
        assert_eq!(2.0, domreds.lower_bound(VariableIndex(1)).unwrap().bound);
        domreds.add_lower_bound(VariableIndex(1), 3.0, 1, BASE[1]);
        assert_eq!(3.0, domreds.lower_bound(VariableIndex(1)).unwrap().bound);
    }

    #[test]
    fn upper_bound_only_tightens() {
        let mut domreds = DomainReductions::new();
        domreds.add_upper_bound(VariableIndex(2), 5.0, 1, BASE[2]);
        domreds.add_upper_bound(VariableIndex(2), 6.0, 1, BASE[2]);
        assert_eq!(5.0, domreds.upper_bound(VariableIndex(2)).unwrap().bound);
    }

    #[test]
    fn tie_keeps_smaller_proof() {
        let mut domreds = DomainReductions::new();
        domreds.add_lower_bound(VariableIndex(0), 1.0, 7, BASE[0]);
        domreds.add_lower_bound(VariableIndex(0), 1.0, 3, BASE[0]);
        assert_eq!(3, domreds.lower_bound(VariableIndex(0)).unwrap().proof_nodes);
        domreds.add_lower_bound(VariableIndex(0), 1.0, 9, BASE[0]);
        assert_eq!(3, domreds.lower_bound(VariableIndex(0)).unwrap().proof_nodes);
    }

    #[test]
    fn violation_tracked_against_base_solution() {
        let mut domreds = DomainReductions::new();
        // variable 0 sits at 0.5 in the base solution, a lower bound of 1
        // cuts it off
        domreds.add_lower_bound(VariableIndex(0), 1.0, 1, BASE[0]);
        assert_eq!(1, domreds.violated_count());
        // an upper bound of 4 on variable 3 (at 3.5) is not violated
        domreds.add_upper_bound(VariableIndex(3), 4.0, 1, BASE[3]);
        assert_eq!(1, domreds.violated_count());
        assert_eq!(2, domreds.changed_count());
    }

    #[test]
    fn merge_takes_weaker_of_both_children() {
        let mut down = DomainReductions::new();
        let mut up = DomainReductions::new();
        down.add_lower_bound(VariableIndex(1), 3.0, 1, BASE[1]);
        up.add_lower_bound(VariableIndex(1), 2.0, 1, BASE[1]);
        // variable 2 is only bounded under the down child, it must not
        // propagate to the parent
        down.add_upper_bound(VariableIndex(2), 1.0, 1, BASE[2]);

        let mut parent = DomainReductions::new();
        parent.merge_children(&down, &up, &BASE);
        assert_eq!(2.0, parent.lower_bound(VariableIndex(1)).unwrap().bound);
        assert_eq!(4, parent.lower_bound(VariableIndex(1)).unwrap().proof_nodes);
        assert!(parent.upper_bound(VariableIndex(2)).is_none());
    }

    #[test]
    fn merge_is_idempotent_and_never_loosens() {
        let mut down = DomainReductions::new();
        let mut up = DomainReductions::new();
        down.add_lower_bound(VariableIndex(1), 3.0, 1, BASE[1]);
        up.add_lower_bound(VariableIndex(1), 2.5, 1, BASE[1]);

        let mut parent = DomainReductions::new();
        parent.add_lower_bound(VariableIndex(1), 2.8, 1, BASE[1]);
        parent.merge_children(&down, &up, &BASE);
        // the merge result 2.5 is weaker than the bound already present
        assert_eq!(2.8, parent.lower_bound(VariableIndex(1)).unwrap().bound);
        parent.merge_children(&down, &up, &BASE);
        assert_eq!(2.8, parent.lower_bound(VariableIndex(1)).unwrap().bound);
        assert_eq!(1, parent.changed_count());
    }

    #[test]
    fn fixes_out_detects_unusable_branching_value() {
        let mut domreds = DomainReductions::new();
        assert!(!domreds.fixes_out(VariableIndex(0), 0.5));
        domreds.add_lower_bound(VariableIndex(0), 1.0, 1, BASE[0]);
        assert!(domreds.fixes_out(VariableIndex(0), 0.5));
        let mut narrow = DomainReductions::new();
        narrow.add_lower_bound(VariableIndex(1), 2.0, 1, BASE[1]);
        narrow.add_upper_bound(VariableIndex(1), 2.0, 1, BASE[1]);
        assert!(narrow.fixes_out(VariableIndex(1), 2.0));
    }
}

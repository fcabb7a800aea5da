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

//! Cross-call reuse data of the engine, keyed by variable identity and
//! scoped to one branch-and-bound run: the driver resets it before each
//! solve. It stores the probe results of the last branching per variable
//! (for the reevaluation-age cache), the rotating candidate start index,
//! the pre-filter score container and at most one unapplied decision kept
//! for replay.

use rustc_hash::FxHashMap;

use crate::common::{Decision, NodeIndex, ProbeResult, VariableIndex};
use crate::core::scores::ScoreContainer;

#[derive(Debug, Copy, Clone)]
struct StoredBranching {
    node: NodeIndex,
    lp_count: u64,
    down: ProbeResult,
    up: ProbeResult,
}

#[derive(Debug, Default)]
pub struct PersistentData {
    branchings: FxHashMap<VariableIndex, StoredBranching>,
    last_candidate: usize,
    previous_decision: Option<Decision>,
    previous_base_solution: Option<Vec<f64>>,
    scores: Option<ScoreContainer>,
}

impl PersistentData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops everything; called at the start of a branch-and-bound run and
    /// by the memory guard.
    pub fn reset(&mut self) {
        self.branchings.clear();
        self.last_candidate = 0;
        self.previous_decision = None;
        self.previous_base_solution = None;
        self.scores = None;
    }

    /// Hands out the cross-call score container, or a fresh one when none
    /// was stored yet or the candidate budget changed.
    pub fn take_scores(&mut self, capacity: usize) -> ScoreContainer {
        match self.scores.take() {
            Some(scores) if scores.capacity() == capacity => scores,
            _ => ScoreContainer::new(capacity),
        }
    }

    pub fn store_scores(&mut self, scores: ScoreContainer) {
        self.scores = Some(scores);
    }

    pub fn store_branching(
        &mut self,
        variable: VariableIndex,
        node: NodeIndex,
        lp_count: u64,
        down: ProbeResult,
        up: ProbeResult,
    ) {
        let _ = self
            .branchings
            .insert(variable, StoredBranching { node, lp_count, down, up });
    }

    /// Returns the stored down/up results of `variable` if it was branched
    /// at the same search node with fewer than `reeval_age` LP solves in
    /// between. `reeval_age == 0` disables reuse entirely.
    pub fn reusable_branching(
        &self,
        variable: VariableIndex,
        node: NodeIndex,
        lp_count: u64,
        reeval_age: u64,
    ) -> Option<(ProbeResult, ProbeResult)> {
        let stored = self.branchings.get(&variable)?;
        if stored.node == node && lp_count.saturating_sub(stored.lp_count) < reeval_age {
            Some((stored.down, stored.up))
        } else {
            None
        }
    }

    /// The candidate index the top-level loop should start from, for
    /// fairness across repeated invocations.
    pub fn start_index(&self, candidate_count: usize) -> usize {
        if candidate_count == 0 { 0 } else { self.last_candidate % candidate_count }
    }

    pub fn set_start_index(&mut self, index: usize) {
        self.last_candidate = index;
    }

    /// Keeps a decision whose harvested side information was entirely
    /// non-violating, so an immediately repeated call on the very same LP
    /// solution can skip recomputation.
    pub fn store_replay(&mut self, decision: Decision, base_solution: Vec<f64>) {
        self.previous_decision = Some(decision);
        self.previous_base_solution = Some(base_solution);
    }

    pub fn clear_replay(&mut self) {
        self.previous_decision = None;
        self.previous_base_solution = None;
    }

    /// The cached decision, if `base_solution` is bit-for-bit equal to the
    /// solution it was cached for.
    pub fn replay(&self, base_solution: &[f64]) -> Option<&Decision> {
        let cached = self.previous_base_solution.as_ref()?;
        if cached.len() == base_solution.len()
            && cached
                .iter()
                .zip(base_solution.iter())
                .all(|(a, b)| a.to_bits() == b.to_bits())
        {
            self.previous_decision.as_ref()
        } else {
            None
        }
    }
}

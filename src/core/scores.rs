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

use rustc_hash::FxHashMap;

use crate::common::VariableIndex;

/// Sparse cache of the best known branching score per variable, plus a
/// bounded descending-sorted index of the top scorers. The abbreviated mode
/// reads the index to pick its candidate subset; a variable evicted from
/// the index should have its cached warm-start payload released, which is
/// why eviction is reported to the caller.
#[derive(Debug)]
pub struct ScoreContainer {
    scores: FxHashMap<VariableIndex, f64>,
    /// Sorted by descending score; never longer than `capacity`
    best: Vec<(VariableIndex, f64)>,
    capacity: usize,
}

impl ScoreContainer {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0);
        Self {
            scores: FxHashMap::default(),
            best: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// The best known score of `variable`, or `None` if it was never scored.
    pub fn score(&self, variable: VariableIndex) -> Option<f64> {
        self.scores.get(&variable).copied()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records `score` for `variable` and maintains the best-K index via
    /// binary-search insertion. Returns the variable evicted from the
    /// index, if any, so its warm-start payload can be freed.
    pub fn insert(&mut self, variable: VariableIndex, score: f64) -> Option<VariableIndex> {
        debug_assert!(score >= 0.0);
        let _ = self.scores.insert(variable, score);
        if let Some(index) = self.best.iter().position(|(v, _)| *v == variable) {
            let _ = self.best.remove(index);
        }
        // first position with a strictly smaller score; equal scores keep
        // their insertion order
        let position = self
            .best
            .partition_point(|(_, s)| *s >= score);
        if position == self.capacity {
            return Some(variable);
        }
        self.best.insert(position, (variable, score));
        if self.best.len() > self.capacity {
            self.best.pop().map(|(v, _)| v)
        } else {
            None
        }
    }

    /// The current best-K variables in descending score order.
    pub fn best_variables(&self) -> Vec<VariableIndex> {
        self.best.iter().map(|(v, _)| *v).collect()
    }

    pub fn indexed_count(&self) -> usize {
        self.best.len()
    }
}

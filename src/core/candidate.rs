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

use crate::common::VariableIndex;

/// A fractional branching candidate at one recursion level. The warm-start
/// payloads are filled lazily by the abbreviated pre-filter and released
/// when the candidate drops out of the bounded best-K score index.
#[derive(Debug)]
pub struct Candidate<W> {
    variable: VariableIndex,
    lp_value: f64,
    fractionality: f64,
    down_warm_start: Option<W>,
    up_warm_start: Option<W>,
}

impl<W> Candidate<W> {
    pub fn new(variable: VariableIndex, lp_value: f64, fractionality: f64) -> Self {
        debug_assert!(fractionality > 0.0 && fractionality < 1.0);
        Self {
            variable,
            lp_value,
            fractionality,
            down_warm_start: None,
            up_warm_start: None,
        }
    }

    pub fn variable(&self) -> VariableIndex {
        self.variable
    }

    pub fn lp_value(&self) -> f64 {
        self.lp_value
    }

    pub fn fractionality(&self) -> f64 {
        self.fractionality
    }

    pub fn set_down_warm_start(&mut self, warm_start: W) {
        self.down_warm_start = Some(warm_start);
    }

    pub fn set_up_warm_start(&mut self, warm_start: W) {
        self.up_warm_start = Some(warm_start);
    }

    pub fn down_warm_start(&self) -> Option<&W> {
        self.down_warm_start.as_ref()
    }

    pub fn up_warm_start(&self) -> Option<&W> {
        self.up_warm_start.as_ref()
    }

    /// Drops both saved bases, e.g. after eviction from the best-K index.
    pub fn release_warm_starts(&mut self) {
        self.down_warm_start = None;
        self.up_warm_start = None;
    }
}

/// The pool of branching candidates at one recursion level.
#[derive(Debug)]
pub struct CandidateList<W> {
    candidates: Vec<Candidate<W>>,
}

impl<W> CandidateList<W> {
    /// Builds the list from the fractional-variable query of the LP layer.
    /// Every entry is fractional by construction.
    pub fn from_fractional(fractional: Vec<(VariableIndex, f64, f64)>) -> Self {
        let candidates = fractional
            .into_iter()
            .map(|(variable, lp_value, fractionality)| {
                Candidate::new(variable, lp_value, fractionality)
            })
            .collect();
        Self { candidates }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn get(&self, index: usize) -> &Candidate<W> {
        &self.candidates[index]
    }

    pub fn get_mut(&mut self, index: usize) -> &mut Candidate<W> {
        &mut self.candidates[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate<W>> {
        self.candidates.iter()
    }

    pub fn position(&self, variable: VariableIndex) -> Option<usize> {
        self.candidates.iter().position(|c| c.variable() == variable)
    }

    /// Releases the warm-start payloads of `variable`, if present.
    pub fn release_warm_starts_of(&mut self, variable: VariableIndex) {
        if let Some(index) = self.position(variable) {
            self.candidates[index].release_warm_starts();
        }
    }

    /// Keeps only the given variables, in the given order. Candidates not
    /// listed are dropped together with their warm-start payloads.
    pub fn retain_ordered(&mut self, keep: &[VariableIndex]) {
        let mut kept: Vec<Candidate<W>> = Vec::with_capacity(keep.len());
        for variable in keep {
            if let Some(index) = self.candidates.iter().position(|c| c.variable() == *variable) {
                kept.push(self.candidates.swap_remove(index));
            }
        }
        self.candidates = kept;
    }
}

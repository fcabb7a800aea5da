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

//! The stack of binary decisions taken along the current probing path, and
//! the pool of implied clauses harvested from probing cutoffs. The stack is
//! strictly LIFO, mirroring probing descent and backtrack; a clause is only
//! materialized from a path of at least two binary decisions, since a
//! single-decision cutoff is a plain domain reduction.

use crate::common::{FEAS_EPSILON, Literal};

/// An implied clause: at least one of the literals must hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImpliedClause {
    literals: Vec<Literal>,
    violated: bool,
}

impl ImpliedClause {
    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    /// True if the base LP solution satisfies none of the literals, i.e.
    /// adding the clause cuts the current LP solution off.
    pub fn is_violated(&self) -> bool {
        self.violated
    }
}

/// The running conjunction of binary branching decisions on the current
/// probing path together with the clauses derived from it so far.
#[derive(Debug, Default)]
pub struct BinConsData {
    path: Vec<Literal>,
    constraints: Vec<ImpliedClause>,
    violated_count: usize,
}

impl BinConsData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes the decision taken when descending into a probing child.
    pub fn push_decision(&mut self, literal: Literal) {
        self.path.push(literal);
    }

    /// Pops the most recent decision on backtrack. Panics if descent and
    /// backtrack got out of sync, which would invalidate every clause
    /// derived afterwards.
    pub fn pop_decision(&mut self) -> Literal {
        self.path.pop().expect("binary decision stack underflow")
    }

    pub fn path_depth(&self) -> usize {
        self.path.len()
    }

    /// Materializes the clause "not all current path decisions can hold"
    /// after a probing cutoff. Paths of length one are skipped: they are
    /// recorded as domain reductions by the caller instead. Returns whether
    /// a clause was created.
    pub fn create_constraint(&mut self, base_solution: &[f64]) -> bool {
        if self.path.len() < 2 {
            return false;
        }
        let literals: Vec<Literal> = self.path.iter().map(|l| l.negated()).collect();
        let activity: f64 = literals
            .iter()
            .map(|l| {
                let value = base_solution[l.variable.0];
                if l.value { value } else { 1.0 - value }
            })
            .sum();
        let violated = activity < 1.0 - FEAS_EPSILON;
        if violated {
            self.violated_count += 1;
        }
        self.constraints.push(ImpliedClause { literals, violated });
        true
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Number of harvested clauses already violated by the base LP solution.
    pub fn violated_count(&self) -> usize {
        self.violated_count
    }

    pub fn constraints(&self) -> &[ImpliedClause] {
        &self.constraints
    }
}

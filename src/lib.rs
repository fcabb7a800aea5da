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

//! A lookahead branching engine for branch-and-bound mixed-integer
//! solvers. Instead of ranking fractional candidates by a cheap proxy, the
//! engine solves the LP relaxation of both children of each candidate
//! inside the solver's probing mode, recursively, and branches on the
//! candidate whose weaker child degrades the objective the most. Probing
//! cutoffs turn into domain reductions and implied binary clauses for the
//! current node, and proven child bounds seed the created children.
//!
//! The solver is reached exclusively through the traits in [`interface`],
//! so the engine itself never depends on a particular LP implementation.

// Re-export the modules
mod brancher;
pub mod common;
mod config;
pub mod core;
pub mod interface;
mod persistent;
pub mod scripted;
mod statistics;

pub use brancher::LookaheadBrancher;
pub use common::*;
pub use config::Config;
pub use interface::{
    BoundApplication, BoundChange, CliqueApplication, LpError, LpOutcome, LpResult,
    NodeConstraints, PropagationOutcome, ProbingLp, PseudocostHistory, SearchContext,
};
pub use statistics::Statistics;

use peak_alloc::PeakAlloc;
#[global_allocator]
pub static PEAK_ALLOC: PeakAlloc = PeakAlloc;

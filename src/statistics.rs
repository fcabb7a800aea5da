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

use std::fmt;

/// Telemetry collected while branching. The engine behaves identically
/// whether or not recording is enabled; the counters only observe.
#[derive(Default)]
pub struct Statistics<const B: bool> {
    /// Probing LP solves, indexed by the tree depth of the probing node
    lp_solves_per_depth: Vec<usize>,
    /// Probing cutoffs, indexed by the tree depth of the probing node
    cutoffs_per_depth: Vec<usize>,
    domain_reductions_found: usize,
    clauses_found: usize,
    domain_reductions_applied: usize,
    clauses_applied: usize,
    reeval_cache_hits: usize,
    pseudocost_shortcuts: usize,
    replays: usize,
    prefilter_runs: usize,
    branchings: usize,
    probing_iterations: u64,
}

impl<const B: bool> Statistics<B> {
    pub fn lp_solved(&mut self, depth: usize, iterations: u64) {
        if B {
            if self.lp_solves_per_depth.len() <= depth {
                self.lp_solves_per_depth.resize(depth + 1, 0);
            }
            self.lp_solves_per_depth[depth] += 1;
            self.probing_iterations += iterations;
        }
    }

    pub fn probe_cutoff(&mut self, depth: usize) {
        if B {
            if self.cutoffs_per_depth.len() <= depth {
                self.cutoffs_per_depth.resize(depth + 1, 0);
            }
            self.cutoffs_per_depth[depth] += 1;
        }
    }

    pub fn domain_reduction_found(&mut self) {
        if B {
            self.domain_reductions_found += 1;
        }
    }

    pub fn clause_found(&mut self) {
        if B {
            self.clauses_found += 1;
        }
    }

    pub fn domain_reductions_applied(&mut self, count: usize) {
        if B {
            self.domain_reductions_applied += count;
        }
    }

    pub fn clauses_applied(&mut self, count: usize) {
        if B {
            self.clauses_applied += count;
        }
    }

    pub fn reeval_cache_hit(&mut self) {
        if B {
            self.reeval_cache_hits += 1;
        }
    }

    pub fn pseudocost_shortcut(&mut self) {
        if B {
            self.pseudocost_shortcuts += 1;
        }
    }

    pub fn replay(&mut self) {
        if B {
            self.replays += 1;
        }
    }

    pub fn prefilter_run(&mut self) {
        if B {
            self.prefilter_runs += 1;
        }
    }

    pub fn branching_executed(&mut self) {
        if B {
            self.branchings += 1;
        }
    }

    pub fn print(&self) {
        if B {
            println!("{}", self);
        }
    }
}

impl<const B: bool> fmt::Display for Statistics<B> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if B {
            let total_lps: usize = self.lp_solves_per_depth.iter().sum();
            writeln!(
                f,
                "probing LPs {} ({} iterations) | per depth {:?} | cutoffs per depth {:?}",
                total_lps, self.probing_iterations, self.lp_solves_per_depth, self.cutoffs_per_depth
            )?;
            writeln!(
                f,
                "domreds {}/{} applied | clauses {}/{} applied | reeval hits {} | pc shortcuts {} | replays {} | prefilters {} | branchings {}",
                self.domain_reductions_applied,
                self.domain_reductions_found,
                self.clauses_applied,
                self.clauses_found,
                self.reeval_cache_hits,
                self.pseudocost_shortcuts,
                self.replays,
                self.prefilter_runs,
                self.branchings
            )
        } else {
            write!(f, "")
        }
    }
}

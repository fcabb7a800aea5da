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

//! The lookahead branching engine. One call to [`LookaheadBrancher::select`]
//! probes the down and up child of every fractional candidate inside the
//! LP's probing mode, recurses the same scheme on the most promising
//! children, and turns what the probes revealed into one of three outcomes
//! for the real node: a cutoff, tightenings (bounds or implied clauses), or
//! an executed branching on the candidate with the best combined gain.
//!
//! The engine is generic over a [`SearchContext`]: the LP relaxation, the
//! constraint layer of the real node and the pseudocost records of the
//! surrounding solver stay behind traits.

use crate::common::{
    combine_child_bounds, BranchingDirection, Decision, Literal, ProbeResult, Status, Verdict,
    FEAS_EPSILON,
};
use crate::config::Config;
use crate::core::binary::BinConsData;
use crate::core::candidate::CandidateList;
use crate::core::domain::DomainReductions;
use crate::interface::{LpResult, SearchContext};
use crate::persistent::PersistentData;
use crate::statistics::Statistics;
use crate::PEAK_ALLOC;

/// Combines the objective gains of the two children into a single score.
/// The weaker child dominates: a candidate that improves both children a
/// little beats one that improves a single child a lot.
fn calculate_score(down_gain: f64, up_gain: f64) -> f64 {
    4.0 * down_gain.min(up_gain) + down_gain.max(up_gain)
}

/// The branching engine. The const generic `S` selects whether telemetry is
/// recorded; it never influences the decisions taken.
pub struct LookaheadBrancher<const S: bool> {
    /// Tuning parameters, fixed for the lifetime of the brancher
    config: Config,
    /// Counters about the work done so far
    statistics: Statistics<S>,
    /// State carried between invocations: reevaluation cache, replay cache
    /// and the rotation index over the candidate list
    persistent: PersistentData,
    /// Memory limit (in mb) above which the carried state is dropped
    mlimit: u64,
}

impl<const S: bool> LookaheadBrancher<S> {
    pub fn new(config: Config) -> Self {
        let mlimit = config.memory_limit();
        Self {
            config,
            statistics: Statistics::default(),
            persistent: PersistentData::new(),
            mlimit,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn statistics(&self) -> &Statistics<S> {
        &self.statistics
    }

    /// Runs one full variable selection at the current node of `context`
    /// and applies its outcome to the real node.
    pub fn select<C: SearchContext>(&mut self, context: &mut C) -> Verdict {
        if PEAK_ALLOC.current_usage_as_mb() as u64 >= self.mlimit {
            self.persistent.reset();
        }
        if context.stop_requested() {
            return Verdict::DidNotRun;
        }
        let depth = context.depth();
        let depth_limit = context.depth_limit();
        if depth_limit.saturating_sub(depth) < self.config.recursion_depth() {
            return Verdict::DidNotRun;
        }

        let base_solution = context.lp_solution();
        let base_objective = context.lp_objective();

        // an immediately repeated call on the very same LP solution replays
        // the stored decision without a single probing solve
        if let Some(decision) = self.persistent.replay(&base_solution) {
            let decision = decision.clone();
            self.statistics.replay();
            return self.execute_decision(context, decision);
        }
        self.persistent.clear_replay();

        let fractional = context.fractional_candidates();
        if fractional.is_empty() {
            return Verdict::DidNotFind;
        }
        let mut candidates: CandidateList<C::WarmStart> = CandidateList::from_fractional(fractional);
        let mut status = Status::default();
        let mut domain_reductions = DomainReductions::new();
        let mut binary_constraints = BinConsData::new();

        if self.config.abbreviated() && candidates.len() > self.config.max_candidates() {
            self.prefilter(
                context,
                &mut candidates,
                base_objective,
                &mut domain_reductions,
                &base_solution,
                &mut status,
            );
        }

        let mut decision = None;

        // a reduction discovered while filtering restarts the node instead
        // of branching on the surviving candidates
        if !status.stops_scanning() && !status.domain_reduction {
            context.start_probing();
            let outcome = self.select_recursive(
                context,
                &mut candidates,
                self.config.recursion_depth(),
                base_objective,
                &mut domain_reductions,
                &mut binary_constraints,
                &base_solution,
                &mut status,
                true,
            );
            context.end_probing();
            if let Ok(found) = outcome {
                decision = found;
            }
        }

        self.finish(
            context,
            decision,
            &domain_reductions,
            &binary_constraints,
            &base_solution,
            status,
        )
    }

    /// Turns the harvested side information and the selected decision into
    /// the final verdict, applying clauses and bound tightenings to the
    /// real node on the way.
    fn finish<C: SearchContext>(
        &mut self,
        context: &mut C,
        decision: Option<Decision>,
        domain_reductions: &DomainReductions,
        binary_constraints: &BinConsData,
        base_solution: &[f64],
        mut status: Status,
    ) -> Verdict {
        if status.cutoff {
            return Verdict::CutOff;
        }
        // an external stop or an incomplete probe pair aborts the whole
        // attempt, everything harvested so far is discarded uncommitted
        if status.limit_reached || status.depth_too_small {
            return Verdict::DidNotRun;
        }

        let mut application_cutoff = false;

        if self.config.use_implied_clauses() && !status.lp_error {
            let mut applied = 0;
            for clause in binary_constraints.constraints() {
                if !clause.is_violated() {
                    continue;
                }
                let literals = clause.literals();
                if literals.len() == 2 && self.config.use_root_cliques() && context.depth() == 0 {
                    let pair = [literals[0], literals[1]];
                    let clique = context.add_two_literal_clique(&pair);
                    if clique.infeasible {
                        application_cutoff = true;
                    }
                    if !clique.bound_changes.is_empty() {
                        status.domain_reduction = true;
                    }
                } else {
                    context.add_clause(literals);
                }
                applied += 1;
            }
            if applied > 0 {
                status.added_constraints = true;
                self.statistics.clauses_applied(applied);
            }
        }

        if self.config.use_domain_reductions() && !status.lp_error && !application_cutoff {
            let mut applied = 0;
            for variable in domain_reductions.variables_sorted() {
                if let Some(entry) = domain_reductions.lower_bound(variable) {
                    if entry.bound > context.lower_bound(variable) + FEAS_EPSILON {
                        let result = context.tighten_lower_bound(variable, entry.bound);
                        if result.infeasible {
                            application_cutoff = true;
                            break;
                        }
                        if result.tightened {
                            applied += 1;
                        }
                    }
                }
                if let Some(entry) = domain_reductions.upper_bound(variable) {
                    if entry.bound < context.upper_bound(variable) - FEAS_EPSILON {
                        let result = context.tighten_upper_bound(variable, entry.bound);
                        if result.infeasible {
                            application_cutoff = true;
                            break;
                        }
                        if result.tightened {
                            applied += 1;
                        }
                    }
                }
            }
            if applied > 0 {
                status.domain_reduction = true;
                self.statistics.domain_reductions_applied(applied);
            }
        }

        // nothing harvested invalidates the base LP solution, so the
        // decision stays replayable on the next call with the same LP
        if self.config.store_unviolated_decision() && !status.lp_error && !application_cutoff {
            if let Some(decision) = &decision {
                if binary_constraints.violated_count() == 0
                    && domain_reductions.violated_count() == 0
                {
                    self.persistent
                        .store_replay(decision.clone(), base_solution.to_vec());
                }
            }
        }

        if application_cutoff {
            return Verdict::CutOff;
        }
        if status.added_constraints {
            return Verdict::ConstraintsAdded;
        }
        if status.domain_reduction || status.propagation_domred {
            return Verdict::ReducedDomain;
        }
        if status.lp_error {
            return Verdict::DidNotFind;
        }
        match decision {
            Some(decision) => self.execute_decision(context, decision),
            None => Verdict::DidNotFind,
        }
    }

    /// Creates the two real children around the decided value and seeds
    /// them with the dual bounds the probes proved.
    fn execute_decision<C: SearchContext>(
        &mut self,
        context: &mut C,
        decision: Decision,
    ) -> Verdict {
        log::debug!(
            "branching on variable {} around {}",
            decision.variable.0,
            decision.value
        );
        let (down_child, up_child) = context.branch(decision.variable, decision.value);
        if decision.down_valid {
            context.update_node_lower_bound(down_child, decision.down_bound);
        }
        if decision.up_valid {
            context.update_node_lower_bound(up_child, decision.up_bound);
        }
        self.statistics.branching_executed();
        Verdict::Branched(decision)
    }

    /// One recursion frame: probes both children of every candidate, keeps
    /// the best scored one and harvests cutoff information into the shared
    /// sinks. `parent_objective` is the LP objective of the node this frame
    /// selects for; the returned decision carries a dual bound proven for
    /// that node.
    ///
    /// Setting `status.cutoff` and returning `Ok(None)` means the frame
    /// proved its own node infeasible; the caller translates that into a
    /// cutoff of the corresponding probing child.
    #[allow(clippy::too_many_arguments)]
    fn select_recursive<C: SearchContext>(
        &mut self,
        context: &mut C,
        candidates: &mut CandidateList<C::WarmStart>,
        recursion_depth: usize,
        parent_objective: f64,
        domain_reductions: &mut DomainReductions,
        binary_constraints: &mut BinConsData,
        base_solution: &[f64],
        status: &mut Status,
        top_level: bool,
    ) -> LpResult<Option<Decision>> {
        if candidates.is_empty() {
            return Ok(None);
        }
        if candidates.len() == 1 && !self.config.force_branching() {
            let candidate = candidates.get(0);
            return Ok(Some(Decision::from_candidate(
                candidate.variable(),
                candidate.lp_value(),
                parent_objective,
            )));
        }
        if context.depth() + context.probing_depth() + recursion_depth > context.depth_limit() {
            status.depth_too_small = true;
            return Ok(None);
        }

        let count = candidates.len();
        // the rotation index lives in the cross-call store, which only the
        // top frame owns; transient deeper frames scan from the front
        let start = if top_level {
            self.persistent.start_index(count)
        } else {
            0
        };
        let mut examined = 0;
        let mut best_decision: Option<Decision> = None;
        let mut best_score = f64::NEG_INFINITY;
        let mut proven_bound = parent_objective;

        for offset in 0..count {
            let index = (start + offset) % count;
            if context.stop_requested() {
                status.limit_reached = true;
                break;
            }
            if self.constraint_cap_reached(domain_reductions, binary_constraints) {
                status.max_constraints_reached = true;
                break;
            }
            examined += 1;

            let variable = candidates.get(index).variable();
            let lp_value = candidates.get(index).lp_value();

            let cached = if top_level {
                self.persistent.reusable_branching(
                    variable,
                    context.current_node(),
                    context.lp_solve_count(),
                    self.config.reeval_age(),
                )
            } else {
                None
            };
            let from_cache = cached.is_some();

            let mut down_reductions = DomainReductions::new();
            let mut up_reductions = DomainReductions::new();
            let (down, up) = match cached {
                Some(pair) => {
                    self.statistics.reeval_cache_hit();
                    pair
                }
                None => {
                    let order = if self.config.down_branch_first() {
                        [BranchingDirection::Down, BranchingDirection::Up]
                    } else {
                        [BranchingDirection::Up, BranchingDirection::Down]
                    };
                    let mut down = ProbeResult::cutoff(0);
                    let mut up = ProbeResult::cutoff(0);
                    for direction in order {
                        let local = match direction {
                            BranchingDirection::Down => &mut down_reductions,
                            BranchingDirection::Up => &mut up_reductions,
                        };
                        let result = self.probe_direction(
                            context,
                            candidates,
                            index,
                            direction,
                            recursion_depth,
                            local,
                            binary_constraints,
                            base_solution,
                            status,
                        )?;
                        match direction {
                            BranchingDirection::Down => down = result,
                            BranchingDirection::Up => up = result,
                        }
                        if status.limit_reached || status.depth_too_small {
                            break;
                        }
                    }
                    (down, up)
                }
            };

            // a limit inside the pair leaves it incomplete, nothing can be
            // concluded from it
            if status.limit_reached || status.depth_too_small {
                break;
            }

            if top_level && !from_cache && self.config.reeval_age() > 0 {
                self.persistent.store_branching(
                    variable,
                    context.current_node(),
                    context.lp_solve_count(),
                    down,
                    up,
                );
            }

            if down.cutoff && up.cutoff {
                // neither rounding is feasible, the examined node itself is
                // infeasible
                status.cutoff = true;
                break;
            }

            if let Some(bound) = combine_child_bounds(&down, &up) {
                if bound > proven_bound {
                    proven_bound = bound;
                }
            }

            if down.cutoff || up.cutoff {
                if self.config.use_domain_reductions() && !from_cache {
                    let base_value = base_solution[variable.0];
                    if down.cutoff {
                        domain_reductions.add_lower_bound(variable, lp_value.ceil(), 1, base_value);
                    } else {
                        domain_reductions.add_upper_bound(
                            variable,
                            lp_value.floor(),
                            1,
                            base_value,
                        );
                    }
                    self.statistics.domain_reduction_found();
                }
            } else if down.dual_bound_valid && up.dual_bound_valid {
                let down_gain = (down.objective - parent_objective).max(0.0);
                let up_gain = (up.objective - parent_objective).max(0.0);
                let score = calculate_score(down_gain, up_gain);
                // a later candidate with an equal score wins, so equally
                // scored candidates keep rotating over invocations
                if score >= best_score {
                    best_score = score;
                    let mut decision =
                        Decision::from_candidate(variable, lp_value, parent_objective);
                    decision.down_bound = down.dual_bound;
                    decision.down_valid = true;
                    decision.up_bound = up.dual_bound;
                    decision.up_valid = true;
                    best_decision = Some(decision);
                }
                if top_level && !from_cache {
                    let fractionality = candidates.get(index).fractionality();
                    context.update_pseudocost(variable, -fractionality, down_gain, 1.0);
                    context.update_pseudocost(variable, 1.0 - fractionality, up_gain, 1.0);
                }
                if self.config.use_domain_reductions() && !from_cache {
                    domain_reductions.merge_children(&down_reductions, &up_reductions, base_solution);
                }
            }

            if status.stops_scanning() {
                break;
            }
        }

        if top_level {
            self.persistent.set_start_index((start + examined) % count);
        }

        if let Some(decision) = best_decision.as_mut() {
            decision.proven_bound = proven_bound;
        }
        // a candidate whose own domain got fixed away by the harvested
        // reductions cannot be branched on anymore
        if let Some(decision) = &best_decision {
            if domain_reductions.fixes_out(decision.variable, decision.value) {
                status.propagation_domred = true;
                best_decision = None;
            }
        }
        Ok(best_decision)
    }

    /// Probes one child of one candidate: opens a probing node, applies the
    /// rounding bound, solves, recurses if depth remains and closes the
    /// node again. The probing tree is left exactly as it was entered,
    /// also on error.
    #[allow(clippy::too_many_arguments)]
    fn probe_direction<C: SearchContext>(
        &mut self,
        context: &mut C,
        candidates: &mut CandidateList<C::WarmStart>,
        index: usize,
        direction: BranchingDirection,
        recursion_depth: usize,
        local_reductions: &mut DomainReductions,
        binary_constraints: &mut BinConsData,
        base_solution: &[f64],
        status: &mut Status,
    ) -> LpResult<ProbeResult> {
        let variable = candidates.get(index).variable();
        let entry_depth = context.probing_depth();
        let track_binary = self.config.use_implied_clauses() && context.is_binary(variable);
        if track_binary {
            binary_constraints
                .push_decision(Literal::new(variable, direction == BranchingDirection::Up));
        }
        context.new_probing_node();

        let close = |context: &mut C, binary_constraints: &mut BinConsData| {
            context.backtrack_probing(entry_depth);
            if track_binary {
                let _ = binary_constraints.pop_decision();
            }
        };

        let mut result = match self.execute_branching(
            context,
            candidates,
            index,
            direction,
            local_reductions,
            base_solution,
            status,
        ) {
            Ok(result) => result,
            Err(error) => {
                close(context, binary_constraints);
                return Err(error);
            }
        };

        if result.cutoff {
            self.register_probe_cutoff(context, binary_constraints, base_solution, track_binary);
        } else if recursion_depth > 1 && !status.stops_scanning() {
            let fractional = context.fractional_candidates();
            if !fractional.is_empty() {
                let mut child_candidates: CandidateList<C::WarmStart> =
                    CandidateList::from_fractional(fractional);
                match self.select_recursive(
                    context,
                    &mut child_candidates,
                    recursion_depth - 1,
                    result.objective,
                    local_reductions,
                    binary_constraints,
                    base_solution,
                    status,
                    false,
                ) {
                    Ok(Some(deeper)) => {
                        // whatever the deeper frame proved for this child
                        // strengthens the child's own dual bound
                        if deeper.proven_bound > result.dual_bound {
                            result.dual_bound = deeper.proven_bound;
                        }
                    }
                    Ok(None) => {
                        if status.cutoff {
                            // the deeper frame proved this child infeasible;
                            // the cutoff belongs to the child, not to the
                            // node this selection runs at
                            status.cutoff = false;
                            result = ProbeResult::cutoff(result.iterations);
                            self.register_probe_cutoff(
                                context,
                                binary_constraints,
                                base_solution,
                                track_binary,
                            );
                        }
                    }
                    Err(error) => {
                        close(context, binary_constraints);
                        return Err(error);
                    }
                }
            }
        }

        close(context, binary_constraints);
        Ok(result)
    }

    /// Records a cutoff found in the current probing node: the telemetry
    /// counter, and the implied clause excluding the current path when the
    /// whole path consists of binary decisions.
    fn register_probe_cutoff<C: SearchContext>(
        &mut self,
        context: &C,
        binary_constraints: &mut BinConsData,
        base_solution: &[f64],
        track_binary: bool,
    ) {
        self.statistics
            .probe_cutoff(context.depth() + context.probing_depth());
        if track_binary
            && binary_constraints.path_depth() == context.probing_depth()
            && binary_constraints.create_constraint(base_solution)
        {
            self.statistics.clause_found();
        }
    }

    /// Applies the rounding bound of one child inside the current probing
    /// node, optionally propagates and warm-starts, and solves its LP.
    #[allow(clippy::too_many_arguments)]
    fn execute_branching<C: SearchContext>(
        &mut self,
        context: &mut C,
        candidates: &mut CandidateList<C::WarmStart>,
        index: usize,
        direction: BranchingDirection,
        local_reductions: &mut DomainReductions,
        base_solution: &[f64],
        status: &mut Status,
    ) -> LpResult<ProbeResult> {
        let variable = candidates.get(index).variable();
        let lp_value = candidates.get(index).lp_value();
        let bound = match direction {
            BranchingDirection::Down => lp_value.floor(),
            BranchingDirection::Up => lp_value.ceil(),
        };
        log::debug!(
            "probing {} child of variable {}: bound {}",
            direction,
            variable.0,
            bound
        );
        context.tighten_probing_bound(variable, bound, direction);

        if self.config.reuse_basis() {
            let candidate = candidates.get(index);
            let warm_start = match direction {
                BranchingDirection::Down => candidate.down_warm_start(),
                BranchingDirection::Up => candidate.up_warm_start(),
            };
            if let Some(warm_start) = warm_start {
                context.restore_warm_start(warm_start);
            }
        }

        if self.config.max_prop_rounds() != 0 {
            let propagation = context.propagate(self.config.max_prop_rounds());
            if self.config.use_domain_reductions() {
                for change in &propagation.bound_changes {
                    let base_value = base_solution[change.variable.0];
                    match change.direction {
                        BranchingDirection::Up => local_reductions.add_lower_bound(
                            change.variable,
                            change.bound,
                            1,
                            base_value,
                        ),
                        BranchingDirection::Down => local_reductions.add_upper_bound(
                            change.variable,
                            change.bound,
                            1,
                            base_value,
                        ),
                    }
                }
            }
            if propagation.cutoff {
                return Ok(ProbeResult::cutoff(0));
            }
        }

        let outcome = match context.solve_probing_lp(self.config.lp_iteration_limit()) {
            Ok(outcome) => outcome,
            Err(error) => {
                status.lp_error = true;
                return Err(error);
            }
        };
        self.statistics
            .lp_solved(context.depth() + context.probing_depth(), outcome.iterations);
        if outcome.infeasible {
            return Ok(ProbeResult::cutoff(outcome.iterations));
        }
        if outcome.limit_reached {
            status.limit_reached = true;
            return Ok(ProbeResult::interrupted(outcome.objective, outcome.iterations));
        }
        let cutoff = outcome.objective >= context.cutoff_bound() - FEAS_EPSILON;
        Ok(ProbeResult::solved(outcome.objective, cutoff, outcome.iterations))
    }

    /// Reduces a long candidate list to the `max_candidates` most promising
    /// entries using one cheap probe pair per unscored candidate, or the
    /// pseudocost record when it is reliable enough to skip the probes
    /// entirely. Scores persist across calls, a candidate scored by an
    /// earlier invocation is not probed again.
    #[allow(clippy::too_many_arguments)]
    fn prefilter<C: SearchContext>(
        &mut self,
        context: &mut C,
        candidates: &mut CandidateList<C::WarmStart>,
        parent_objective: f64,
        domain_reductions: &mut DomainReductions,
        base_solution: &[f64],
        status: &mut Status,
    ) {
        self.statistics.prefilter_run();
        let mut scores = self.persistent.take_scores(self.config.max_candidates());
        let mut needs_probe = Vec::new();

        for index in 0..candidates.len() {
            let candidate = candidates.get(index);
            let variable = candidate.variable();
            if scores.score(variable).is_some() {
                continue;
            }
            let reliable = self.config.abbreviated_pseudocosts()
                && context.reliability_samples(variable, BranchingDirection::Down)
                    >= self.config.reliability_threshold()
                && context.reliability_samples(variable, BranchingDirection::Up)
                    >= self.config.reliability_threshold();
            if reliable {
                let fractionality = candidate.fractionality();
                let down_gain = context.pseudocost(variable, -fractionality).max(0.0);
                let up_gain = context.pseudocost(variable, 1.0 - fractionality).max(0.0);
                if let Some(evicted) = scores.insert(variable, calculate_score(down_gain, up_gain))
                {
                    candidates.release_warm_starts_of(evicted);
                }
                self.statistics.pseudocost_shortcut();
            } else {
                needs_probe.push(index);
            }
        }

        if !needs_probe.is_empty() {
            context.start_probing();
            'candidates: for index in needs_probe {
                if context.stop_requested() {
                    status.limit_reached = true;
                    break;
                }
                let variable = candidates.get(index).variable();
                let lp_value = candidates.get(index).lp_value();
                let mut gains = [0.0; 2];
                let mut cutoffs = [false; 2];
                for (slot, direction) in
                    [BranchingDirection::Down, BranchingDirection::Up].into_iter().enumerate()
                {
                    context.new_probing_node();
                    let bound = match direction {
                        BranchingDirection::Down => lp_value.floor(),
                        BranchingDirection::Up => lp_value.ceil(),
                    };
                    context.tighten_probing_bound(variable, bound, direction);
                    let solve = context.solve_probing_lp(self.config.prefilter_lp_iterations());
                    match solve {
                        Ok(outcome) => {
                            self.statistics.lp_solved(
                                context.depth() + context.probing_depth(),
                                outcome.iterations,
                            );
                            if outcome.infeasible {
                                cutoffs[slot] = true;
                            } else {
                                gains[slot] = (outcome.objective - parent_objective).max(0.0);
                                if self.config.reuse_basis() && !outcome.limit_reached {
                                    let warm_start = context.save_warm_start();
                                    let candidate = candidates.get_mut(index);
                                    match direction {
                                        BranchingDirection::Down => {
                                            candidate.set_down_warm_start(warm_start)
                                        }
                                        BranchingDirection::Up => {
                                            candidate.set_up_warm_start(warm_start)
                                        }
                                    }
                                }
                            }
                        }
                        Err(_) => {
                            status.lp_error = true;
                            context.backtrack_probing(0);
                            break 'candidates;
                        }
                    }
                    context.backtrack_probing(0);
                }
                if cutoffs[0] && cutoffs[1] {
                    status.cutoff = true;
                    break;
                }
                // a one-sided infeasibility already fixes the variable, the
                // node gets restarted with the tightened bound instead of
                // filtering any further
                if (cutoffs[0] || cutoffs[1]) && self.config.use_domain_reductions() {
                    let base_value = base_solution[variable.0];
                    if cutoffs[0] {
                        domain_reductions.add_lower_bound(variable, lp_value.ceil(), 1, base_value);
                    } else {
                        domain_reductions.add_upper_bound(
                            variable,
                            lp_value.floor(),
                            1,
                            base_value,
                        );
                    }
                    self.statistics.domain_reduction_found();
                    status.domain_reduction = true;
                    break;
                }
                if cutoffs[0] {
                    gains[0] = f64::INFINITY;
                }
                if cutoffs[1] {
                    gains[1] = f64::INFINITY;
                }
                if let Some(evicted) = scores.insert(variable, calculate_score(gains[0], gains[1]))
                {
                    candidates.release_warm_starts_of(evicted);
                }
            }
            context.end_probing();
        }

        if !status.stops_scanning() && !status.domain_reduction {
            let keep = scores.best_variables();
            candidates.retain_ordered(&keep);
        }
        self.persistent.store_scores(scores);
    }

    fn constraint_cap_reached(
        &self,
        domain_reductions: &DomainReductions,
        binary_constraints: &BinConsData,
    ) -> bool {
        let cap = self.config.max_violated_constraints();
        cap >= 0
            && (domain_reductions.violated_count() + binary_constraints.violated_count()) as i64
                >= cap
    }
}

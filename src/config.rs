use clap::Parser;

/// The declarative knobs of the lookahead engine. Defaults follow the
/// reference parameterization: two recursion levels, both side-information
/// channels on, no propagation before the probing LPs.
#[derive(Parser, Debug, Clone)]
#[clap(name = "labranch", version, about)]
pub struct Config {
    /// How many levels of tentative branchings are simulated (>= 1)
    #[clap(long, default_value_t = 2)]
    recursion_depth: usize,
    /// Stop scanning candidates once this many violated clauses and domain
    /// reductions were harvested (-1: unbounded)
    #[clap(long, default_value_t = -1)]
    max_violated_constraints: i64,
    /// Number of intermediate LP solves after which a variable already
    /// probed at the current node is probed again instead of reusing the
    /// stored results
    #[clap(long, default_value_t = 0)]
    reeval_age: u64,
    /// Probe even when a single fractional candidate exists
    #[clap(long, default_value_t = false)]
    force_branching: bool,
    /// Harvest and apply domain reductions
    #[clap(long, default_value_t = true)]
    use_domain_reductions: bool,
    /// Harvest and apply implied binary clauses
    #[clap(long, default_value_t = true)]
    use_implied_clauses: bool,
    /// Additionally assert two-literal clauses as cliques when the engine
    /// runs at the root node
    #[clap(long, default_value_t = false)]
    use_root_cliques: bool,
    /// Pre-filter the candidate set with single-level scores before the
    /// full lookahead
    #[clap(long, default_value_t = false)]
    abbreviated: bool,
    /// Maximum number of candidates kept by the abbreviated pre-filter
    #[clap(long, default_value_t = 4)]
    max_candidates: usize,
    /// Reuse the LP bases saved during the pre-filter probes
    #[clap(long, default_value_t = true)]
    reuse_basis: bool,
    /// Let the pre-filter score a candidate from its pseudocosts instead of
    /// probing, once enough samples exist
    #[clap(long, default_value_t = true)]
    abbreviated_pseudocosts: bool,
    /// Down and up sample counts a pseudocost needs before it is trusted
    #[clap(long, default_value_t = 5)]
    reliability_threshold: u64,
    /// Cache a decision whose side information does not cut off the base
    /// LP solution, and replay it when called again on the same solution
    #[clap(long, default_value_t = true)]
    store_unviolated_decision: bool,
    /// Probe the down branch before the up branch
    #[clap(long, default_value_t = true)]
    down_branch_first: bool,
    /// Propagation rounds before each probing LP solve (0: none, -1: no
    /// limit)
    #[clap(long, default_value_t = 0)]
    max_prop_rounds: i32,
    /// Iteration limit for the probing LP solves of the main recursion
    /// (-1: no limit)
    #[clap(long, default_value_t = -1)]
    lp_iteration_limit: i64,
    /// Iteration limit for the single-level pre-filter probes
    #[clap(long, default_value_t = 10)]
    prefilter_lp_iterations: i64,
    /// Memory limit in mega-bytes; above it the persistent reuse data is
    /// dropped
    #[clap(long, default_value_t = u64::MAX)]
    memory_limit: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            recursion_depth: 2,
            max_violated_constraints: -1,
            reeval_age: 0,
            force_branching: false,
            use_domain_reductions: true,
            use_implied_clauses: true,
            use_root_cliques: false,
            abbreviated: false,
            max_candidates: 4,
            reuse_basis: true,
            abbreviated_pseudocosts: true,
            reliability_threshold: 5,
            store_unviolated_decision: true,
            down_branch_first: true,
            max_prop_rounds: 0,
            lp_iteration_limit: -1,
            prefilter_lp_iterations: 10,
            memory_limit: u64::MAX,
        }
    }
}

impl Config {
    pub fn recursion_depth(&self) -> usize {
        self.recursion_depth.max(1)
    }

    pub fn max_violated_constraints(&self) -> i64 {
        self.max_violated_constraints
    }

    pub fn reeval_age(&self) -> u64 {
        self.reeval_age
    }

    pub fn force_branching(&self) -> bool {
        self.force_branching
    }

    pub fn use_domain_reductions(&self) -> bool {
        self.use_domain_reductions
    }

    pub fn use_implied_clauses(&self) -> bool {
        self.use_implied_clauses
    }

    pub fn use_root_cliques(&self) -> bool {
        self.use_root_cliques
    }

    pub fn abbreviated(&self) -> bool {
        self.abbreviated
    }

    pub fn max_candidates(&self) -> usize {
        self.max_candidates.max(1)
    }

    pub fn reuse_basis(&self) -> bool {
        self.reuse_basis
    }

    pub fn abbreviated_pseudocosts(&self) -> bool {
        self.abbreviated_pseudocosts
    }

    pub fn reliability_threshold(&self) -> u64 {
        self.reliability_threshold
    }

    pub fn store_unviolated_decision(&self) -> bool {
        self.store_unviolated_decision
    }

    pub fn down_branch_first(&self) -> bool {
        self.down_branch_first
    }

    pub fn max_prop_rounds(&self) -> i32 {
        self.max_prop_rounds
    }

    pub fn lp_iteration_limit(&self) -> i64 {
        self.lp_iteration_limit
    }

    pub fn prefilter_lp_iterations(&self) -> i64 {
        self.prefilter_lp_iterations
    }

    pub fn memory_limit(&self) -> u64 {
        self.memory_limit
    }

    pub fn set_recursion_depth(&mut self, value: usize) {
        self.recursion_depth = value;
    }

    pub fn set_max_violated_constraints(&mut self, value: i64) {
        self.max_violated_constraints = value;
    }

    pub fn set_reeval_age(&mut self, value: u64) {
        self.reeval_age = value;
    }

    pub fn set_force_branching(&mut self, value: bool) {
        self.force_branching = value;
    }

    pub fn set_use_domain_reductions(&mut self, value: bool) {
        self.use_domain_reductions = value;
    }

    pub fn set_use_implied_clauses(&mut self, value: bool) {
        self.use_implied_clauses = value;
    }

    pub fn set_use_root_cliques(&mut self, value: bool) {
        self.use_root_cliques = value;
    }

    pub fn set_abbreviated(&mut self, value: bool) {
        self.abbreviated = value;
    }

    pub fn set_max_candidates(&mut self, value: usize) {
        self.max_candidates = value;
    }

    pub fn set_reuse_basis(&mut self, value: bool) {
        self.reuse_basis = value;
    }

    pub fn set_abbreviated_pseudocosts(&mut self, value: bool) {
        self.abbreviated_pseudocosts = value;
    }

    pub fn set_reliability_threshold(&mut self, value: u64) {
        self.reliability_threshold = value;
    }

    pub fn set_store_unviolated_decision(&mut self, value: bool) {
        self.store_unviolated_decision = value;
    }

    pub fn set_down_branch_first(&mut self, value: bool) {
        self.down_branch_first = value;
    }

    pub fn set_max_prop_rounds(&mut self, value: i32) {
        self.max_prop_rounds = value;
    }

    pub fn set_lp_iteration_limit(&mut self, value: i64) {
        self.lp_iteration_limit = value;
    }

    pub fn set_prefilter_lp_iterations(&mut self, value: i64) {
        self.prefilter_lp_iterations = value;
    }

    pub fn set_memory_limit(&mut self, value: u64) {
        self.memory_limit = value;
    }
}

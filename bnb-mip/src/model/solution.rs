//! MIP solution types.

/// Status of the MIP solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MipStatus {
    /// Search completed and the incumbent is optimal within the gap.
    Optimal,

    /// Search stopped early; the incumbent is feasible but not proven optimal.
    Feasible,

    /// Search completed without finding an integer solution.
    Infeasible,

    /// Search stopped early without finding an integer solution.
    Failed,
}

impl MipStatus {
    /// Derive the final status from the search outcome.
    ///
    /// `normal_exit` is false when any branch stopped on a budget, abort, or
    /// consistency violation.
    pub fn from_outcome(has_incumbent: bool, normal_exit: bool) -> Self {
        match (has_incumbent, normal_exit) {
            (true, true) => MipStatus::Optimal,
            (true, false) => MipStatus::Feasible,
            (false, true) => MipStatus::Infeasible,
            (false, false) => MipStatus::Failed,
        }
    }

    /// Returns true if a feasible solution was found.
    pub fn has_solution(&self) -> bool {
        matches!(self, MipStatus::Optimal | MipStatus::Feasible)
    }

    /// Returns true if optimality was proven.
    pub fn is_optimal(&self) -> bool {
        matches!(self, MipStatus::Optimal)
    }
}

/// Complete MIP solution with diagnostics.
#[derive(Debug, Clone)]
pub struct MipSolution {
    /// Solve status.
    pub status: MipStatus,

    /// Best integer solution (empty without one).
    pub x: Vec<f64>,

    /// Objective value of best solution (NaN without one).
    pub obj_val: f64,

    /// Number of nodes whose relaxation was solved.
    pub nodes_explored: u64,

    /// Number of integer solutions found (including a seeded warm start).
    pub integer_solutions: u64,

    /// Number of times the incumbent improved.
    pub incumbent_updates: u64,

    /// Iteration counter at the end of the search.
    pub iterations: u64,

    /// Total solve time in milliseconds.
    pub solve_time_ms: u64,
}

impl Default for MipSolution {
    fn default() -> Self {
        Self {
            status: MipStatus::Infeasible,
            x: Vec::new(),
            obj_val: f64::NAN,
            nodes_explored: 0,
            integer_solutions: 0,
            incumbent_updates: 0,
            iterations: 0,
            solve_time_ms: 0,
        }
    }
}

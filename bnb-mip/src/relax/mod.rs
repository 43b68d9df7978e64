//! Continuous relaxation contract.
//!
//! The search never solves relaxations itself; it hands a node's bound
//! overrides to a [`Relaxation`] and reads back a [`RelaxationResult`].

mod knapsack;

pub use knapsack::KnapsackRelaxation;

use crate::search::NodeKey;

/// Status of a relaxation solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelaxationState {
    /// Optimal solution found.
    Optimal,

    /// Feasible (not proven optimal) solution found.
    Feasible,

    /// The relaxation is infeasible (node can be pruned).
    Infeasible,

    /// Numerical difficulties or an unbounded direction.
    Failed,

    /// Not solved.
    Unexplored,
}

impl RelaxationState {
    /// True for states that carry a usable solution.
    pub fn is_feasible(&self) -> bool {
        matches!(self, RelaxationState::Optimal | RelaxationState::Feasible)
    }
}

/// Result from solving a node relaxation.
#[derive(Debug, Clone)]
pub struct RelaxationResult {
    /// Solve status.
    pub state: RelaxationState,

    /// Objective value (meaningful only when feasible).
    pub obj_val: f64,

    /// Solution over all variables.
    pub x: Vec<f64>,
}

impl RelaxationResult {
    /// Create an optimal result.
    pub fn optimal(x: Vec<f64>, obj_val: f64) -> Self {
        Self {
            state: RelaxationState::Optimal,
            obj_val,
            x,
        }
    }

    /// Create an infeasible result.
    pub fn infeasible() -> Self {
        Self::without_solution(RelaxationState::Infeasible)
    }

    /// Create a failed result.
    pub fn failed() -> Self {
        Self::without_solution(RelaxationState::Failed)
    }

    fn without_solution(state: RelaxationState) -> Self {
        Self {
            state,
            obj_val: f64::NAN,
            x: Vec::new(),
        }
    }
}

/// Objective cut-off passed to the relaxation as an early-exit hint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObjectiveLimit {
    /// Minimisation: only objective values below this are interesting.
    Upper(f64),

    /// Maximisation: only objective values above this are interesting.
    Lower(f64),
}

impl ObjectiveLimit {
    /// True if `obj_val` cannot be of interest under this limit.
    pub fn excludes(&self, obj_val: f64) -> bool {
        match *self {
            ObjectiveLimit::Upper(limit) => obj_val > limit,
            ObjectiveLimit::Lower(limit) => obj_val < limit,
        }
    }
}

/// Solves the continuous relaxation of a node.
///
/// Called concurrently from every worker thread with distinct keys, so
/// implementations must not share mutable state between calls. The
/// objective limit is a hint: an implementation may report `Infeasible`
/// as soon as it proves the limit cannot be met, or ignore it.
pub trait Relaxation: Send + Sync {
    /// Solve the relaxation under the key's bound overrides.
    fn solve_relaxation(&self, key: &NodeKey, limit: Option<ObjectiveLimit>) -> RelaxationResult;
}

impl<F> Relaxation for F
where
    F: Fn(&NodeKey, Option<ObjectiveLimit>) -> RelaxationResult + Send + Sync,
{
    fn solve_relaxation(&self, key: &NodeKey, limit: Option<ObjectiveLimit>) -> RelaxationResult {
        self(key, limit)
    }
}

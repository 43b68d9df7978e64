//! Bounding and branching policy.

use super::{BranchDirection, NodeKey};
use crate::relax::ObjectiveLimit;
use crate::settings::MipSettings;

/// A fractional integer variable chosen for branching.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchCandidate {
    /// Position in the model's integer variable list.
    pub position: usize,

    /// Global variable index.
    pub var: usize,

    /// Current (fractional) value.
    pub value: f64,
}

/// The two children of a branched node.
#[derive(Debug, Clone)]
pub struct BranchSplit {
    /// Child explored on the current worker.
    pub continued: NodeKey,

    /// Child offered to idle workers.
    pub forked: NodeKey,

    /// Which side `continued` is on.
    pub direction: BranchDirection,
}

/// Distance of a value from the nearest integer.
pub fn fractionality(val: f64) -> f64 {
    (val - val.round()).abs()
}

/// Decides which nodes are worth exploring and how to split them.
#[derive(Debug, Clone)]
pub struct SearchPolicy {
    /// Direction of the objective.
    minimise: bool,

    /// Relative optimality gap.
    gap_rel: f64,

    /// Absolute gap floor.
    gap_abs: f64,

    /// Integrality tolerance.
    int_feas_tol: f64,
}

impl SearchPolicy {
    /// Create a policy for a model with the given direction.
    pub fn new(minimise: bool, settings: &MipSettings) -> Self {
        Self {
            minimise,
            gap_rel: settings.gap_tol,
            gap_abs: settings.gap_abs_tol,
            int_feas_tol: settings.int_feas_tol,
        }
    }

    /// True when the objective is minimised.
    pub fn is_minimisation(&self) -> bool {
        self.minimise
    }

    /// Gap allowed around an incumbent value.
    pub fn gap(&self, incumbent: f64) -> f64 {
        (incumbent * self.gap_rel).abs().max(self.gap_abs)
    }

    /// Check if a node with objective `candidate` may still improve on the incumbent.
    ///
    /// Always true while there is no incumbent.
    pub fn is_good_enough(&self, candidate: f64, incumbent: Option<f64>) -> bool {
        let Some(best) = incumbent else {
            return true;
        };
        let gap = self.gap(best);
        // NaN estimates compare false and are kept
        let dominated = if self.minimise {
            candidate >= best - gap
        } else {
            candidate <= best + gap
        };
        !dominated
    }

    /// Objective cut-off to hand to the relaxation.
    pub fn objective_limit(&self, incumbent: Option<f64>) -> Option<ObjectiveLimit> {
        let best = incumbent?;
        let gap = self.gap(best);
        Some(if self.minimise {
            ObjectiveLimit::Upper(best - gap)
        } else {
            ObjectiveLimit::Lower(best + gap)
        })
    }

    /// Pick the first fractional integer variable in ascending position order.
    ///
    /// Returns None if `x` is integer-feasible within tolerance.
    pub fn select_branch(&self, x: &[f64], key: &NodeKey) -> Option<BranchCandidate> {
        key.integer_vars()
            .iter()
            .enumerate()
            .find(|(_, &var)| fractionality(x[var]) > self.int_feas_tol)
            .map(|(position, &var)| BranchCandidate {
                position,
                var,
                value: x[var],
            })
    }

    /// Check if every integer variable of `x` is integral within tolerance.
    pub fn is_integer_feasible(&self, x: &[f64], integer_vars: &[usize]) -> bool {
        integer_vars
            .iter()
            .all(|&var| fractionality(x[var]) <= self.int_feas_tol)
    }

    /// Build both children and decide which one stays on this worker.
    ///
    /// The side whose bound is closer to the fractional value is continued.
    pub fn split(&self, key: &NodeKey, candidate: BranchCandidate, objective: f64) -> BranchSplit {
        let lower = key.create_lower_branch(candidate.position, candidate.value, objective);
        let upper = key.create_upper_branch(candidate.position, candidate.value, objective);

        if candidate.value - candidate.value.floor() > 0.5 {
            BranchSplit {
                continued: upper,
                forked: lower,
                direction: BranchDirection::Up,
            }
        } else {
            BranchSplit {
                continued: lower,
                forked: upper,
                direction: BranchDirection::Down,
            }
        }
    }
}

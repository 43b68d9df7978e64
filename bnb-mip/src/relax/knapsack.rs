//! Exact LP relaxation for box-bounded models with at most one row.
//!
//! With a single `a^T x <= b` row the LP is solved in activity space
//! (`y_j = a_j x_j`). Every variable starts at the end of its range with the
//! lowest row activity, and the remaining slack goes to the variables with
//! the largest objective gain per unit of activity (the fractional knapsack
//! rule). Variables whose activity is unbounded below set the price of the
//! row; one of them absorbs the slack. At most one variable ends strictly
//! between its bounds.

use std::cmp::Ordering;

use super::{ObjectiveLimit, Relaxation, RelaxationResult};
use crate::error::{MipError, MipResult};
use crate::model::{LinearModel, MipModel};
use crate::search::NodeKey;

/// Bound consistency tolerance.
const BOUND_TOL: f64 = 1e-9;

/// Relaxation of a [`LinearModel`] with zero or one constraints.
#[derive(Debug, Clone)]
pub struct KnapsackRelaxation {
    /// Model being relaxed.
    model: LinearModel,

    /// Objective coefficients in minimisation form.
    cost: Vec<f64>,
}

/// Outcome of the greedy box solve.
enum BoxOutcome {
    Solved(Vec<f64>),
    /// Row cannot be satisfied within the box.
    Infeasible,
    /// The objective decreases without bound.
    Unbounded,
}

/// Where a row variable sits in its activity range.
#[derive(Debug, Clone, Copy)]
enum Level {
    Low,
    High,
    At(f64),
}

/// A variable with a nonzero row coefficient.
struct RowVar {
    var: usize,
    coef: f64,
    /// Objective decrease per unit of row activity.
    gain: f64,
    /// Activity range.
    lo: f64,
    hi: f64,
    level: Level,
}

impl RowVar {
    fn activity(&self) -> f64 {
        match self.level {
            Level::Low => self.lo,
            Level::High => self.hi,
            Level::At(y) => y,
        }
    }

    /// Variable value; bound values are returned as given.
    fn value(&self, lb: f64, ub: f64) -> f64 {
        match (self.level, self.coef > 0.0) {
            (Level::Low, true) | (Level::High, false) => lb,
            (Level::Low, false) | (Level::High, true) => ub,
            (Level::At(y), _) => y / self.coef,
        }
    }
}

impl KnapsackRelaxation {
    /// Create a relaxation for `model`.
    ///
    /// Fails if the model has more than one constraint.
    pub fn new(model: &LinearModel) -> MipResult<Self> {
        if model.num_constraints() > 1 {
            return Err(MipError::InvalidProblem(format!(
                "Knapsack relaxation supports at most one constraint, model has {}",
                model.num_constraints()
            )));
        }
        let cost = if model.is_minimisation() {
            model.objective.clone()
        } else {
            model.objective.iter().map(|c| -c).collect()
        };
        Ok(Self {
            model: model.clone(),
            cost,
        })
    }

    /// Solve min cost^T x over the given box and the model row.
    fn solve_box(&self, var_lb: &[f64], var_ub: &[f64]) -> BoxOutcome {
        let row = self.model.constraints.first();
        let mut x = vec![0.0; self.cost.len()];
        let mut row_vars = Vec::new();

        for (j, &d) in self.cost.iter().enumerate() {
            let (lb, ub) = (var_lb[j], var_ub[j]);
            let a = row.map_or(0.0, |r| r.coefs[j]);

            if a == 0.0 {
                // Free of the row: cheapest bound, or any finite one at zero cost
                let value = if d > 0.0 {
                    lb
                } else if d < 0.0 {
                    ub
                } else if lb.is_finite() {
                    lb
                } else if ub.is_finite() {
                    ub
                } else {
                    0.0
                };
                if !value.is_finite() {
                    return BoxOutcome::Unbounded;
                }
                x[j] = value;
                continue;
            }

            let (lo, hi) = if a > 0.0 { (a * lb, a * ub) } else { (a * ub, a * lb) };
            row_vars.push(RowVar {
                var: j,
                coef: a,
                gain: -d / a,
                lo,
                hi,
                level: Level::Low,
            });
        }

        let row = match row {
            Some(row) => row,
            None => return BoxOutcome::Solved(x),
        };

        // The row price must be at least the gain of every variable that can
        // grow without limit and at most the gain of every variable that can
        // shrink without limit.
        let floor_price = row_vars
            .iter()
            .filter(|v| v.hi == f64::INFINITY)
            .fold(0.0_f64, |acc, v| acc.max(v.gain));

        let mut pivot: Option<usize> = None;
        for (i, v) in row_vars.iter().enumerate() {
            if v.lo != f64::NEG_INFINITY {
                continue;
            }
            let better = match pivot {
                None => true,
                Some(p) => {
                    let q = &row_vars[p];
                    v.gain < q.gain || (v.gain == q.gain && q.hi.is_finite() && v.hi.is_infinite())
                }
            };
            if better {
                pivot = Some(i);
            }
        }
        let price = pivot.map(|p| row_vars[p].gain);
        if price.is_some_and(|u| floor_price > u) {
            return BoxOutcome::Unbounded;
        }

        if let Some(u) = price {
            for (i, v) in row_vars.iter_mut().enumerate() {
                if Some(i) == pivot {
                    continue;
                }
                v.level = if v.gain > u {
                    Level::High
                } else if v.gain == u && v.lo.is_infinite() {
                    if v.hi.is_finite() {
                        Level::High
                    } else {
                        Level::At(0.0)
                    }
                } else {
                    Level::Low
                };
            }
        }

        let mut slack = row.rhs
            - row_vars
                .iter()
                .enumerate()
                .filter(|(i, _)| Some(*i) != pivot)
                .map(|(_, v)| v.activity())
                .sum::<f64>();

        match pivot {
            Some(p) => {
                let v = &mut row_vars[p];
                if slack >= v.hi {
                    v.level = Level::High;
                    slack -= v.hi;
                } else {
                    v.level = Level::At(slack);
                    slack = 0.0;
                }
            }
            None => {
                if slack < -BOUND_TOL * (1.0 + row.rhs.abs()) {
                    return BoxOutcome::Infeasible;
                }
                slack = slack.max(0.0);
            }
        }

        let mut movers: Vec<usize> = row_vars
            .iter()
            .enumerate()
            .filter(|(i, v)| {
                Some(*i) != pivot && matches!(v.level, Level::Low) && v.gain > 0.0 && v.hi > v.lo
            })
            .map(|(i, _)| i)
            .collect();
        movers.sort_by(|&i, &k| {
            let (v1, v2) = (&row_vars[i], &row_vars[k]);
            v2.gain
                .partial_cmp(&v1.gain)
                .unwrap_or(Ordering::Equal)
                .then(v1.var.cmp(&v2.var))
        });

        for i in movers {
            if slack <= 0.0 {
                break;
            }
            let v = &mut row_vars[i];
            let room = v.hi - v.lo;
            if room <= slack {
                v.level = Level::High;
                slack -= room;
            } else {
                v.level = Level::At(v.lo + slack);
                slack = 0.0;
            }
        }

        for v in &row_vars {
            x[v.var] = v.value(var_lb[v.var], var_ub[v.var]);
        }
        if x.iter().any(|v| !v.is_finite()) {
            return BoxOutcome::Unbounded;
        }
        BoxOutcome::Solved(x)
    }
}

impl Relaxation for KnapsackRelaxation {
    fn solve_relaxation(&self, key: &NodeKey, limit: Option<ObjectiveLimit>) -> RelaxationResult {
        let mut var_lb = self.model.var_lb.clone();
        let mut var_ub = self.model.var_ub.clone();
        key.apply(&mut var_lb, &mut var_ub);

        if var_lb.iter().zip(&var_ub).any(|(lb, ub)| *lb > *ub + BOUND_TOL) {
            return RelaxationResult::infeasible();
        }

        match self.solve_box(&var_lb, &var_ub) {
            BoxOutcome::Unbounded => RelaxationResult::failed(),
            BoxOutcome::Infeasible => RelaxationResult::infeasible(),
            BoxOutcome::Solved(x) => {
                let obj_val = self.model.objective(&x);
                if limit.is_some_and(|l| l.excludes(obj_val)) {
                    return RelaxationResult::infeasible();
                }
                RelaxationResult::optimal(x, obj_val)
            }
        }
    }
}

//! MIP model contract and a dense linear implementation.

use crate::error::{MipError, MipResult};

/// Feasibility tolerance used by [`LinearModel::validate`].
const VALIDATION_TOL: f64 = 1e-6;

/// What the search needs to know about a model.
///
/// Implementations must be shareable across worker threads; the search only
/// ever reads from them.
pub trait MipModel: Send + Sync {
    /// True when the objective is minimised.
    fn is_minimisation(&self) -> bool;

    /// Indices of integer-constrained variables, in ascending order.
    fn integer_vars(&self) -> &[usize];

    /// Total number of variables.
    fn num_vars(&self) -> usize;

    /// Objective value at `x`.
    fn objective(&self, x: &[f64]) -> f64;

    /// Sanity check that `x` satisfies the model's bounds and constraints.
    ///
    /// Integrality is not part of this check.
    fn validate(&self, x: &[f64]) -> bool;
}

/// Optimisation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sense {
    /// Minimise the objective.
    #[default]
    Minimize,

    /// Maximise the objective.
    Maximize,
}

/// A linear constraint: a^T x <= rhs.
#[derive(Debug, Clone)]
pub struct LinearConstraint {
    /// Coefficient vector (dense, length n).
    pub coefs: Vec<f64>,

    /// Right-hand side.
    pub rhs: f64,
}

impl LinearConstraint {
    /// Row activity a^T x.
    pub fn activity(&self, x: &[f64]) -> f64 {
        self.coefs.iter().zip(x).map(|(a, x)| a * x).sum()
    }

    /// Compute violation: a^T x - rhs (positive means violated).
    pub fn violation(&self, x: &[f64]) -> f64 {
        self.activity(x) - self.rhs
    }
}

/// Dense linear MIP:
///
/// ```text
/// min/max  c^T x + c0
/// s.t.     A x <= b
///          lb <= x <= ub
///          x_j integer for j in integer_vars
/// ```
#[derive(Debug, Clone)]
pub struct LinearModel {
    /// Optimisation direction.
    pub sense: Sense,

    /// Objective coefficients c.
    pub objective: Vec<f64>,

    /// Constant objective offset c0.
    pub objective_constant: f64,

    /// Lower bounds for all variables.
    pub var_lb: Vec<f64>,

    /// Upper bounds for all variables.
    pub var_ub: Vec<f64>,

    /// Indices of integer variables (includes binary), ascending.
    pub integer_vars: Vec<usize>,

    /// Indices of binary variables (subset of integer_vars).
    pub binary_vars: Vec<usize>,

    /// Inequality rows.
    pub constraints: Vec<LinearConstraint>,
}

impl LinearModel {
    /// Create a model with continuous, unbounded variables and no rows.
    pub fn new(sense: Sense, objective: Vec<f64>) -> Self {
        let n = objective.len();
        Self {
            sense,
            objective,
            objective_constant: 0.0,
            var_lb: vec![f64::NEG_INFINITY; n],
            var_ub: vec![f64::INFINITY; n],
            integer_vars: Vec::new(),
            binary_vars: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// Shorthand for a minimisation model.
    pub fn minimize(objective: Vec<f64>) -> Self {
        Self::new(Sense::Minimize, objective)
    }

    /// Shorthand for a maximisation model.
    pub fn maximize(objective: Vec<f64>) -> Self {
        Self::new(Sense::Maximize, objective)
    }

    /// Set the constant objective offset.
    pub fn with_constant(mut self, c0: f64) -> Self {
        self.objective_constant = c0;
        self
    }

    /// Set bounds on one variable.
    pub fn with_bounds(mut self, var: usize, lb: f64, ub: f64) -> MipResult<Self> {
        self.check_var(var)?;
        if lb.is_nan() || ub.is_nan() {
            return Err(MipError::InvalidProblem(format!(
                "NaN bound on variable {}",
                var
            )));
        }
        self.var_lb[var] = lb;
        self.var_ub[var] = ub;
        Ok(self)
    }

    /// Set the same bounds on every variable.
    pub fn with_all_bounds(mut self, lb: f64, ub: f64) -> MipResult<Self> {
        for var in 0..self.num_vars() {
            self = self.with_bounds(var, lb, ub)?;
        }
        Ok(self)
    }

    /// Flag a variable as integer.
    pub fn integer(mut self, var: usize) -> MipResult<Self> {
        self.check_var(var)?;
        if let Err(pos) = self.integer_vars.binary_search(&var) {
            self.integer_vars.insert(pos, var);
        }
        Ok(self)
    }

    /// Flag a variable as binary (integer with [0, 1] bounds).
    pub fn binary(mut self, var: usize) -> MipResult<Self> {
        self = self.integer(var)?;
        if let Err(pos) = self.binary_vars.binary_search(&var) {
            self.binary_vars.insert(pos, var);
        }
        // Binary variables have implicit [0, 1] bounds
        self.var_lb[var] = self.var_lb[var].max(0.0);
        self.var_ub[var] = self.var_ub[var].min(1.0);
        Ok(self)
    }

    /// Flag every variable as integer.
    pub fn all_integer(mut self) -> MipResult<Self> {
        for var in 0..self.num_vars() {
            self = self.integer(var)?;
        }
        Ok(self)
    }

    /// Add a row a^T x <= rhs.
    pub fn with_constraint(mut self, coefs: Vec<f64>, rhs: f64) -> MipResult<Self> {
        if coefs.len() != self.num_vars() {
            return Err(MipError::InvalidProblem(format!(
                "Constraint has {} coefficients but model has {} variables",
                coefs.len(),
                self.num_vars()
            )));
        }
        if coefs.iter().any(|c| !c.is_finite()) || !rhs.is_finite() {
            return Err(MipError::InvalidProblem(
                "Constraint coefficients and right-hand side must be finite".to_string(),
            ));
        }
        self.constraints.push(LinearConstraint { coefs, rhs });
        Ok(self)
    }

    /// Number of constraints.
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Check if a point satisfies variable bounds.
    pub fn satisfies_bounds(&self, x: &[f64], tol: f64) -> bool {
        x.iter()
            .zip(self.var_lb.iter().zip(&self.var_ub))
            .all(|(x, (lb, ub))| *x >= lb - tol && *x <= ub + tol)
    }

    fn check_var(&self, var: usize) -> MipResult<()> {
        if var >= self.num_vars() {
            return Err(MipError::InvalidProblem(format!(
                "Variable {} out of range, model has {} variables",
                var,
                self.num_vars()
            )));
        }
        Ok(())
    }
}

impl MipModel for LinearModel {
    fn is_minimisation(&self) -> bool {
        self.sense == Sense::Minimize
    }

    fn integer_vars(&self) -> &[usize] {
        &self.integer_vars
    }

    fn num_vars(&self) -> usize {
        self.objective.len()
    }

    fn objective(&self, x: &[f64]) -> f64 {
        self.objective_constant
            + self
                .objective
                .iter()
                .zip(x)
                .map(|(c, x)| c * x)
                .sum::<f64>()
    }

    fn validate(&self, x: &[f64]) -> bool {
        if x.len() != self.num_vars() || x.iter().any(|v| !v.is_finite()) {
            return false;
        }
        self.satisfies_bounds(x, VALIDATION_TOL)
            && self
                .constraints
                .iter()
                .all(|row| row.violation(x) <= VALIDATION_TOL * (1.0 + row.rhs.abs()))
    }
}

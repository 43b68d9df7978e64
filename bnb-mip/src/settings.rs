//! Configuration settings for the branch-and-bound search.

use std::time::Duration;

use crate::error::{MipError, MipResult};

/// MIP solver settings.
#[derive(Debug, Clone)]
pub struct MipSettings {
    // === Termination criteria ===
    /// Soft iteration budget.
    ///
    /// Checked before every node; once reached, new nodes return without
    /// solving and the search is reported as incomplete.
    pub max_iterations: u64,

    /// Hard iteration ceiling.
    ///
    /// Passing it aborts the whole solve call rather than a single branch.
    pub iterations_abort: u64,

    /// Time limit in milliseconds (None = unlimited).
    pub time_limit_ms: Option<u64>,

    /// Relative optimality gap tolerance.
    /// A node is pruned unless it can beat the incumbent by |incumbent * gap_tol|.
    pub gap_tol: f64,

    /// Absolute optimality gap tolerance (floor for the relative gap).
    pub gap_abs_tol: f64,

    /// Integer feasibility tolerance.
    /// A variable is considered integer if |x - round(x)| <= int_feas_tol.
    pub int_feas_tol: f64,

    // === Search ===
    /// Re-validate every optimal relaxation against the model.
    pub validate: bool,

    /// Skip nodes whose bound set was already explored.
    pub dedup_nodes: bool,

    /// Number of worker threads (0 = rayon default).
    pub threads: usize,

    // === Output ===
    /// Print progress information.
    pub verbose: bool,

    /// Log frequency (print every N explored nodes).
    pub log_freq: u64,

    /// Log every node transition at trace level.
    pub trace: bool,
}

impl Default for MipSettings {
    fn default() -> Self {
        Self {
            // Termination
            max_iterations: 1_000_000,
            iterations_abort: u64::MAX,
            time_limit_ms: None,
            gap_tol: 1e-4,
            gap_abs_tol: 0.0,
            int_feas_tol: 1e-6,

            // Search
            validate: false,
            dedup_nodes: false,
            threads: 0,

            // Output
            verbose: false,
            log_freq: 100,
            trace: false,
        }
    }
}

impl MipSettings {
    /// Create settings with verbose output enabled.
    pub fn verbose() -> Self {
        Self {
            verbose: true,
            log_freq: 1,
            ..Self::default()
        }
    }

    /// Set time limit in seconds.
    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit_ms = Some((seconds * 1000.0) as u64);
        self
    }

    /// Set the soft iteration budget.
    pub fn with_max_iterations(mut self, iterations: u64) -> Self {
        self.max_iterations = iterations;
        self
    }

    /// Set the hard iteration ceiling.
    pub fn with_iterations_abort(mut self, ceiling: u64) -> Self {
        self.iterations_abort = ceiling;
        self
    }

    /// Set optimality gap tolerance.
    pub fn with_gap_tol(mut self, tol: f64) -> Self {
        self.gap_tol = tol;
        self
    }

    /// Set the number of worker threads.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Enable or disable node deduplication.
    pub fn with_dedup(mut self, enabled: bool) -> Self {
        self.dedup_nodes = enabled;
        self
    }

    /// Enable or disable on-the-fly validation of relaxation results.
    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.validate = enabled;
        self
    }

    /// Time limit as a duration, if any.
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_ms.map(Duration::from_millis)
    }

    /// Check that tolerances are usable.
    pub fn validate(&self) -> MipResult<()> {
        let tolerances = [
            ("gap_tol", self.gap_tol),
            ("gap_abs_tol", self.gap_abs_tol),
            ("int_feas_tol", self.int_feas_tol),
        ];
        for (name, value) in tolerances {
            if !value.is_finite() || value < 0.0 {
                return Err(MipError::InvalidSettings(format!(
                    "{} must be finite and >= 0, got {}",
                    name, value
                )));
            }
        }
        if self.int_feas_tol >= 0.5 {
            return Err(MipError::InvalidSettings(format!(
                "int_feas_tol must be < 0.5, got {}",
                self.int_feas_tol
            )));
        }
        if self.log_freq == 0 {
            return Err(MipError::InvalidSettings("log_freq must be positive".to_string()));
        }
        Ok(())
    }
}

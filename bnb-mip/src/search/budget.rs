//! Iteration and wall-clock budget shared by all node tasks.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::error::{MipError, MipResult};
use crate::settings::MipSettings;

/// Search budget for one solve call.
///
/// Two limits are kept apart: the soft budget (`max_iterations`, time
/// limit) stops new nodes from being solved, while passing the hard
/// `iterations_abort` ceiling is an error for the whole call.
#[derive(Debug)]
pub struct SearchBudget {
    /// Completed iterations (successful relaxation solves).
    iterations: AtomicU64,

    /// Set once the hard ceiling was passed.
    aborted: AtomicBool,

    /// Start time.
    start: Instant,

    /// Soft iteration budget.
    max_iterations: u64,

    /// Hard iteration ceiling.
    iterations_abort: u64,

    /// Wall-clock budget.
    time_limit: Option<Duration>,
}

impl SearchBudget {
    /// Start a fresh budget now.
    pub fn new(settings: &MipSettings) -> Self {
        Self {
            iterations: AtomicU64::new(0),
            aborted: AtomicBool::new(false),
            start: Instant::now(),
            max_iterations: settings.max_iterations,
            iterations_abort: settings.iterations_abort,
            time_limit: settings.time_limit(),
        }
    }

    /// Check whether another node may start.
    pub fn is_iteration_allowed(&self) -> bool {
        if self.aborted.load(Ordering::Acquire) {
            return false;
        }
        if self.iterations() >= self.max_iterations {
            return false;
        }
        match self.time_limit {
            Some(limit) => self.elapsed() < limit,
            None => true,
        }
    }

    /// Count one completed iteration.
    ///
    /// Fails, and stops every other node at its next budget check, once the
    /// count passes the hard ceiling.
    pub fn increment(&self) -> MipResult<u64> {
        let count = self.iterations.fetch_add(1, Ordering::AcqRel) + 1;
        if count > self.iterations_abort {
            self.aborted.store(true, Ordering::Release);
            return Err(MipError::IterationAbort {
                count,
                ceiling: self.iterations_abort,
            });
        }
        Ok(count)
    }

    /// Completed iterations so far.
    pub fn iterations(&self) -> u64 {
        self.iterations.load(Ordering::Acquire)
    }

    /// True once the hard ceiling was passed.
    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Acquire)
    }

    /// Time since the budget was created.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Get elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed().as_millis() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soft_budget() {
        let budget = SearchBudget::new(&MipSettings::default().with_max_iterations(2));
        assert!(budget.is_iteration_allowed());
        budget.increment().unwrap();
        assert!(budget.is_iteration_allowed());
        budget.increment().unwrap();
        assert!(!budget.is_iteration_allowed());
        assert!(!budget.is_aborted());
    }

    #[test]
    fn test_zero_budget() {
        let budget = SearchBudget::new(&MipSettings::default().with_max_iterations(0));
        assert!(!budget.is_iteration_allowed());
    }

    #[test]
    fn test_hard_ceiling() {
        let budget = SearchBudget::new(&MipSettings::default().with_iterations_abort(1));
        assert_eq!(budget.increment().unwrap(), 1);
        assert!(budget.is_iteration_allowed());

        match budget.increment() {
            Err(MipError::IterationAbort { count, ceiling }) => {
                assert_eq!(count, 2);
                assert_eq!(ceiling, 1);
            }
            other => panic!("expected abort, got {:?}", other),
        }
        assert!(budget.is_aborted());
        assert!(!budget.is_iteration_allowed());
    }

    #[test]
    fn test_time_limit() {
        let mut settings = MipSettings::default();
        settings.time_limit_ms = Some(0);
        let budget = SearchBudget::new(&settings);
        assert!(!budget.is_iteration_allowed());

        let budget = SearchBudget::new(&MipSettings::default().with_time_limit(3600.0));
        assert!(budget.is_iteration_allowed());
    }
}

//! Shared incumbent registry.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

/// An integer-feasible solution.
#[derive(Debug, Clone, PartialEq)]
pub struct Incumbent {
    /// Primal solution.
    pub x: Vec<f64>,

    /// Objective value.
    pub obj_val: f64,
}

/// Tracks the best known integer solution across all worker threads.
///
/// Writers compare and swap under a short write lock; readers clone an
/// `Arc` snapshot under a read lock, so a reader always sees the latest
/// recorded incumbent and never one that was already replaced.
#[derive(Debug)]
pub struct IncumbentRegistry {
    /// Direction of the objective.
    minimise: bool,

    /// Current best solution (if any).
    best: RwLock<Option<Arc<Incumbent>>>,

    /// Number of integer solutions offered.
    integer_solutions: AtomicU64,

    /// Number of times incumbent was updated.
    update_count: AtomicU64,

    /// Number of nodes whose relaxation was solved.
    nodes_explored: AtomicU64,
}

impl IncumbentRegistry {
    /// Create an empty registry.
    pub fn new(minimise: bool) -> Self {
        Self {
            minimise,
            best: RwLock::new(None),
            integer_solutions: AtomicU64::new(0),
            update_count: AtomicU64::new(0),
            nodes_explored: AtomicU64::new(0),
        }
    }

    fn improves(&self, obj: f64, current: f64) -> bool {
        if self.minimise {
            obj < current
        } else {
            obj > current
        }
    }

    /// Offer an integer solution.
    ///
    /// Replaces the incumbent if there is none or `obj` is strictly better.
    /// Returns true if the incumbent was improved.
    pub fn try_record(&self, x: &[f64], obj: f64) -> bool {
        self.integer_solutions.fetch_add(1, Ordering::Relaxed);

        if obj.is_nan() {
            return false;
        }

        // Cheap rejection without the write lock
        if let Some(current) = self.best_value() {
            if !self.improves(obj, current) {
                return false;
            }
        }

        let candidate = Arc::new(Incumbent {
            x: x.to_vec(),
            obj_val: obj,
        });

        let mut best = self.best.write();
        let accept = match best.as_ref() {
            Some(current) => self.improves(obj, current.obj_val),
            None => true,
        };
        if accept {
            *best = Some(candidate);
            self.update_count.fetch_add(1, Ordering::Relaxed);
        }
        accept
    }

    /// Current incumbent, if any.
    pub fn snapshot(&self) -> Option<Arc<Incumbent>> {
        self.best.read().clone()
    }

    /// Objective value of the incumbent, if any.
    pub fn best_value(&self) -> Option<f64> {
        self.best.read().as_ref().map(|inc| inc.obj_val)
    }

    /// Check if we have an incumbent.
    pub fn has_solution(&self) -> bool {
        self.best.read().is_some()
    }

    /// Number of integer solutions offered so far.
    pub fn integer_solutions(&self) -> u64 {
        self.integer_solutions.load(Ordering::Relaxed)
    }

    /// Number of times the incumbent improved.
    pub fn incumbent_updates(&self) -> u64 {
        self.update_count.load(Ordering::Relaxed)
    }

    /// Count one explored node; returns the new total.
    pub fn node_explored(&self) -> u64 {
        self.nodes_explored.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Number of explored nodes.
    pub fn nodes_explored(&self) -> u64 {
        self.nodes_explored.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_incumbent_registry() {
        let registry = IncumbentRegistry::new(true);

        assert!(!registry.has_solution());
        assert!(registry.best_value().is_none());

        // First solution
        assert!(registry.try_record(&[1.0, 2.0], 10.0));
        assert!(registry.has_solution());
        assert_eq!(registry.best_value(), Some(10.0));
        assert_eq!(registry.incumbent_updates(), 1);

        // Worse solution (rejected)
        assert!(!registry.try_record(&[2.0, 3.0], 15.0));
        assert_eq!(registry.best_value(), Some(10.0));

        // Equal solution (rejected, strictly better only)
        assert!(!registry.try_record(&[9.0, 9.0], 10.0));
        assert_eq!(registry.snapshot().unwrap().x, vec![1.0, 2.0]);

        // Better solution (accepted)
        assert!(registry.try_record(&[0.5, 1.0], 5.0));
        assert_eq!(registry.best_value(), Some(5.0));
        assert_eq!(registry.incumbent_updates(), 2);

        // Every offer is counted
        assert_eq!(registry.integer_solutions(), 4);
    }

    #[test]
    fn test_maximisation() {
        let registry = IncumbentRegistry::new(false);
        assert!(registry.try_record(&[1.0], 1.0));
        assert!(!registry.try_record(&[0.0], 0.0));
        assert!(registry.try_record(&[3.0], 3.0));
        assert_eq!(registry.best_value(), Some(3.0));
    }

    #[test]
    fn test_nan_rejected() {
        let registry = IncumbentRegistry::new(true);
        assert!(!registry.try_record(&[1.0], f64::NAN));
        assert!(!registry.has_solution());
    }

    #[test]
    fn test_snapshot_is_stable() {
        let registry = IncumbentRegistry::new(true);
        registry.try_record(&[1.0], 10.0);
        let snap = registry.snapshot().unwrap();
        registry.try_record(&[0.0], 1.0);

        // Old snapshot unchanged, new one reflects the update
        assert_eq!(snap.obj_val, 10.0);
        assert_eq!(registry.snapshot().unwrap().obj_val, 1.0);
    }

    #[test]
    fn test_concurrent_records_keep_best() {
        let registry = Arc::new(IncumbentRegistry::new(true));
        let threads = 8;
        let per_thread = 500;

        let handles: Vec<_> = (0..threads)
            .map(|t| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    let mut last_seen = f64::INFINITY;
                    for i in 0..per_thread {
                        // Interleaved values; global minimum is 0
                        let obj = ((i * threads + t) as f64 * 7919.0) % 10_007.0;
                        registry.try_record(&[obj], obj);
                        registry.node_explored();

                        // Monotone from any single observer's point of view
                        let seen = registry.best_value().unwrap();
                        assert!(seen <= last_seen);
                        last_seen = seen;
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let best = registry.snapshot().unwrap();
        assert_eq!(best.obj_val, 0.0);
        assert_eq!(best.x, vec![0.0]);
        assert_eq!(registry.integer_solutions(), (threads * per_thread) as u64);
        assert_eq!(registry.nodes_explored(), (threads * per_thread) as u64);
    }
}

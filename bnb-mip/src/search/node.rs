//! Search node keys.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Direction of the branch that created a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchDirection {
    /// x <= floor(value).
    Down,

    /// x >= ceil(value).
    Up,
}

/// Bound overrides describing one node of the B&B tree.
///
/// Overrides are stored per integer variable, indexed by the variable's
/// position in the model's integer list. `None` means the model's own bound
/// applies. A key is never mutated after construction; children are built
/// with [`NodeKey::create_lower_branch`] and [`NodeKey::create_upper_branch`].
///
/// Equality and hashing cover the overrides only, so two keys describing the
/// same box are interchangeable for deduplication regardless of the path
/// that produced them.
#[derive(Debug, Clone)]
pub struct NodeKey {
    /// Global indices of the integer variables (shared by the whole tree).
    integer_vars: Arc<[usize]>,

    /// Lower bound overrides, one per integer variable.
    lower: Vec<Option<i64>>,

    /// Upper bound overrides, one per integer variable.
    upper: Vec<Option<i64>>,

    /// Objective estimate inherited from the parent's relaxation.
    pub objective: f64,

    /// Depth in the tree (0 for root).
    pub depth: usize,
}

impl NodeKey {
    /// Create the root key: no overrides.
    pub fn root(integer_vars: &[usize], estimate: f64) -> Self {
        let count = integer_vars.len();
        Self {
            integer_vars: Arc::from(integer_vars),
            lower: vec![None; count],
            upper: vec![None; count],
            objective: estimate,
            depth: 0,
        }
    }

    /// Create a "down" child: x <= floor(value) on the integer variable at `position`.
    pub fn create_lower_branch(&self, position: usize, value: f64, parent_objective: f64) -> Self {
        let mut child = self.child(parent_objective);
        child.upper[position] = Some(value.floor() as i64);
        child
    }

    /// Create an "up" child: x >= ceil(value) on the integer variable at `position`.
    pub fn create_upper_branch(&self, position: usize, value: f64, parent_objective: f64) -> Self {
        let mut child = self.child(parent_objective);
        child.lower[position] = Some(value.ceil() as i64);
        child
    }

    fn child(&self, parent_objective: f64) -> Self {
        Self {
            integer_vars: Arc::clone(&self.integer_vars),
            lower: self.lower.clone(),
            upper: self.upper.clone(),
            objective: parent_objective,
            depth: self.depth + 1,
        }
    }

    /// Global indices of the integer variables.
    pub fn integer_vars(&self) -> &[usize] {
        &self.integer_vars
    }

    /// Lower override for the integer variable at `position`.
    pub fn lower_bound(&self, position: usize) -> Option<f64> {
        self.lower[position].map(|b| b as f64)
    }

    /// Upper override for the integer variable at `position`.
    pub fn upper_bound(&self, position: usize) -> Option<f64> {
        self.upper[position].map(|b| b as f64)
    }

    /// Overridden variables as (global index, lower, upper).
    pub fn overrides(&self) -> impl Iterator<Item = (usize, Option<f64>, Option<f64>)> + '_ {
        self.integer_vars
            .iter()
            .enumerate()
            .filter(|(pos, _)| self.lower[*pos].is_some() || self.upper[*pos].is_some())
            .map(|(pos, &var)| (var, self.lower_bound(pos), self.upper_bound(pos)))
    }

    /// Intersect the overrides with full bound vectors.
    ///
    /// Overrides only ever tighten; a looser override leaves the given bound
    /// in place.
    pub fn apply(&self, var_lb: &mut [f64], var_ub: &mut [f64]) {
        for (var, lb, ub) in self.overrides() {
            if let Some(lb) = lb {
                var_lb[var] = var_lb[var].max(lb);
            }
            if let Some(ub) = ub {
                var_ub[var] = var_ub[var].min(ub);
            }
        }
    }
}

impl PartialEq for NodeKey {
    fn eq(&self, other: &Self) -> bool {
        self.lower == other.lower && self.upper == other.upper
    }
}

impl Eq for NodeKey {}

impl Hash for NodeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.lower.hash(state);
        self.upper.hash(state);
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "depth={} est={:.6e} [", self.depth, self.objective)?;
        for (i, (var, lb, ub)) in self.overrides().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match (lb, ub) {
                (Some(lb), Some(ub)) => write!(f, "{} <= x{} <= {}", lb, var, ub)?,
                (Some(lb), None) => write!(f, "x{} >= {}", var, lb)?,
                (None, Some(ub)) => write!(f, "x{} <= {}", var, ub)?,
                (None, None) => {}
            }
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_root_key() {
        let root = NodeKey::root(&[0, 2], f64::NEG_INFINITY);
        assert_eq!(root.depth, 0);
        assert_eq!(root.integer_vars(), &[0, 2]);
        assert_eq!(root.overrides().count(), 0);
    }

    #[test]
    fn test_branches() {
        let root = NodeKey::root(&[0, 2], 0.0);

        // Down branch on x2 with value 2.7: x2 <= 2
        let down = root.create_lower_branch(1, 2.7, 5.0);
        assert_eq!(down.upper_bound(1), Some(2.0));
        assert_eq!(down.lower_bound(1), None);
        assert_eq!(down.lower_bound(0), None);
        assert_eq!(down.upper_bound(0), None);
        assert_eq!(down.objective, 5.0);
        assert_eq!(down.depth, 1);

        // Up branch on x2 with value 2.7: x2 >= 3
        let up = root.create_upper_branch(1, 2.7, 5.0);
        assert_eq!(up.lower_bound(1), Some(3.0));
        assert_eq!(up.upper_bound(1), None);

        // Parent untouched
        assert_eq!(root.overrides().count(), 0);
        assert_eq!(root.objective, 0.0);
    }

    #[test]
    fn test_inherits_other_overrides() {
        let root = NodeKey::root(&[0, 1], 0.0);
        let a = root.create_upper_branch(0, 0.4, 1.0);
        let b = a.create_lower_branch(1, 3.5, 2.0);

        assert_eq!(b.lower_bound(0), Some(1.0));
        assert_eq!(b.upper_bound(1), Some(3.0));
        assert_eq!(b.depth, 2);

        let overrides: Vec<_> = b.overrides().collect();
        assert_eq!(overrides, vec![(0, Some(1.0), None), (1, None, Some(3.0))]);
    }

    #[test]
    fn test_negative_values() {
        let root = NodeKey::root(&[0], 0.0);
        let down = root.create_lower_branch(0, -1.5, 0.0);
        let up = root.create_upper_branch(0, -1.5, 0.0);
        assert_eq!(down.upper_bound(0), Some(-2.0));
        assert_eq!(up.lower_bound(0), Some(-1.0));
    }

    #[test]
    fn test_apply_tightens_only() {
        let root = NodeKey::root(&[1], 0.0);
        let key = root
            .create_upper_branch(0, 0.5, 0.0)
            .create_lower_branch(0, 4.2, 0.0);

        let mut lb = vec![0.0, 2.0];
        let mut ub = vec![10.0, 10.0];
        key.apply(&mut lb, &mut ub);

        // lower override 1 is looser than model bound 2
        assert_eq!(lb, vec![0.0, 2.0]);
        assert_eq!(ub, vec![10.0, 4.0]);
    }

    #[test]
    fn test_crossed_overrides_give_empty_box() {
        let root = NodeKey::root(&[0], 0.0);
        let key = root
            .create_upper_branch(0, 2.5, 0.0)
            .create_lower_branch(0, 1.5, 0.0);

        let mut lb = vec![0.0];
        let mut ub = vec![10.0];
        key.apply(&mut lb, &mut ub);
        assert!(lb[0] > ub[0]);
    }

    #[test]
    fn test_equality_ignores_estimate_and_depth() {
        let root = NodeKey::root(&[0, 1], 0.0);

        // Same box reached along two paths
        let a = root
            .create_lower_branch(0, 0.5, 1.0)
            .create_upper_branch(1, 0.5, 2.0);
        let b = root
            .create_upper_branch(1, 0.3, 7.0)
            .create_lower_branch(0, 0.9, 8.0);
        assert_eq!(a, b);

        let mut set = HashSet::new();
        assert!(set.insert(a));
        assert!(!set.insert(b));
        assert!(set.insert(root.create_lower_branch(0, 0.5, 0.0)));
    }

    #[test]
    fn test_display() {
        let root = NodeKey::root(&[3], 1.0);
        let key = root.create_lower_branch(0, 2.5, 1.0);
        assert_eq!(key.to_string(), "depth=1 est=1.000000e0 [x3 <= 2]");
    }
}

//! Recursive branch-and-bound node task.
//!
//! One task bounds one node. When the node has to be branched the task
//! continues on one child inline and offers the other to idle workers via
//! `rayon::join`, then combines both results. A task returns `Ok(true)` when
//! its subtree was searched exhaustively, `Ok(false)` when part of it was cut
//! short by the budget, and `Err` only when the hard iteration ceiling was
//! passed.

use super::{ExploredSet, IncumbentRegistry, NodeKey, SearchBudget, SearchPolicy};
use crate::error::MipResult;
use crate::model::MipModel;
use crate::relax::Relaxation;
use crate::settings::MipSettings;

/// Terminal state of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// Iteration or time budget reached before solving.
    BudgetExceeded,

    /// Same bound set already explored.
    Duplicate,

    /// Cannot improve on the incumbent.
    Pruned,

    /// Relaxation infeasible or failed; the branch is exhausted.
    InfeasibleOrFailed,

    /// Relaxation result rejected by model validation.
    Invalid,

    /// Relaxation solution is integral; offered to the incumbent registry.
    IntegerFound,

    /// Children created.
    Branched,
}

impl NodeState {
    /// Whether the subtree below this node was searched exhaustively.
    ///
    /// `Branched` depends on the children and is reported by the task itself.
    pub fn is_normal_exit(&self) -> bool {
        !matches!(self, NodeState::BudgetExceeded | NodeState::Invalid)
    }
}

/// State shared by every task of one solve call.
pub(crate) struct SearchContext<'a, M: ?Sized, R: ?Sized> {
    pub model: &'a M,
    pub relaxation: &'a R,
    pub settings: &'a MipSettings,
    pub policy: SearchPolicy,
    pub incumbent: IncumbentRegistry,
    pub budget: SearchBudget,
    pub explored: ExploredSet,
}

impl<'a, M, R> SearchContext<'a, M, R>
where
    M: MipModel + ?Sized,
    R: Relaxation + ?Sized,
{
    pub fn new(model: &'a M, relaxation: &'a R, settings: &'a MipSettings) -> Self {
        let minimise = model.is_minimisation();
        Self {
            model,
            relaxation,
            settings,
            policy: SearchPolicy::new(minimise, settings),
            incumbent: IncumbentRegistry::new(minimise),
            budget: SearchBudget::new(settings),
            explored: ExploredSet::new(settings.dedup_nodes),
        }
    }

    /// Log progress (if verbose).
    fn log_progress(&self, nodes: u64) {
        if !self.settings.verbose || nodes % self.settings.log_freq != 0 {
            return;
        }
        log::info!(
            "Nodes: {} | Iterations: {} | Incumbent: {:.6e} | Solutions: {} | Time: {:.1}s",
            nodes,
            self.budget.iterations(),
            self.incumbent.best_value().unwrap_or(f64::NAN),
            self.incumbent.integer_solutions(),
            self.budget.elapsed_ms() as f64 / 1000.0,
        );
    }
}

/// What bounding a node decided.
enum Step {
    /// Node finished in a terminal state.
    Done(NodeState),

    /// Node must be branched: (continued, forked).
    Branch(NodeKey, NodeKey),
}

/// The unit of work: bound one node and recurse into its children.
pub(crate) struct NodeTask<'c, 'a, M: ?Sized, R: ?Sized> {
    ctx: &'c SearchContext<'a, M, R>,
    key: NodeKey,
}

impl<'c, 'a, M, R> NodeTask<'c, 'a, M, R>
where
    M: MipModel + ?Sized,
    R: Relaxation + ?Sized,
{
    pub fn new(ctx: &'c SearchContext<'a, M, R>, key: NodeKey) -> Self {
        Self { ctx, key }
    }

    /// Search the subtree rooted at this node.
    pub fn compute(self) -> MipResult<bool> {
        let ctx = self.ctx;
        match self.bound()? {
            Step::Done(state) => Ok(state.is_normal_exit()),
            Step::Branch(continued, forked) => {
                let (continued, forked) = rayon::join(
                    || NodeTask::new(ctx, continued).compute(),
                    || NodeTask::new(ctx, forked).compute(),
                );
                let continued = continued?;
                let forked = forked?;
                Ok(continued && forked)
            }
        }
    }

    fn trace(&self, state: NodeState) -> Step {
        if self.ctx.settings.trace {
            log::trace!("Node {} -> {:?}", self.key, state);
        }
        Step::Done(state)
    }

    /// Run the node state machine up to a terminal state or a branch.
    fn bound(&self) -> MipResult<Step> {
        let ctx = self.ctx;

        if !ctx.budget.is_iteration_allowed() {
            return Ok(self.trace(NodeState::BudgetExceeded));
        }

        if !ctx.explored.mark(&self.key) {
            return Ok(self.trace(NodeState::Duplicate));
        }

        let incumbent = ctx.incumbent.best_value();
        if !ctx.policy.is_good_enough(self.key.objective, incumbent) {
            return Ok(self.trace(NodeState::Pruned));
        }

        let limit = ctx.policy.objective_limit(incumbent);
        let result = ctx.relaxation.solve_relaxation(&self.key, limit);
        ctx.log_progress(ctx.incumbent.node_explored());

        if !result.state.is_feasible() {
            return Ok(self.trace(NodeState::InfeasibleOrFailed));
        }

        ctx.budget.increment()?;

        if result.x.len() != ctx.model.num_vars()
            || result.x.iter().any(|v| !v.is_finite())
            || (ctx.settings.validate && !ctx.model.validate(&result.x))
        {
            // This should not be possible; the relaxation solver is broken.
            log::error!(
                "Node relaxation reported {:?} but the solution is invalid, abandoning branch {}",
                result.state,
                self.key
            );
            return Ok(self.trace(NodeState::Invalid));
        }

        let objective = ctx.model.objective(&result.x);

        let candidate = match ctx.policy.select_branch(&result.x, &self.key) {
            Some(candidate) => candidate,
            None => {
                if ctx.incumbent.try_record(&result.x, objective) && ctx.settings.verbose {
                    log::info!("New incumbent: obj={:.6e} at depth {}", objective, self.key.depth);
                }
                return Ok(self.trace(NodeState::IntegerFound));
            }
        };

        if !ctx.policy.is_good_enough(objective, ctx.incumbent.best_value()) {
            return Ok(self.trace(NodeState::Pruned));
        }

        let split = ctx.policy.split(&self.key, candidate, objective);
        if ctx.settings.trace {
            log::trace!(
                "Node {} -> {:?} on x{} = {} (continue {:?})",
                self.key,
                NodeState::Branched,
                candidate.var,
                candidate.value,
                split.direction
            );
        }
        Ok(Step::Branch(split.continued, split.forked))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LinearModel;
    use crate::relax::{KnapsackRelaxation, ObjectiveLimit, RelaxationResult};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn bounded_int(lb: f64, ub: f64, cost: f64) -> LinearModel {
        LinearModel::minimize(vec![cost])
            .with_bounds(0, lb, ub)
            .and_then(|m| m.integer(0))
            .unwrap()
    }

    fn bound_root<M, R>(ctx: &SearchContext<'_, M, R>) -> Step
    where
        M: MipModel + ?Sized,
        R: Relaxation + ?Sized,
    {
        let root = NodeKey::root(ctx.model.integer_vars(), f64::NEG_INFINITY);
        NodeTask::new(ctx, root).bound().unwrap()
    }

    fn state(step: Step) -> Option<NodeState> {
        match step {
            Step::Done(state) => Some(state),
            Step::Branch(..) => None,
        }
    }

    #[test]
    fn test_integral_root() {
        let model = bounded_int(0.0, 5.0, 1.0);
        let relax = KnapsackRelaxation::new(&model).unwrap();
        let settings = MipSettings::default();
        let ctx = SearchContext::new(&model, &relax, &settings);

        assert_eq!(state(bound_root(&ctx)), Some(NodeState::IntegerFound));
        assert_eq!(ctx.incumbent.best_value(), Some(0.0));
        assert_eq!(ctx.budget.iterations(), 1);
        assert_eq!(ctx.incumbent.nodes_explored(), 1);
    }

    #[test]
    fn test_budget_exceeded_skips_solve() {
        let calls = AtomicUsize::new(0);
        let relax = |_: &NodeKey, _: Option<ObjectiveLimit>| {
            calls.fetch_add(1, Ordering::SeqCst);
            RelaxationResult::optimal(vec![0.0], 0.0)
        };
        let model = bounded_int(0.0, 5.0, 1.0);
        let settings = MipSettings::default().with_max_iterations(0);
        let ctx = SearchContext::new(&model, &relax, &settings);

        assert_eq!(state(bound_root(&ctx)), Some(NodeState::BudgetExceeded));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!ctx.incumbent.has_solution());
    }

    #[test]
    fn test_infeasible_relaxation() {
        let relax = |_: &NodeKey, _: Option<ObjectiveLimit>| RelaxationResult::infeasible();
        let model = bounded_int(0.0, 5.0, 1.0);
        let settings = MipSettings::default();
        let ctx = SearchContext::new(&model, &relax, &settings);

        assert_eq!(state(bound_root(&ctx)), Some(NodeState::InfeasibleOrFailed));
        // Only successful solves count as iterations
        assert_eq!(ctx.budget.iterations(), 0);
    }

    #[test]
    fn test_pre_bound_prune() {
        let model = bounded_int(0.0, 5.0, 1.0);
        let relax = KnapsackRelaxation::new(&model).unwrap();
        let settings = MipSettings::default().with_gap_tol(0.0);
        let ctx = SearchContext::new(&model, &relax, &settings);
        ctx.incumbent.try_record(&[0.0], 0.0);

        // Estimate equal to the incumbent cannot improve on it
        let key = NodeKey::root(model.integer_vars(), 0.0);
        let step = NodeTask::new(&ctx, key).bound().unwrap();
        assert_eq!(state(step), Some(NodeState::Pruned));
        assert_eq!(ctx.incumbent.nodes_explored(), 0);
    }

    #[test]
    fn test_branches_on_fractional() {
        let relax = |_: &NodeKey, _: Option<ObjectiveLimit>| {
            RelaxationResult::optimal(vec![2.7], 2.7)
        };
        let model = bounded_int(0.0, 5.0, 1.0);
        let settings = MipSettings::default();
        let ctx = SearchContext::new(&model, &relax, &settings);

        match bound_root(&ctx) {
            Step::Branch(continued, forked) => {
                assert_eq!(continued.lower_bound(0), Some(3.0));
                assert_eq!(forked.upper_bound(0), Some(2.0));
                assert_eq!(continued.objective, 2.7);
            }
            Step::Done(state) => panic!("expected branch, got {:?}", state),
        }
    }

    #[test]
    fn test_post_solve_prune() {
        let relax = |_: &NodeKey, _: Option<ObjectiveLimit>| {
            RelaxationResult::optimal(vec![2.5], 2.5)
        };
        let model = bounded_int(0.0, 5.0, 1.0);
        let settings = MipSettings::default().with_gap_tol(0.0);
        let ctx = SearchContext::new(&model, &relax, &settings);
        ctx.incumbent.try_record(&[2.0], 2.0);

        assert_eq!(state(bound_root(&ctx)), Some(NodeState::Pruned));
        assert_eq!(ctx.incumbent.nodes_explored(), 1);
    }

    #[test]
    fn test_duplicate_node() {
        let model = bounded_int(0.0, 5.0, 1.0);
        let relax = KnapsackRelaxation::new(&model).unwrap();
        let settings = MipSettings::default().with_dedup(true);
        let ctx = SearchContext::new(&model, &relax, &settings);

        assert_eq!(state(bound_root(&ctx)), Some(NodeState::IntegerFound));
        assert_eq!(state(bound_root(&ctx)), Some(NodeState::Duplicate));
        assert_eq!(ctx.incumbent.nodes_explored(), 1);
    }

    #[test]
    fn test_invalid_solution_abandons_branch() {
        // Claims optimal at a point outside the bounds
        let relax = |_: &NodeKey, _: Option<ObjectiveLimit>| {
            RelaxationResult::optimal(vec![9.0], 9.0)
        };
        let model = bounded_int(0.0, 5.0, 1.0);
        let settings = MipSettings::default().with_validation(true);
        let ctx = SearchContext::new(&model, &relax, &settings);

        assert_eq!(state(bound_root(&ctx)), Some(NodeState::Invalid));
        assert!(!ctx.incumbent.has_solution());

        let root = NodeKey::root(model.integer_vars(), f64::NEG_INFINITY);
        assert!(!NodeTask::new(&ctx, root).compute().unwrap());
    }

    #[test]
    fn test_wrong_length_is_invalid() {
        let relax = |_: &NodeKey, _: Option<ObjectiveLimit>| {
            RelaxationResult::optimal(vec![], 0.0)
        };
        let model = bounded_int(0.0, 5.0, 1.0);
        let settings = MipSettings::default();
        let ctx = SearchContext::new(&model, &relax, &settings);

        assert_eq!(state(bound_root(&ctx)), Some(NodeState::Invalid));
    }

    #[test]
    fn test_non_finite_point_is_invalid() {
        for bad in [f64::NAN, f64::INFINITY] {
            let relax = move |_: &NodeKey, _: Option<ObjectiveLimit>| {
                RelaxationResult::optimal(vec![bad], 0.0)
            };
            let model = bounded_int(0.0, 5.0, 1.0);
            let settings = MipSettings::default();
            let ctx = SearchContext::new(&model, &relax, &settings);

            assert_eq!(state(bound_root(&ctx)), Some(NodeState::Invalid));
            assert_eq!(ctx.incumbent.integer_solutions(), 0);

            let root = NodeKey::root(model.integer_vars(), f64::NEG_INFINITY);
            assert!(!NodeTask::new(&ctx, root).compute().unwrap());
        }
    }

    #[test]
    fn test_hard_abort_is_error() {
        let relax = |_: &NodeKey, _: Option<ObjectiveLimit>| {
            RelaxationResult::optimal(vec![0.0], 0.0)
        };
        let model = bounded_int(0.0, 5.0, 1.0);
        let settings = MipSettings::default().with_iterations_abort(0);
        let ctx = SearchContext::new(&model, &relax, &settings);

        let root = NodeKey::root(model.integer_vars(), f64::NEG_INFINITY);
        assert!(NodeTask::new(&ctx, root).compute().is_err());
        assert!(ctx.budget.is_aborted());
    }

    #[test]
    fn test_state_exit_flags() {
        assert!(NodeState::Pruned.is_normal_exit());
        assert!(NodeState::Duplicate.is_normal_exit());
        assert!(NodeState::InfeasibleOrFailed.is_normal_exit());
        assert!(NodeState::IntegerFound.is_normal_exit());
        assert!(!NodeState::BudgetExceeded.is_normal_exit());
        assert!(!NodeState::Invalid.is_normal_exit());
    }
}

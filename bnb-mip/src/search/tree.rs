//! Branch-and-bound search driver.

use rayon::ThreadPoolBuilder;

use super::task::{NodeTask, SearchContext};
use super::NodeKey;
use crate::error::{MipError, MipResult};
use crate::model::{MipModel, MipSolution, MipStatus};
use crate::relax::Relaxation;
use crate::settings::MipSettings;

/// Stack size for worker threads; recursion depth grows with the tree depth.
const WORKER_STACK_SIZE: usize = 16 * 1024 * 1024;

/// Branch-and-bound driver.
///
/// Seeds the incumbent, runs the root task on a work-stealing pool and
/// turns the outcome into a [`MipSolution`].
pub struct BranchAndBound<'a, M: ?Sized, R: ?Sized> {
    /// Model being solved.
    model: &'a M,

    /// Relaxation solver.
    relaxation: &'a R,

    /// Settings.
    settings: MipSettings,
}

impl<'a, M, R> BranchAndBound<'a, M, R>
where
    M: MipModel + ?Sized,
    R: Relaxation + ?Sized,
{
    /// Create a new driver.
    pub fn new(model: &'a M, relaxation: &'a R, settings: MipSettings) -> Self {
        Self {
            model,
            relaxation,
            settings,
        }
    }

    /// Settings used by this driver.
    pub fn settings(&self) -> &MipSettings {
        &self.settings
    }

    /// Run the search.
    ///
    /// `warm_start` seeds the incumbent when it is integer-feasible and
    /// passes model validation. Search outcomes, including budget exhaustion
    /// and the hard iteration abort, are reported through the solution
    /// status; `Err` is returned only for invalid settings or when the worker
    /// pool cannot be created.
    pub fn solve(&self, warm_start: Option<&[f64]>) -> MipResult<MipSolution> {
        self.settings.validate()?;

        let ctx = SearchContext::new(self.model, self.relaxation, &self.settings);

        if let Some(x) = warm_start {
            self.seed(&ctx, x);
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(self.settings.threads)
            .thread_name(|i| format!("bnb-worker-{}", i))
            .stack_size(WORKER_STACK_SIZE)
            .build()?;

        let root_estimate = if self.model.is_minimisation() {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
        let root = NodeKey::root(self.model.integer_vars(), root_estimate);

        if self.settings.verbose {
            log::info!(
                "Branch-and-bound: {} variables, {} integer, {} threads",
                self.model.num_vars(),
                self.model.integer_vars().len(),
                pool.current_num_threads()
            );
        }

        let normal_exit = match pool.install(|| NodeTask::new(&ctx, root).compute()) {
            Ok(normal_exit) => normal_exit,
            Err(err @ MipError::IterationAbort { .. }) => {
                log::warn!("Search aborted: {}", err);
                false
            }
            Err(err) => return Err(err),
        };

        Ok(self.finalize(&ctx, normal_exit))
    }

    /// Offer a user-supplied solution to the incumbent registry.
    fn seed(&self, ctx: &SearchContext<'_, M, R>, x: &[f64]) {
        let valid = x.len() == self.model.num_vars()
            && self.model.validate(x)
            && ctx.policy.is_integer_feasible(x, self.model.integer_vars());

        if !valid {
            log::warn!("Ignoring warm start: not an integer-feasible solution of the model");
            return;
        }

        let obj = self.model.objective(x);
        ctx.incumbent.try_record(x, obj);
        if self.settings.verbose {
            log::info!("Warm start accepted: obj={:.6e}", obj);
        }
    }

    /// Finalize the solve and return the solution.
    fn finalize(&self, ctx: &SearchContext<'_, M, R>, normal_exit: bool) -> MipSolution {
        let best = ctx.incumbent.snapshot();
        let status = MipStatus::from_outcome(best.is_some(), normal_exit);

        let (x, obj_val) = match best {
            Some(inc) => (inc.x.clone(), inc.obj_val),
            None => (Vec::new(), f64::NAN),
        };

        let solution = MipSolution {
            status,
            x,
            obj_val,
            nodes_explored: ctx.incumbent.nodes_explored(),
            integer_solutions: ctx.incumbent.integer_solutions(),
            incumbent_updates: ctx.incumbent.incumbent_updates(),
            iterations: ctx.budget.iterations(),
            solve_time_ms: ctx.budget.elapsed_ms(),
        };

        if self.settings.verbose {
            log::info!(
                "Finished: {:?} | Obj: {:.6e} | Nodes: {} | Solutions: {} | Time: {:.3}s",
                solution.status,
                solution.obj_val,
                solution.nodes_explored,
                solution.integer_solutions,
                solution.solve_time_ms as f64 / 1000.0,
            );
        }

        solution
    }
}

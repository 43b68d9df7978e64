//! Parallel branch-and-bound for mixed-integer programs.
//!
//! The search explores a tree of bound overrides. Every node solves a
//! continuous relaxation through a [`Relaxation`], branches on the first
//! fractional integer variable, keeps the child closer to the fractional
//! value on the current worker and offers the other child to idle workers
//! of a work-stealing pool. A single [`IncumbentRegistry`] holds the best
//! integer solution and drives pruning for every worker.
//!
//! ```
//! use bnb_mip::{solve_mip, KnapsackRelaxation, LinearModel, MipSettings, MipStatus};
//!
//! // max 3x0 + 2x1 + 4x2  s.t.  2x0 + x1 + 3x2 <= 4, x binary
//! let model = (0..3)
//!     .try_fold(LinearModel::maximize(vec![3.0, 2.0, 4.0]), |m, j| m.binary(j))
//!     .and_then(|m| m.with_constraint(vec![2.0, 1.0, 3.0], 4.0))
//!     .unwrap();
//! let relaxation = KnapsackRelaxation::new(&model).unwrap();
//!
//! let sol = solve_mip(&model, &relaxation, &MipSettings::default()).unwrap();
//! assert_eq!(sol.status, MipStatus::Optimal);
//! assert_eq!(sol.obj_val, 6.0);
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod model;
pub mod relax;
pub mod search;
pub mod settings;

pub use error::{MipError, MipResult};
pub use model::{LinearConstraint, LinearModel, MipModel, MipSolution, MipStatus, Sense};
pub use relax::{KnapsackRelaxation, ObjectiveLimit, Relaxation, RelaxationResult, RelaxationState};
pub use search::{BranchAndBound, IncumbentRegistry, NodeKey, NodeState, SearchPolicy};
pub use settings::MipSettings;

/// Solve a MIP from scratch.
pub fn solve_mip<M, R>(model: &M, relaxation: &R, settings: &MipSettings) -> MipResult<MipSolution>
where
    M: MipModel + ?Sized,
    R: Relaxation + ?Sized,
{
    BranchAndBound::new(model, relaxation, settings.clone()).solve(None)
}

/// Solve a MIP starting from a known integer solution.
pub fn solve_mip_with_start<M, R>(
    model: &M,
    relaxation: &R,
    settings: &MipSettings,
    warm_start: &[f64],
) -> MipResult<MipSolution>
where
    M: MipModel + ?Sized,
    R: Relaxation + ?Sized,
{
    BranchAndBound::new(model, relaxation, settings.clone()).solve(Some(warm_start))
}

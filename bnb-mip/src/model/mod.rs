//! Problem and solution types for the MIP solver.

mod problem;
mod solution;

pub use problem::{LinearConstraint, LinearModel, MipModel, Sense};
pub use solution::{MipSolution, MipStatus};

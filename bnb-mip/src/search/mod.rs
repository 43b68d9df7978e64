//! Branch-and-bound search.

mod budget;
mod explored;
mod incumbent;
mod node;
mod policy;
mod task;
mod tree;

pub use budget::SearchBudget;
pub use explored::ExploredSet;
pub use incumbent::{Incumbent, IncumbentRegistry};
pub use node::{BranchDirection, NodeKey};
pub use policy::{fractionality, BranchCandidate, BranchSplit, SearchPolicy};
pub use task::NodeState;
pub use tree::BranchAndBound;

pub mod byteprop;
pub mod interface;

pub use byteprop::BytePropSolver;
pub use interface::{Assignment, SolverError, SolverImpl, SolverRunStatus, Validity};

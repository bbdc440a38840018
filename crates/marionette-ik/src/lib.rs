pub mod chain;
pub mod constraint;
pub mod solver;

pub use chain::*;
pub use constraint::*;
pub use solver::*;

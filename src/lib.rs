pub mod error;
pub mod global_variables;
pub mod grid;
pub mod io;
pub mod post;
pub mod runner;
pub mod solver;

pub use error::{FlowError, Result};
pub use global_variables::*;
pub use grid::GridState;
pub use runner::{SimulationRunner, StepObserver};
pub use solver::{CorrectionMode, FieldSnapshot, FlowSolver, SolverParameters};

#[derive(Clone, Debug, PartialEq)]
pub struct Residuals {
    pub velocity: [Float; 2],
    pub pressure: Float,
}

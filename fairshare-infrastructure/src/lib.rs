#![warn(clippy::uninlined_format_args)]

pub mod config;
pub mod optimizer;
pub mod parser;

pub use config::{SolverConfigError, SolverSettings};
pub use optimizer::MaxMinAllocationSolver;
pub use parser::JsonRequestParser;

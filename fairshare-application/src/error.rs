use fairshare_domain::{ExtractionError, ValuationTableError};
use std::fmt;
use thiserror::Error;

/// Failure reported by an [`AllocationSolver`](crate::ports::AllocationSolver).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    #[error("model has no feasible assignment")]
    Infeasible,
    #[error("time budget exhausted before a feasible assignment was found")]
    TimedOut,
    #[error("solver rejected its configuration: {0}")]
    InvalidConfiguration(String),
    #[error("solver failed: {0}")]
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoSolutionReason {
    Infeasible,
    TimedOut,
    SolverFailure,
}

impl fmt::Display for NoSolutionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Infeasible => f.write_str("infeasible"),
            Self::TimedOut => f.write_str("timed out"),
            Self::SolverFailure => f.write_str("solver failure"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocationError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValuationTableError),
    #[error("no solution found ({reason})")]
    NoSolution { reason: NoSolutionReason },
    #[error("invalid solver configuration: {0}")]
    InvalidSolverConfiguration(String),
    #[error("solver returned an inconsistent assignment: {0}")]
    InconsistentAssignment(#[from] ExtractionError),
}

impl AllocationError {
    /// True for failures the caller can only report as "no solution found".
    pub fn is_no_solution(&self) -> bool {
        matches!(self, Self::NoSolution { .. })
    }
}

impl From<SolverError> for AllocationError {
    fn from(err: SolverError) -> Self {
        match err {
            SolverError::Infeasible => AllocationError::NoSolution {
                reason: NoSolutionReason::Infeasible,
            },
            SolverError::TimedOut => AllocationError::NoSolution {
                reason: NoSolutionReason::TimedOut,
            },
            SolverError::Failed(_) => AllocationError::NoSolution {
                reason: NoSolutionReason::SolverFailure,
            },
            SolverError::InvalidConfiguration(detail) => {
                AllocationError::InvalidSolverConfiguration(detail)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestParseError {
    #[error("request is not valid JSON (line {line}, column {column}): {detail}")]
    Syntax {
        line: usize,
        column: usize,
        detail: String,
    },
    #[error("request does not match the expected shape (line {line}, column {column}): {detail}")]
    Shape {
        line: usize,
        column: usize,
        detail: String,
    },
    #[error("request is empty")]
    Empty,
}

use fairshare_application::{AllocationSolver, SolverError};
use fairshare_division::{
    DivisionError, DivisionOptions, DivisionProblem, DivisionSolution, SolveStatus,
    allocate_max_min,
};
use fairshare_domain::{ShareAssignment, SolveQuality, ValuationTable};
use rust_decimal::{Decimal, prelude::ToPrimitive};

/// [`AllocationSolver`] backed by the HiGHS max-min program.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxMinAllocationSolver {
    options: DivisionOptions,
}

impl MaxMinAllocationSolver {
    pub fn new(options: DivisionOptions) -> Self {
        Self { options }
    }
}

fn map_division_error(err: DivisionError) -> SolverError {
    match err {
        DivisionError::Infeasible => SolverError::Infeasible,
        DivisionError::TimedOut => SolverError::TimedOut,
        DivisionError::InvalidScale { .. } => SolverError::InvalidConfiguration(err.to_string()),
        DivisionError::NoAgents
        | DivisionError::NoItems
        | DivisionError::RowCountMismatch { .. }
        | DivisionError::RaggedMatrix { .. }
        | DivisionError::InvalidValuation { .. }
        | DivisionError::ModelTooLarge { .. }
        | DivisionError::SolverFailure(_)
        | DivisionError::InconsistentSolution => SolverError::Failed(err.to_string()),
    }
}

fn to_solver_matrix(matrix: Vec<Vec<Decimal>>) -> Vec<Vec<f64>> {
    matrix
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|value| value.to_f64().unwrap_or(f64::NAN))
                .collect()
        })
        .collect()
}

fn to_share_assignment(solution: DivisionSolution) -> ShareAssignment {
    ShareAssignment {
        scale: solution.scale,
        indivisible_owners: solution.indivisible_owners,
        divisible_units: solution.divisible_units,
        quality: match solution.status {
            SolveStatus::Optimal => SolveQuality::Optimal,
            SolveStatus::Feasible => SolveQuality::Feasible,
        },
    }
}

impl AllocationSolver for MaxMinAllocationSolver {
    fn solve(&self, table: &ValuationTable) -> Result<ShareAssignment, SolverError> {
        let problem = DivisionProblem::new(
            to_solver_matrix(table.indivisible_matrix()),
            to_solver_matrix(table.divisible_matrix()),
        );

        allocate_max_min(&problem, self.options)
            .map(to_share_assignment)
            .map_err(map_division_error)
    }
}

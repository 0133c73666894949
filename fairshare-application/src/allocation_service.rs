use crate::{
    error::{AllocationError, SolverError},
    model::AllocationRequest,
    ports::AllocationSolver,
};
use fairshare_domain::{
    Allocation, AllocationExtractor, FairnessReport, FairnessReporter, SolveQuality,
};

#[derive(Debug, Clone, PartialEq)]
pub struct AllocationOutcome {
    pub allocation: Allocation,
    pub report: FairnessReport,
    pub quality: SolveQuality,
}

/// Runs one request through validation, a single solve, extraction and reporting.
#[derive(Clone, Copy)]
pub struct AllocationService<'a> {
    solver: &'a dyn AllocationSolver,
}

impl<'a> AllocationService<'a> {
    pub fn new(solver: &'a dyn AllocationSolver) -> Self {
        Self { solver }
    }

    pub fn allocate(
        &self,
        request: &AllocationRequest,
    ) -> Result<AllocationOutcome, AllocationError> {
        let table = request.to_valuation_table().inspect_err(|err| {
            tracing::warn!(error = %err, "Rejected allocation request");
        })?;

        tracing::debug!(
            agent_count = table.agents().len(),
            item_count = table.items().len(),
            indivisible_count = table.indivisible_items().len(),
            "Allocating items"
        );

        let assignment = self
            .solver
            .solve(&table)
            .inspect_err(log_solver_failure)?;

        let allocation = AllocationExtractor.extract(&table, &assignment)?;
        let report = FairnessReporter.report(&table, &allocation);

        tracing::info!(
            worst_satisfaction = %report.worst_satisfaction,
            quality = %assignment.quality,
            "Allocation complete"
        );

        Ok(AllocationOutcome {
            allocation,
            report,
            quality: assignment.quality,
        })
    }
}

fn log_solver_failure(err: &SolverError) {
    match err {
        SolverError::Infeasible => {
            tracing::error!("Solver reported an infeasible model for well-formed input");
        }
        SolverError::TimedOut => {
            tracing::warn!("Solver exhausted its time budget without a feasible assignment");
        }
        SolverError::InvalidConfiguration(detail) | SolverError::Failed(detail) => {
            tracing::error!(%detail, "Solver failed");
        }
    }
}

use fairshare_application::{AllocationError, RequestParseError};
use fairshare_i18n as i18n;

/// User-facing message for a failed allocation.
///
/// Infeasible and timed-out solves read the same; the distinction is only logged.
pub fn format_allocation_error(error: &AllocationError) -> String {
    match error {
        AllocationError::InvalidInput(err) => i18n::invalid_input(err),
        AllocationError::NoSolution { .. } => i18n::NO_SOLUTION_FOUND.to_owned(),
        AllocationError::InvalidSolverConfiguration(detail) => {
            format!("{}: {detail}", i18n::INVALID_SOLVER_CONFIGURATION)
        }
        AllocationError::InconsistentAssignment(_) => i18n::INCONSISTENT_ASSIGNMENT.to_owned(),
    }
}

pub fn format_request_error(error: &RequestParseError) -> String {
    i18n::invalid_request(error)
}

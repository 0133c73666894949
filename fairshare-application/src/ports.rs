use crate::{
    error::{RequestParseError, SolverError},
    model::AllocationRequest,
};
use fairshare_domain::{ShareAssignment, ValuationTable};

pub trait RequestParser: Send + Sync {
    fn parse(&self, content: &str) -> Result<AllocationRequest, RequestParseError>;
}

pub trait AllocationSolver: Send + Sync {
    /// Solves the max-min program for `table` once, without retrying.
    fn solve(&self, table: &ValuationTable) -> Result<ShareAssignment, SolverError>;
}

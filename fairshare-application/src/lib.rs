#![warn(clippy::uninlined_format_args)]

pub mod allocation_service;
pub mod error;
pub mod model;
pub mod ports;

pub use allocation_service::{AllocationOutcome, AllocationService};
pub use error::{AllocationError, NoSolutionReason, RequestParseError, SolverError};
pub use model::{
    AgentAllocationView, AgentSpec, AllocationRequest, AllocationResponse, ItemSpec,
    ValuationSpec,
};
pub use ports::{AllocationSolver, RequestParser};

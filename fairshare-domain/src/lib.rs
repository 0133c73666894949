#![warn(clippy::uninlined_format_args)]

pub mod model;
pub mod services;

pub use model::{
    AgentAllocation, AgentName, AgentSatisfaction, Allocation, Divisibility, DivisibleShare,
    FairnessReport, Item, ItemName, ShareAssignment, SolveQuality, Valuation, ValuationTable,
    ValuationTableError,
};
pub use services::{AllocationExtractor, ExtractionError, FairnessReporter, SatisfactionCalculator};

pub mod allocation_extractor;
pub mod fairness_reporter;
pub mod satisfaction_calculator;

pub use allocation_extractor::{AllocationExtractor, ExtractionError};
pub use fairness_reporter::FairnessReporter;
pub use satisfaction_calculator::SatisfactionCalculator;

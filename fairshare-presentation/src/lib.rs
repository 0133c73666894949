#![warn(clippy::uninlined_format_args)]

pub mod allocation_presenter;
pub mod csv_export;
pub mod error_presenter;
pub mod text_table;

pub use allocation_presenter::AllocationPresenter;
pub use error_presenter::{format_allocation_error, format_request_error};

use fairshare_infrastructure::{MaxMinAllocationSolver, SolverConfigError, SolverSettings};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "info";

/// Application configuration and solver wiring
pub struct AppConfig {
    pub solver: SolverSettings,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, SolverConfigError> {
        Ok(Self {
            solver: SolverSettings::from_env()?,
        })
    }

    pub fn build_solver(&self) -> MaxMinAllocationSolver {
        MaxMinAllocationSolver::new(self.solver.division_options())
    }
}

/// Logs go to stderr so that stdout carries only the rendered result.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

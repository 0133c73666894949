use fairshare_division::{DEFAULT_SCALE, DEFAULT_TIME_LIMIT, DivisionOptions, MAX_SCALE, TieBreak};
use std::{env, time::Duration};
use thiserror::Error;

pub const SCALE_VAR: &str = "FAIRSHARE_SCALE";
pub const TIME_LIMIT_VAR: &str = "FAIRSHARE_TIME_LIMIT_SECS";
pub const TIE_BREAK_VAR: &str = "FAIRSHARE_TIE_BREAK";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverConfigError {
    #[error("{var} must be an integer between 1 and {max} (found '{value}')", max = MAX_SCALE)]
    InvalidScale { var: &'static str, value: String },
    #[error("{var} must be a positive number of seconds (found '{value}')")]
    InvalidTimeLimit { var: &'static str, value: String },
    #[error("{var} must be one of none, welfare, fewest-splits (found '{value}')")]
    InvalidTieBreak { var: &'static str, value: String },
}

/// Solver tuning read from the environment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverSettings {
    pub scale: u32,
    pub time_limit: Duration,
    pub tie_break: TieBreak,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            time_limit: DEFAULT_TIME_LIMIT,
            tie_break: TieBreak::None,
        }
    }
}

impl SolverSettings {
    /// Loads `.env` if present, then reads the `FAIRSHARE_*` variables.
    pub fn from_env() -> Result<Self, SolverConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Unset or blank variables keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SolverConfigError> {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut settings = Self::default();

        if let Some(value) = read(SCALE_VAR) {
            settings.scale = parse_scale(&value)?;
        }
        if let Some(value) = read(TIME_LIMIT_VAR) {
            settings.time_limit = parse_time_limit(&value)?;
        }
        if let Some(value) = read(TIE_BREAK_VAR) {
            settings.tie_break = parse_tie_break(&value)?;
        }

        tracing::debug!(
            scale = settings.scale,
            time_limit_secs = settings.time_limit.as_secs_f64(),
            tie_break = ?settings.tie_break,
            "Loaded solver settings"
        );
        Ok(settings)
    }

    pub fn division_options(&self) -> DivisionOptions {
        DivisionOptions::default()
            .with_scale(self.scale)
            .with_time_limit(Some(self.time_limit))
            .with_tie_break(self.tie_break)
    }
}

fn parse_scale(value: &str) -> Result<u32, SolverConfigError> {
    value
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|scale| (1..=MAX_SCALE).contains(scale))
        .ok_or_else(|| SolverConfigError::InvalidScale {
            var: SCALE_VAR,
            value: value.to_owned(),
        })
}

fn parse_time_limit(value: &str) -> Result<Duration, SolverConfigError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|secs| *secs > 0.0)
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .ok_or_else(|| SolverConfigError::InvalidTimeLimit {
            var: TIME_LIMIT_VAR,
            value: value.to_owned(),
        })
}

fn parse_tie_break(value: &str) -> Result<TieBreak, SolverConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "none" => Ok(TieBreak::None),
        "welfare" | "total-welfare" => Ok(TieBreak::TotalWelfare),
        "fewest-splits" | "splits" => Ok(TieBreak::FewestSplits),
        _ => Err(SolverConfigError::InvalidTieBreak {
            var: TIE_BREAK_VAR,
            value: value.to_owned(),
        }),
    }
}

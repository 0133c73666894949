use std::time::Duration;

/// Valuation matrices handed to the solver, partitioned by item divisibility.
///
/// Rows are agents, columns are items of the respective class. Both matrices
/// must have exactly `agent_count` rows; a class with no items is represented
/// by rows of length zero.
#[derive(Debug, Clone, PartialEq)]
pub struct DivisionProblem {
    pub agent_count: usize,
    pub indivisible: Vec<Vec<f64>>,
    pub divisible: Vec<Vec<f64>>,
}

impl DivisionProblem {
    pub fn new(indivisible: Vec<Vec<f64>>, divisible: Vec<Vec<f64>>) -> Self {
        let agent_count = indivisible.len().max(divisible.len());
        let indivisible = if indivisible.is_empty() {
            vec![Vec::new(); agent_count]
        } else {
            indivisible
        };
        let divisible = if divisible.is_empty() {
            vec![Vec::new(); agent_count]
        } else {
            divisible
        };
        Self {
            agent_count,
            indivisible,
            divisible,
        }
    }

    pub fn indivisible_count(&self) -> usize {
        self.indivisible.first().map_or(0, Vec::len)
    }

    pub fn divisible_count(&self) -> usize {
        self.divisible.first().map_or(0, Vec::len)
    }
}

/// Secondary criterion applied among allocations that share the optimal worst-off value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TieBreak {
    /// Keep whichever max-min optimum the solver reports first.
    #[default]
    None,
    /// Maximize the sum of all agents' satisfaction.
    TotalWelfare,
    /// Minimize the number of divisible items shared by more than one agent.
    FewestSplits,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DivisionOptions {
    /// Divisible shares are integers in units of `1 / scale`.
    pub scale: u32,
    /// Wall-clock budget shared by every solve stage.
    pub time_limit: Option<Duration>,
    pub tie_break: TieBreak,
}

pub const DEFAULT_SCALE: u32 = 100;
pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(30);

impl Default for DivisionOptions {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            time_limit: Some(DEFAULT_TIME_LIMIT),
            tie_break: TieBreak::None,
        }
    }
}

impl DivisionOptions {
    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_time_limit(mut self, time_limit: Option<Duration>) -> Self {
        self.time_limit = time_limit;
        self
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }
}

/// Whether the solver proved the reported worst-off value optimal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    Optimal,
    /// The time limit was reached; the assignment is valid but not certified optimal.
    Feasible,
}

/// Integer assignment recovered from the solver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DivisionSolution {
    pub scale: u32,
    /// Owning agent index for each indivisible item.
    pub indivisible_owners: Vec<usize>,
    /// `divisible_units[agent][item]` in units of `1 / scale`.
    pub divisible_units: Vec<Vec<u32>>,
    pub status: SolveStatus,
}

#![warn(clippy::uninlined_format_args)]

mod model;

use std::time::{Duration, Instant};

use good_lp::{
    Expression, ResolutionError, Solution, SolutionStatus, SolverModel, Variable,
    solvers::highs::highs, variable, variables,
};
use thiserror::Error;

pub use model::{
    DEFAULT_SCALE, DEFAULT_TIME_LIMIT, DivisionOptions, DivisionProblem, DivisionSolution,
    SolveStatus, TieBreak,
};

#[derive(Debug, Error)]
pub enum DivisionError {
    #[error("No agents to allocate to")]
    NoAgents,
    #[error("No items to allocate")]
    NoItems,
    #[error("Scale must be between 1 and {max} (found {scale})")]
    InvalidScale { scale: u32, max: u32 },
    #[error("Valuation matrix has {found} rows, expected one per agent ({expected})")]
    RowCountMismatch { expected: usize, found: usize },
    #[error("Valuation row {agent} has {found} entries, expected {expected}")]
    RaggedMatrix {
        agent: usize,
        expected: usize,
        found: usize,
    },
    #[error("Valuation of item {item} by agent {agent} must be finite and non-negative (found {value})")]
    InvalidValuation { agent: usize, item: usize, value: f64 },
    #[error("Allocation model too large (variables={variables}, max={max})")]
    ModelTooLarge { variables: usize, max: usize },
    #[error("Allocation model has no feasible assignment")]
    Infeasible,
    #[error("Solver exhausted its time budget without a feasible assignment")]
    TimedOut,
    #[error("Solver failed: {0}")]
    SolverFailure(String),
    #[error("Solver assignment violates the allocation constraints")]
    InconsistentSolution,
}

pub const MAX_SCALE: u32 = 10_000;
const MAX_MODEL_VARIABLES: usize = 10_000;
/// Absolute slack, in scaled units, when pinning the worst-off value for a tie-break.
const WORST_FLOOR_TOLERANCE: f64 = 1e-6;
/// Distance from 0 or 1 beyond which a binary is not trusted.
const BINARY_TOLERANCE: f64 = 1e-6;

/// Computes an allocation maximizing the minimum satisfaction over all agents.
///
/// Satisfaction of agent `a` is `Σ_j I[a][j]·y[a,j] + Σ_k D[a][k]·x[a,k] / scale`;
/// the model keeps it in scaled units so that no division appears in a constraint.
/// When a tie-break is requested, a second stage pins the worst-off value found by
/// the first stage and optimizes the secondary criterion within the remaining budget.
pub fn allocate_max_min(
    problem: &DivisionProblem,
    options: DivisionOptions,
) -> Result<DivisionSolution, DivisionError> {
    validate_problem(problem, options)?;

    let model = AllocationModel::new(problem, options);
    let variable_count = model.variable_count(options.tie_break);
    if variable_count > MAX_MODEL_VARIABLES {
        return Err(DivisionError::ModelTooLarge {
            variables: variable_count,
            max: MAX_MODEL_VARIABLES,
        });
    }

    tracing::debug!(
        agent_count = problem.agent_count,
        indivisible_count = model.indivisible_count,
        divisible_count = model.divisible_count,
        scale = options.scale,
        variable_count,
        worst_upper_bound = model.worst_upper_bound,
        tie_break = ?options.tie_break,
        "Building max-min allocation model"
    );

    let started = Instant::now();
    let deadline = options.time_limit.map(|limit| started + limit);

    let first = solve_stage(&model, StageObjective::WorstOff, None, remaining(deadline))?;
    let mut solution = first.to_solution(&model)?;

    let secondary = match options.tie_break {
        TieBreak::None => None,
        TieBreak::TotalWelfare => Some(StageObjective::TotalWelfare),
        TieBreak::FewestSplits => Some(StageObjective::FewestSplits),
    };
    if let Some(objective) = secondary {
        match remaining(deadline) {
            Some(budget) if budget.is_zero() => {
                tracing::warn!(
                    tie_break = ?options.tie_break,
                    "Time budget exhausted before tie-break stage; keeping worst-off solution"
                );
            }
            budget => {
                let first_worst = model.scaled_worst(&solution);
                match solve_stage(&model, objective, Some(worst_floor(first_worst)), budget)
                    .and_then(|stage| stage.to_solution(&model))
                {
                    Ok(refined) if model.scaled_worst(&refined) < first_worst => {
                        tracing::warn!(
                            tie_break = ?options.tie_break,
                            first_worst,
                            refined_worst = model.scaled_worst(&refined),
                            "Tie-break stage lowered the worst-off value; keeping worst-off solution"
                        );
                    }
                    Ok(mut refined) => {
                        // The worst-off value is only as certain as the first stage.
                        if first.status == SolveStatus::Feasible {
                            refined.status = SolveStatus::Feasible;
                        }
                        solution = refined;
                    }
                    Err(err) => {
                        tracing::warn!(
                            tie_break = ?options.tie_break,
                            error = %err,
                            "Tie-break stage failed; keeping worst-off solution"
                        );
                    }
                }
            }
        }
    }

    let elapsed_ms = started.elapsed().as_millis();
    match solution.status {
        SolveStatus::Optimal => tracing::info!(
            agent_count = problem.agent_count,
            worst_scaled = model.scaled_worst(&solution),
            elapsed_ms,
            "Max-min allocation solved to optimality"
        ),
        SolveStatus::Feasible => tracing::warn!(
            agent_count = problem.agent_count,
            worst_scaled = model.scaled_worst(&solution),
            elapsed_ms,
            "Max-min allocation hit the time limit; returning best feasible assignment"
        ),
    }

    Ok(solution)
}

fn validate_problem(
    problem: &DivisionProblem,
    options: DivisionOptions,
) -> Result<(), DivisionError> {
    if options.scale == 0 || options.scale > MAX_SCALE {
        return Err(DivisionError::InvalidScale {
            scale: options.scale,
            max: MAX_SCALE,
        });
    }
    if problem.agent_count == 0 {
        return Err(DivisionError::NoAgents);
    }

    for matrix in [&problem.indivisible, &problem.divisible] {
        let expected = matrix.first().map_or(0, Vec::len);
        if matrix.len() != problem.agent_count {
            return Err(DivisionError::RowCountMismatch {
                expected: problem.agent_count,
                found: matrix.len(),
            });
        }
        for (agent, row) in matrix.iter().enumerate() {
            if row.len() != expected {
                return Err(DivisionError::RaggedMatrix {
                    agent,
                    expected,
                    found: row.len(),
                });
            }
            if let Some((item, &value)) = row
                .iter()
                .enumerate()
                .find(|(_, value)| !value.is_finite() || **value < 0.0)
            {
                return Err(DivisionError::InvalidValuation { agent, item, value });
            }
        }
    }

    if problem.indivisible_count() == 0 && problem.divisible_count() == 0 {
        return Err(DivisionError::NoItems);
    }
    Ok(())
}

fn remaining(deadline: Option<Instant>) -> Option<Duration> {
    deadline.map(|deadline| deadline.saturating_duration_since(Instant::now()))
}

fn worst_floor(worst: f64) -> f64 {
    (worst - WORST_FLOOR_TOLERANCE).max(0.0)
}

#[derive(Clone, Copy, Debug)]
enum StageObjective {
    WorstOff,
    TotalWelfare,
    FewestSplits,
}

struct AllocationModel<'a> {
    problem: &'a DivisionProblem,
    scale: f64,
    indivisible_count: usize,
    divisible_count: usize,
    worst_upper_bound: f64,
}

impl<'a> AllocationModel<'a> {
    fn new(problem: &'a DivisionProblem, options: DivisionOptions) -> Self {
        let scale = f64::from(options.scale);
        let worst_upper_bound = problem
            .indivisible
            .iter()
            .zip(&problem.divisible)
            .map(|(indivisible, divisible)| {
                scale * (indivisible.iter().sum::<f64>() + divisible.iter().sum::<f64>())
            })
            .fold(0.0, f64::max);

        Self {
            problem,
            scale,
            indivisible_count: problem.indivisible_count(),
            divisible_count: problem.divisible_count(),
            worst_upper_bound,
        }
    }

    fn variable_count(&self, tie_break: TieBreak) -> usize {
        let agents = self.problem.agent_count;
        let base = agents * (self.indivisible_count + self.divisible_count) + 1;
        match tie_break {
            TieBreak::FewestSplits => base + agents * self.divisible_count + self.divisible_count,
            TieBreak::None | TieBreak::TotalWelfare => base,
        }
    }

    /// Minimum scaled satisfaction of an extracted assignment, summed in a fixed
    /// order so that equal allocations compare equal.
    fn scaled_worst(&self, solution: &DivisionSolution) -> f64 {
        (0..self.problem.agent_count)
            .map(|agent| {
                let whole: f64 = solution
                    .indivisible_owners
                    .iter()
                    .zip(&self.problem.indivisible[agent])
                    .filter(|(owner, _)| **owner == agent)
                    .map(|(_, value)| self.scale * value)
                    .sum();
                let shares: f64 = solution.divisible_units[agent]
                    .iter()
                    .zip(&self.problem.divisible[agent])
                    .map(|(units, value)| f64::from(*units) * value)
                    .sum();
                whole + shares
            })
            .fold(f64::INFINITY, f64::min)
    }

    /// `scale·Σ I[a][j]·y[a,j] + Σ D[a][k]·x[a,k]`
    fn scaled_satisfaction(
        &self,
        agent: usize,
        owner_vars: &[Variable],
        share_vars: &[Variable],
    ) -> Expression {
        let mut expr = Expression::with_capacity(owner_vars.len() + share_vars.len());
        for (value, var) in self.problem.indivisible[agent].iter().zip(owner_vars) {
            expr.add_mul(self.scale * value, *var);
        }
        for (value, var) in self.problem.divisible[agent].iter().zip(share_vars) {
            expr.add_mul(*value, *var);
        }
        expr
    }
}

struct StageSolution {
    worst: f64,
    owner_values: Vec<Vec<f64>>,
    share_values: Vec<Vec<f64>>,
    status: SolveStatus,
}

impl StageSolution {
    fn to_solution(&self, model: &AllocationModel<'_>) -> Result<DivisionSolution, DivisionError> {
        // A time-limited run may report an incumbent-free assignment.
        let inconsistent = || match self.status {
            SolveStatus::Feasible => DivisionError::TimedOut,
            SolveStatus::Optimal => DivisionError::InconsistentSolution,
        };

        let mut indivisible_owners = Vec::with_capacity(model.indivisible_count);
        for item in 0..model.indivisible_count {
            let mut owner = None;
            for (agent, row) in self.owner_values.iter().enumerate() {
                let Some(owned) = binary_value(row[item]) else {
                    return Err(inconsistent());
                };
                if owned {
                    if owner.is_some() {
                        return Err(inconsistent());
                    }
                    owner = Some(agent);
                }
            }
            indivisible_owners.push(owner.ok_or_else(inconsistent)?);
        }

        let scale = model.scale as i64;
        let mut divisible_units: Vec<Vec<u32>> = vec![Vec::new(); self.share_values.len()];
        for item in 0..model.divisible_count {
            let mut total = 0i64;
            for (agent, row) in self.share_values.iter().enumerate() {
                let value = row[item];
                if !value.is_finite() {
                    return Err(inconsistent());
                }
                let units = round_bankers(value);
                if !(0..=scale).contains(&units) {
                    return Err(inconsistent());
                }
                total += units;
                divisible_units[agent].push(units as u32);
            }
            if total != scale {
                return Err(inconsistent());
            }
        }

        Ok(DivisionSolution {
            scale: scale as u32,
            indivisible_owners,
            divisible_units,
            status: self.status,
        })
    }
}

#[allow(clippy::too_many_lines)]
fn solve_stage(
    model: &AllocationModel<'_>,
    objective_kind: StageObjective,
    worst_floor: Option<f64>,
    time_limit: Option<Duration>,
) -> Result<StageSolution, DivisionError> {
    let agent_count = model.problem.agent_count;
    let mut vars = variables!();

    let mut owner_vars: Vec<Vec<Variable>> = Vec::with_capacity(agent_count);
    let mut share_vars: Vec<Vec<Variable>> = Vec::with_capacity(agent_count);
    for _ in 0..agent_count {
        owner_vars.push(
            (0..model.indivisible_count)
                .map(|_| vars.add(variable().binary()))
                .collect(),
        );
        share_vars.push(
            (0..model.divisible_count)
                .map(|_| vars.add(variable().integer().min(0.0).max(model.scale)))
                .collect(),
        );
    }
    let worst = vars.add(variable().min(0.0).max(model.worst_upper_bound));

    // whole[a][k] = 1 only if agent a holds all of divisible item k;
    // split[k] = 1 when no agent does.
    let mut whole_vars: Vec<Vec<Variable>> = Vec::new();
    let mut split_vars: Vec<Variable> = Vec::new();
    if let StageObjective::FewestSplits = objective_kind {
        for _ in 0..agent_count {
            whole_vars.push(
                (0..model.divisible_count)
                    .map(|_| vars.add(variable().binary()))
                    .collect(),
            );
        }
        split_vars = (0..model.divisible_count)
            .map(|_| vars.add(variable().binary()))
            .collect();
    }

    let satisfactions: Vec<Expression> = (0..agent_count)
        .map(|agent| model.scaled_satisfaction(agent, &owner_vars[agent], &share_vars[agent]))
        .collect();

    let unsolved = match objective_kind {
        StageObjective::WorstOff => {
            let mut expr = Expression::default();
            expr.add_mul(1.0, worst);
            vars.maximise(expr)
        }
        StageObjective::TotalWelfare => {
            let mut expr = Expression::default();
            for satisfaction in &satisfactions {
                expr += satisfaction.clone();
            }
            vars.maximise(expr)
        }
        StageObjective::FewestSplits => {
            let mut expr = Expression::with_capacity(split_vars.len());
            for var in &split_vars {
                expr.add_mul(1.0, *var);
            }
            vars.minimise(expr)
        }
    };

    let mut problem = unsolved
        .using(highs)
        .set_verbose(false)
        .set_mip_rel_gap(0.0)
        .map_err(|err| DivisionError::SolverFailure(err.to_string()))?;
    if let Some(limit) = time_limit {
        problem = problem.set_time_limit(limit.as_secs_f64());
    }

    // Exactly one owner per indivisible item
    for item in 0..model.indivisible_count {
        let mut owners = Expression::with_capacity(agent_count);
        for row in &owner_vars {
            owners.add_mul(1.0, row[item]);
        }
        problem = problem.with(owners.eq(1.0));
    }

    // Divisible shares add up to the whole item
    for item in 0..model.divisible_count {
        let mut shares = Expression::with_capacity(agent_count);
        for row in &share_vars {
            shares.add_mul(1.0, row[item]);
        }
        problem = problem.with(shares.eq(model.scale));
    }

    // worst <= sat[a]
    for satisfaction in &satisfactions {
        let mut gap = Expression::default();
        gap.add_mul(1.0, worst);
        gap -= satisfaction.clone();
        problem = problem.with(gap.leq(0.0));
    }

    if let Some(floor) = worst_floor {
        let mut pinned = Expression::default();
        pinned.add_mul(-1.0, worst);
        problem = problem.with(pinned.leq(-floor));
    }

    if let StageObjective::FewestSplits = objective_kind {
        for (whole_row, share_row) in whole_vars.iter().zip(&share_vars) {
            for (&whole, &share) in whole_row.iter().zip(share_row) {
                let mut held = Expression::default();
                held.add_mul(model.scale, whole);
                held.add_mul(-1.0, share);
                problem = problem.with(held.leq(0.0));
            }
        }
        for (item, &split) in split_vars.iter().enumerate() {
            let mut covered = Expression::with_capacity(agent_count + 1);
            for row in &whole_vars {
                covered.add_mul(-1.0, row[item]);
            }
            covered.add_mul(-1.0, split);
            problem = problem.with(covered.leq(-1.0));
        }
    }

    let started = Instant::now();
    let solution = problem
        .solve()
        .map_err(|err| classify_failure(err, time_limit, started.elapsed()))?;

    // Anything short of a proven optimum, including a gap stop, is only feasible.
    let status = match solution.status() {
        SolutionStatus::Optimal => SolveStatus::Optimal,
        _ => SolveStatus::Feasible,
    };
    let owner_values = owner_vars
        .iter()
        .map(|row| row.iter().map(|var| solution.value(*var)).collect())
        .collect();
    let share_values = share_vars
        .iter()
        .map(|row| row.iter().map(|var| solution.value(*var)).collect())
        .collect();

    Ok(StageSolution {
        worst: solution.value(worst),
        owner_values,
        share_values,
        status,
    })
}

/// HiGHS reports a time limit reached without an incumbent as a generic error, so
/// any non-infeasible failure after the budget has elapsed counts as a timeout.
fn classify_failure(
    err: ResolutionError,
    time_limit: Option<Duration>,
    elapsed: Duration,
) -> DivisionError {
    match err {
        ResolutionError::Infeasible => DivisionError::Infeasible,
        err if time_limit.is_some_and(|limit| elapsed >= limit) => {
            tracing::warn!(
                error = %err,
                elapsed_ms = elapsed.as_millis(),
                "Solver stopped at the time limit without a feasible assignment"
            );
            DivisionError::TimedOut
        }
        err => DivisionError::SolverFailure(err.to_string()),
    }
}

fn round_bankers(value: f64) -> i64 {
    value.round_ties_even() as i64
}

/// `None` unless `value` lies within [`BINARY_TOLERANCE`] of 0 or 1.
fn binary_value(value: f64) -> Option<bool> {
    if (value - 1.0).abs() <= BINARY_TOLERANCE {
        Some(true)
    } else if value.abs() <= BINARY_TOLERANCE {
        Some(false)
    } else {
        None
    }
}

use fxhash::FxHashMap;
use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;

pub const MAX_AGENTS: usize = 50;
pub const MAX_ITEMS: usize = 50;
pub const MAX_NAME_LEN: usize = 50;

/// Every agent's valuations are expected to add up to this total.
pub const VALUATION_TOTAL: Decimal = Decimal::ONE_HUNDRED;
pub const MIN_VALUATION: Decimal = Decimal::ZERO;
pub const MAX_VALUATION: Decimal = Decimal::ONE_HUNDRED;
/// 0.01
pub const NORMALIZATION_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AgentName(String);

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemName(String);

macro_rules! name_impls {
    ($name:ident) => {
        impl $name {
            pub fn new(raw: impl AsRef<str>) -> Self {
                Self(raw.as_ref().trim().to_owned())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            fn is_valid(&self) -> bool {
                !self.0.is_empty() && self.0.chars().count() <= MAX_NAME_LEN
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self::new(raw)
            }
        }
    };
}

name_impls!(AgentName);
name_impls!(ItemName);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Divisibility {
    /// Must go wholly to exactly one agent.
    Indivisible,
    /// May be split into fractional shares summing to one.
    Divisible,
}

impl Divisibility {
    pub fn from_flag(is_divisible: bool) -> Self {
        if is_divisible {
            Self::Divisible
        } else {
            Self::Indivisible
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
    pub name: ItemName,
    pub divisibility: Divisibility,
}

impl Item {
    pub fn indivisible(name: impl AsRef<str>) -> Self {
        Self {
            name: ItemName::new(name),
            divisibility: Divisibility::Indivisible,
        }
    }

    pub fn divisible(name: impl AsRef<str>) -> Self {
        Self {
            name: ItemName::new(name),
            divisibility: Divisibility::Divisible,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Valuation {
    pub agent: AgentName,
    pub item: ItemName,
    pub value: Decimal,
}

impl Valuation {
    pub fn new(agent: impl AsRef<str>, item: impl AsRef<str>, value: Decimal) -> Self {
        Self {
            agent: AgentName::new(agent),
            item: ItemName::new(item),
            value,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValuationTableError {
    #[error("At least one agent is required")]
    NoAgents,
    #[error("At least one item is required")]
    NoItems,
    #[error("Too many agents ({count}, max {max})")]
    TooManyAgents { count: usize, max: usize },
    #[error("Too many items ({count}, max {max})")]
    TooManyItems { count: usize, max: usize },
    #[error("Name '{name}' must be non-empty and at most {max} characters", max = MAX_NAME_LEN)]
    InvalidName { name: String },
    #[error("Agent '{0}' is declared more than once")]
    DuplicateAgent(AgentName),
    #[error("Item '{0}' is declared more than once")]
    DuplicateItem(ItemName),
    #[error("Valuation references unknown agent '{0}'")]
    UnknownAgent(AgentName),
    #[error("Valuation references unknown item '{0}'")]
    UnknownItem(ItemName),
    #[error("Agent '{agent}' values item '{item}' more than once")]
    DuplicateValuation { agent: AgentName, item: ItemName },
    #[error("Valuation of '{item}' by '{agent}' must be between 0 and 100 (found {value})")]
    ValueOutOfRange {
        agent: AgentName,
        item: ItemName,
        value: Decimal,
    },
    #[error("Missing valuation of '{item}' by '{agent}'")]
    MissingValuation { agent: AgentName, item: ItemName },
    #[error("Valuations of '{agent}' must sum to {expected} (found {total})", expected = VALUATION_TOTAL)]
    NotNormalized { agent: AgentName, total: Decimal },
}

/// Complete agent × item valuation matrix. Immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct ValuationTable {
    agents: Vec<AgentName>,
    items: Vec<Item>,
    /// `values[agent][item]`, both in declaration order.
    values: Vec<Vec<Decimal>>,
}

impl ValuationTable {
    pub fn try_new(
        agents: Vec<AgentName>,
        items: Vec<Item>,
        valuations: impl IntoIterator<Item = Valuation>,
    ) -> Result<Self, ValuationTableError> {
        if agents.is_empty() {
            return Err(ValuationTableError::NoAgents);
        }
        if items.is_empty() {
            return Err(ValuationTableError::NoItems);
        }
        if agents.len() > MAX_AGENTS {
            return Err(ValuationTableError::TooManyAgents {
                count: agents.len(),
                max: MAX_AGENTS,
            });
        }
        if items.len() > MAX_ITEMS {
            return Err(ValuationTableError::TooManyItems {
                count: items.len(),
                max: MAX_ITEMS,
            });
        }

        let mut agent_lookup: FxHashMap<&AgentName, usize> = FxHashMap::default();
        for (idx, agent) in agents.iter().enumerate() {
            if !agent.is_valid() {
                return Err(ValuationTableError::InvalidName {
                    name: agent.to_string(),
                });
            }
            if agent_lookup.insert(agent, idx).is_some() {
                return Err(ValuationTableError::DuplicateAgent(agent.clone()));
            }
        }

        let mut item_lookup: FxHashMap<&ItemName, usize> = FxHashMap::default();
        for (idx, item) in items.iter().enumerate() {
            if !item.name.is_valid() {
                return Err(ValuationTableError::InvalidName {
                    name: item.name.to_string(),
                });
            }
            if item_lookup.insert(&item.name, idx).is_some() {
                return Err(ValuationTableError::DuplicateItem(item.name.clone()));
            }
        }

        let mut cells: Vec<Vec<Option<Decimal>>> = vec![vec![None; items.len()]; agents.len()];
        for Valuation { agent, item, value } in valuations {
            let Some(&agent_idx) = agent_lookup.get(&agent) else {
                return Err(ValuationTableError::UnknownAgent(agent));
            };
            let Some(&item_idx) = item_lookup.get(&item) else {
                return Err(ValuationTableError::UnknownItem(item));
            };
            let cell = &mut cells[agent_idx][item_idx];
            if cell.is_some() {
                return Err(ValuationTableError::DuplicateValuation { agent, item });
            }
            if value < MIN_VALUATION || value > MAX_VALUATION {
                return Err(ValuationTableError::ValueOutOfRange { agent, item, value });
            }
            *cell = Some(value);
        }

        let mut values = Vec::with_capacity(agents.len());
        for (agent, row) in agents.iter().zip(cells) {
            let row = row
                .into_iter()
                .zip(&items)
                .map(|(cell, item)| {
                    cell.ok_or_else(|| ValuationTableError::MissingValuation {
                        agent: agent.clone(),
                        item: item.name.clone(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            let total: Decimal = row.iter().sum();
            if (total - VALUATION_TOTAL).abs() > NORMALIZATION_TOLERANCE {
                return Err(ValuationTableError::NotNormalized {
                    agent: agent.clone(),
                    total,
                });
            }
            values.push(row);
        }

        Ok(Self {
            agents,
            items,
            values,
        })
    }

    pub fn agents(&self) -> &[AgentName] {
        &self.agents
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn value(&self, agent: usize, item: usize) -> Decimal {
        self.values[agent][item]
    }

    pub fn agent_index(&self, agent: &AgentName) -> Option<usize> {
        self.agents.iter().position(|candidate| candidate == agent)
    }

    pub fn item_index(&self, item: &ItemName) -> Option<usize> {
        self.items.iter().position(|candidate| &candidate.name == item)
    }

    pub fn value_of(&self, agent: &AgentName, item: &ItemName) -> Option<Decimal> {
        Some(self.value(self.agent_index(agent)?, self.item_index(item)?))
    }

    pub fn total_for(&self, agent: usize) -> Decimal {
        self.values[agent].iter().sum()
    }

    /// Indices of indivisible items, in declaration order.
    pub fn indivisible_items(&self) -> Vec<usize> {
        self.items_with(Divisibility::Indivisible)
    }

    /// Indices of divisible items, in declaration order.
    pub fn divisible_items(&self) -> Vec<usize> {
        self.items_with(Divisibility::Divisible)
    }

    /// `I[agent][j]` over indivisible items only.
    pub fn indivisible_matrix(&self) -> Vec<Vec<Decimal>> {
        self.matrix_for(&self.indivisible_items())
    }

    /// `D[agent][k]` over divisible items only.
    pub fn divisible_matrix(&self) -> Vec<Vec<Decimal>> {
        self.matrix_for(&self.divisible_items())
    }

    fn items_with(&self, divisibility: Divisibility) -> Vec<usize> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.divisibility == divisibility)
            .map(|(idx, _)| idx)
            .collect()
    }

    fn matrix_for(&self, columns: &[usize]) -> Vec<Vec<Decimal>> {
        self.values
            .iter()
            .map(|row| columns.iter().map(|&item| row[item]).collect())
            .collect()
    }
}

/// Whether the solver certified the worst-off value as optimal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolveQuality {
    Optimal,
    Feasible,
}

/// Raw solution in table coordinates.
///
/// `indivisible_owners[j]` is the owning agent of the `j`-th indivisible item and
/// `divisible_units[agent][k]` the share of the `k`-th divisible item in units of `1 / scale`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShareAssignment {
    pub scale: u32,
    pub indivisible_owners: Vec<usize>,
    pub divisible_units: Vec<Vec<u32>>,
    pub quality: SolveQuality,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DivisibleShare {
    pub item: ItemName,
    /// In `(0, 1]`.
    pub fraction: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentAllocation {
    pub agent: AgentName,
    pub indivisible: Vec<ItemName>,
    pub divisible: Vec<DivisibleShare>,
}

impl AgentAllocation {
    pub fn new(agent: AgentName) -> Self {
        Self {
            agent,
            indivisible: Vec::new(),
            divisible: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.indivisible.is_empty() && self.divisible.is_empty()
    }

    pub fn fraction_of(&self, item: &ItemName) -> Decimal {
        self.divisible
            .iter()
            .find(|share| &share.item == item)
            .map_or(Decimal::ZERO, |share| share.fraction)
    }
}

/// Per-agent holdings, in agent declaration order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Allocation {
    agents: Vec<AgentAllocation>,
}

impl Allocation {
    pub fn new(agents: Vec<AgentAllocation>) -> Self {
        Self { agents }
    }

    pub fn agents(&self) -> &[AgentAllocation] {
        &self.agents
    }

    pub fn iter(&self) -> impl Iterator<Item = &AgentAllocation> + '_ {
        self.agents.iter()
    }

    pub fn for_agent(&self, agent: &AgentName) -> Option<&AgentAllocation> {
        self.agents.iter().find(|holding| &holding.agent == agent)
    }

    pub fn owner_of(&self, item: &ItemName) -> Option<&AgentName> {
        self.agents
            .iter()
            .find(|holding| holding.indivisible.contains(item))
            .map(|holding| &holding.agent)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentSatisfaction {
    pub agent: AgentName,
    /// Sum of the agent's own valuations over what they received.
    pub value: Decimal,
    /// `value` as a percentage of the agent's normalized total.
    pub percentage: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FairnessReport {
    pub satisfactions: Vec<AgentSatisfaction>,
    /// Minimum of `satisfactions[..].percentage`.
    pub worst_satisfaction: Decimal,
}

impl fmt::Display for SolveQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Optimal => f.write_str("optimal"),
            Self::Feasible => f.write_str("feasible"),
        }
    }
}

use crate::allocation_service::AllocationOutcome;
use fairshare_domain::{
    AgentName, Divisibility, Item, ItemName, Valuation, ValuationTable, ValuationTableError,
};
use indexmap::IndexMap;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};

/// A single allocation request, as submitted by the input-collection layer.
///
/// `people` and `person` are accepted in place of `agents` and `agent`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AllocationRequest {
    #[serde(default)]
    pub items: Vec<ItemSpec>,
    #[serde(default, alias = "people")]
    pub agents: Vec<AgentSpec>,
    #[serde(default)]
    pub valuations: Vec<ValuationSpec>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ItemSpec {
    pub name: String,
    #[serde(default)]
    pub is_divisible: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AgentSpec {
    Name(String),
    Named { name: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ValuationSpec {
    #[serde(alias = "person")]
    pub agent: String,
    pub item: String,
    pub value: Decimal,
}

impl AgentSpec {
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) | Self::Named { name } => name,
        }
    }
}

impl From<&ItemSpec> for Item {
    fn from(spec: &ItemSpec) -> Self {
        Item {
            name: ItemName::new(&spec.name),
            divisibility: Divisibility::from_flag(spec.is_divisible),
        }
    }
}

impl From<&ValuationSpec> for Valuation {
    fn from(spec: &ValuationSpec) -> Self {
        Valuation::new(&spec.agent, &spec.item, spec.value)
    }
}

impl AllocationRequest {
    pub fn new(items: Vec<ItemSpec>, agents: Vec<AgentSpec>, valuations: Vec<ValuationSpec>) -> Self {
        Self {
            items,
            agents,
            valuations,
        }
    }

    pub fn to_valuation_table(&self) -> Result<ValuationTable, ValuationTableError> {
        ValuationTable::try_new(
            self.agents
                .iter()
                .map(|agent| AgentName::new(agent.name()))
                .collect(),
            self.items.iter().map(Item::from).collect(),
            self.valuations.iter().map(Valuation::from),
        )
    }
}

impl ItemSpec {
    pub fn new(name: impl Into<String>, is_divisible: bool) -> Self {
        Self {
            name: name.into(),
            is_divisible,
        }
    }
}

impl ValuationSpec {
    pub fn new(agent: impl Into<String>, item: impl Into<String>, value: Decimal) -> Self {
        Self {
            agent: agent.into(),
            item: item.into(),
            value,
        }
    }
}

/// Response body, keyed by agent name in request order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationResponse {
    pub allocations: IndexMap<String, AgentAllocationView>,
    pub worst_satisfaction: f64,
    pub quality: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentAllocationView {
    pub indivisible: Vec<String>,
    pub divisible: IndexMap<String, f64>,
    pub satisfaction: f64,
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

impl From<&AllocationOutcome> for AllocationResponse {
    fn from(outcome: &AllocationOutcome) -> Self {
        let allocations = outcome
            .allocation
            .iter()
            .zip(&outcome.report.satisfactions)
            .map(|(holding, satisfaction)| {
                let view = AgentAllocationView {
                    indivisible: holding
                        .indivisible
                        .iter()
                        .map(|item| item.as_str().to_owned())
                        .collect(),
                    divisible: holding
                        .divisible
                        .iter()
                        .map(|share| (share.item.as_str().to_owned(), to_f64(share.fraction)))
                        .collect(),
                    satisfaction: to_f64(satisfaction.percentage),
                };
                (holding.agent.as_str().to_owned(), view)
            })
            .collect();

        Self {
            allocations,
            worst_satisfaction: to_f64(outcome.report.worst_satisfaction),
            quality: outcome.quality.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::agents_as_strings(
        r#"{"items":[{"name":"X","is_divisible":false}],"agents":["A"],"valuations":[{"agent":"A","item":"X","value":100}]}"#
    )]
    #[case::people_as_objects(
        r#"{"items":[{"name":"X","is_divisible":false}],"people":[{"name":"A"}],"valuations":[{"person":"A","item":"X","value":100}]}"#
    )]
    fn accepts_both_request_shapes(#[case] body: &str) {
        let request: AllocationRequest = serde_json::from_str(body).expect("valid request");

        assert_eq!(request.agents[0].name(), "A");
        assert_eq!(request.valuations[0].agent, "A");
        assert_eq!(request.valuations[0].value, Decimal::ONE_HUNDRED);
        assert!(!request.items[0].is_divisible);
    }

    #[test]
    fn fractional_values_keep_their_decimal_digits() {
        let request: AllocationRequest = serde_json::from_str(
            r#"{"items":[{"name":"X","is_divisible":true}],"agents":["A"],"valuations":[{"agent":"A","item":"X","value":33.33}]}"#,
        )
        .expect("valid request");

        assert_eq!(request.valuations[0].value, Decimal::new(3333, 2));
    }

    #[test]
    fn missing_sections_deserialize_as_empty() {
        let request: AllocationRequest = serde_json::from_str("{}").expect("valid request");
        assert!(request.items.is_empty());
        assert!(request.agents.is_empty());
        assert_eq!(
            request.to_valuation_table(),
            Err(ValuationTableError::NoAgents)
        );
    }

    #[test]
    fn converts_to_domain_table() {
        let request = AllocationRequest::new(
            vec![ItemSpec::new("House", false), ItemSpec::new("Cash", true)],
            vec![AgentSpec::Name("Alice".into())],
            vec![
                ValuationSpec::new("Alice", "House", Decimal::from(40)),
                ValuationSpec::new("Alice", "Cash", Decimal::from(60)),
            ],
        );

        let table = request.to_valuation_table().expect("valid table");
        assert_eq!(table.indivisible_items(), vec![0]);
        assert_eq!(table.divisible_items(), vec![1]);
        assert_eq!(table.value(0, 1), Decimal::from(60));
    }
}

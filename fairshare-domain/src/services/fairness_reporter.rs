use crate::{
    model::{AgentSatisfaction, Allocation, FairnessReport, VALUATION_TOTAL, ValuationTable},
    services::SatisfactionCalculator,
};
use rust_decimal::Decimal;

/// Derives the headline guarantee: every agent receives at least
/// `worst_satisfaction` percent of the value they assigned to all items.
pub struct FairnessReporter;

impl FairnessReporter {
    pub fn report(&self, table: &ValuationTable, allocation: &Allocation) -> FairnessReport {
        let satisfactions: Vec<AgentSatisfaction> = allocation
            .iter()
            .map(|holding| {
                let value = SatisfactionCalculator.satisfaction(table, holding);
                AgentSatisfaction {
                    agent: holding.agent.clone(),
                    value,
                    percentage: value * Decimal::ONE_HUNDRED / VALUATION_TOTAL,
                }
            })
            .collect();

        let worst_satisfaction = satisfactions
            .iter()
            .map(|satisfaction| satisfaction.percentage)
            .min()
            .unwrap_or(Decimal::ZERO);

        FairnessReport {
            satisfactions,
            worst_satisfaction,
        }
    }
}

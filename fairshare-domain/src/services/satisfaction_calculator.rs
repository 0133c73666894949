use crate::model::{AgentAllocation, ValuationTable};
use rust_decimal::Decimal;

/// Recomputes what an agent received, measured by the agent's own valuations.
pub struct SatisfactionCalculator;

impl SatisfactionCalculator {
    /// `Σ I[a][j] over owned indivisible items + Σ fraction_k · D[a][k]`
    ///
    /// Items unknown to the table contribute nothing.
    pub fn satisfaction(&self, table: &ValuationTable, holding: &AgentAllocation) -> Decimal {
        let whole: Decimal = holding
            .indivisible
            .iter()
            .filter_map(|item| table.value_of(&holding.agent, item))
            .sum();
        let shared: Decimal = holding
            .divisible
            .iter()
            .filter_map(|share| {
                table
                    .value_of(&holding.agent, &share.item)
                    .map(|value| value * share.fraction)
            })
            .sum();
        whole + shared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AgentName, DivisibleShare, Item, ItemName, Valuation};
    use proptest::prelude::*;
    use rstest::rstest;

    fn table(house: u32, cash: u32) -> ValuationTable {
        ValuationTable::try_new(
            vec![AgentName::new("Alice")],
            vec![
                Item::indivisible("House"),
                Item::divisible("Cash"),
                Item::indivisible("Boat"),
            ],
            [
                Valuation::new("Alice", "House", Decimal::from(house)),
                Valuation::new("Alice", "Cash", Decimal::from(cash)),
                Valuation::new("Alice", "Boat", Decimal::from(100 - house - cash)),
            ],
        )
        .expect("valid table")
    }

    fn holding(indivisible: &[&str], divisible: &[(&str, Decimal)]) -> AgentAllocation {
        AgentAllocation {
            agent: AgentName::new("Alice"),
            indivisible: indivisible.iter().map(ItemName::new).collect(),
            divisible: divisible
                .iter()
                .map(|(item, fraction)| DivisibleShare {
                    item: ItemName::new(item),
                    fraction: *fraction,
                })
                .collect(),
        }
    }

    #[rstest]
    #[case::nothing(&[], &[], Decimal::ZERO)]
    #[case::whole_item(&["House"], &[], Decimal::from(60))]
    #[case::half_cash(&[], &[("Cash", Decimal::new(5, 1))], Decimal::from(15))]
    #[case::everything(&["House", "Boat"], &[("Cash", Decimal::ONE)], Decimal::from(100))]
    #[case::unknown_item_ignored(&["Piano"], &[], Decimal::ZERO)]
    fn sums_whole_items_and_fractional_shares(
        #[case] indivisible: &[&str],
        #[case] divisible: &[(&str, Decimal)],
        #[case] expected: Decimal,
    ) {
        let satisfaction =
            SatisfactionCalculator.satisfaction(&table(60, 30), &holding(indivisible, divisible));
        assert_eq!(satisfaction, expected);
    }

    proptest! {
        #[test]
        fn raising_value_of_an_owned_item_never_lowers_satisfaction(
            house in 0u32..=50,
            cash in 0u32..=50,
            bump in 0u32..=50,
            units in 0u32..=100,
        ) {
            // Bump House at the expense of Boat, which Alice does not hold.
            let bump = bump.min(100 - house - cash);
            let owned = holding(&["House"], &[("Cash", Decimal::from(units) / Decimal::ONE_HUNDRED)]);

            let before = SatisfactionCalculator.satisfaction(&table(house, cash), &owned);
            let after = SatisfactionCalculator.satisfaction(&table(house + bump, cash), &owned);

            prop_assert!(after >= before);
        }
    }
}

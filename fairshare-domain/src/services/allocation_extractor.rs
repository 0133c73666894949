use crate::model::{
    AgentAllocation, Allocation, DivisibleShare, ShareAssignment, ValuationTable,
};
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("Share scale must be positive")]
    ZeroScale,
    #[error("Assignment covers {found} indivisible items, expected {expected}")]
    IndivisibleCountMismatch { expected: usize, found: usize },
    #[error("Assignment covers {found} agents, expected {expected}")]
    AgentCountMismatch { expected: usize, found: usize },
    #[error("Assignment covers {found} divisible items for agent {agent}, expected {expected}")]
    DivisibleCountMismatch {
        agent: usize,
        expected: usize,
        found: usize,
    },
    #[error("Indivisible item {item} assigned to unknown agent {owner}")]
    UnknownOwner { item: usize, owner: usize },
    #[error("Divisible item {item} is allocated {total} of {scale} units")]
    IncompleteDivisibleItem { item: usize, total: u64, scale: u32 },
}

/// Maps a raw solver assignment back to named per-agent holdings.
pub struct AllocationExtractor;

impl AllocationExtractor {
    /// Builds the allocation, rejecting any assignment that breaks exclusivity of
    /// indivisible items or completeness of divisible ones.
    ///
    /// Zero shares are omitted from each agent's divisible holdings.
    pub fn extract(
        &self,
        table: &ValuationTable,
        assignment: &ShareAssignment,
    ) -> Result<Allocation, ExtractionError> {
        validate_assignment(table, assignment).inspect_err(|err| {
            tracing::error!(
                error = %err,
                agent_count = table.agents().len(),
                item_count = table.items().len(),
                "Solver assignment rejected during extraction"
            );
        })?;

        let items = table.items();
        let indivisible_items = table.indivisible_items();
        let divisible_items = table.divisible_items();
        let scale = Decimal::from(assignment.scale);

        let mut holdings: Vec<AgentAllocation> = table
            .agents()
            .iter()
            .cloned()
            .map(AgentAllocation::new)
            .collect();

        for (&item_idx, &owner) in indivisible_items.iter().zip(&assignment.indivisible_owners) {
            holdings[owner]
                .indivisible
                .push(items[item_idx].name.clone());
        }

        for (holding, units_row) in holdings.iter_mut().zip(&assignment.divisible_units) {
            for (&item_idx, &units) in divisible_items.iter().zip(units_row) {
                if units == 0 {
                    continue;
                }
                holding.divisible.push(DivisibleShare {
                    item: items[item_idx].name.clone(),
                    fraction: Decimal::from(units) / scale,
                });
            }
        }

        Ok(Allocation::new(holdings))
    }
}

fn validate_assignment(
    table: &ValuationTable,
    assignment: &ShareAssignment,
) -> Result<(), ExtractionError> {
    if assignment.scale == 0 {
        return Err(ExtractionError::ZeroScale);
    }

    let agent_count = table.agents().len();
    let indivisible_count = table.indivisible_items().len();
    let divisible_count = table.divisible_items().len();

    if assignment.indivisible_owners.len() != indivisible_count {
        return Err(ExtractionError::IndivisibleCountMismatch {
            expected: indivisible_count,
            found: assignment.indivisible_owners.len(),
        });
    }
    if let Some((item, &owner)) = assignment
        .indivisible_owners
        .iter()
        .enumerate()
        .find(|(_, owner)| **owner >= agent_count)
    {
        return Err(ExtractionError::UnknownOwner { item, owner });
    }

    if assignment.divisible_units.len() != agent_count {
        return Err(ExtractionError::AgentCountMismatch {
            expected: agent_count,
            found: assignment.divisible_units.len(),
        });
    }
    for (agent, row) in assignment.divisible_units.iter().enumerate() {
        if row.len() != divisible_count {
            return Err(ExtractionError::DivisibleCountMismatch {
                agent,
                expected: divisible_count,
                found: row.len(),
            });
        }
    }

    for item in 0..divisible_count {
        let total: u64 = assignment
            .divisible_units
            .iter()
            .map(|row| u64::from(row[item]))
            .sum();
        if total != u64::from(assignment.scale) {
            return Err(ExtractionError::IncompleteDivisibleItem {
                item,
                total,
                scale: assignment.scale,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AgentName, Item, ItemName, SolveQuality, Valuation};
    use rstest::rstest;

    fn table() -> ValuationTable {
        ValuationTable::try_new(
            vec![AgentName::new("Alice"), AgentName::new("Bob")],
            vec![
                Item::indivisible("House"),
                Item::divisible("Cash"),
                Item::indivisible("Car"),
            ],
            [
                Valuation::new("Alice", "House", Decimal::from(60)),
                Valuation::new("Alice", "Cash", Decimal::from(30)),
                Valuation::new("Alice", "Car", Decimal::from(10)),
                Valuation::new("Bob", "House", Decimal::from(20)),
                Valuation::new("Bob", "Cash", Decimal::from(30)),
                Valuation::new("Bob", "Car", Decimal::from(50)),
            ],
        )
        .expect("valid table")
    }

    fn assignment(owners: Vec<usize>, units: Vec<Vec<u32>>) -> ShareAssignment {
        ShareAssignment {
            scale: 100,
            indivisible_owners: owners,
            divisible_units: units,
            quality: SolveQuality::Optimal,
        }
    }

    #[test]
    fn maps_owners_and_fractions_to_names() {
        let allocation = AllocationExtractor
            .extract(&table(), &assignment(vec![0, 1], vec![vec![25], vec![75]]))
            .expect("valid assignment");

        let alice = allocation
            .for_agent(&AgentName::new("Alice"))
            .expect("alice present");
        assert_eq!(alice.indivisible, vec![ItemName::new("House")]);
        assert_eq!(
            alice.fraction_of(&ItemName::new("Cash")),
            Decimal::new(25, 2)
        );

        let bob = allocation
            .for_agent(&AgentName::new("Bob"))
            .expect("bob present");
        assert_eq!(bob.indivisible, vec![ItemName::new("Car")]);
        assert_eq!(bob.fraction_of(&ItemName::new("Cash")), Decimal::new(75, 2));
    }

    #[test]
    fn omits_zero_shares() {
        let allocation = AllocationExtractor
            .extract(&table(), &assignment(vec![1, 1], vec![vec![100], vec![0]]))
            .expect("valid assignment");

        let alice = &allocation.agents()[0];
        assert!(alice.indivisible.is_empty());
        assert_eq!(alice.divisible.len(), 1);
        assert_eq!(alice.divisible[0].fraction, Decimal::ONE);
        assert!(allocation.agents()[1].divisible.is_empty());
    }

    #[rstest]
    #[case::missing_owner(
        assignment(vec![0], vec![vec![50], vec![50]]),
        ExtractionError::IndivisibleCountMismatch { expected: 2, found: 1 }
    )]
    #[case::unknown_owner(
        assignment(vec![0, 2], vec![vec![50], vec![50]]),
        ExtractionError::UnknownOwner { item: 1, owner: 2 }
    )]
    #[case::missing_agent_row(
        assignment(vec![0, 1], vec![vec![100]]),
        ExtractionError::AgentCountMismatch { expected: 2, found: 1 }
    )]
    #[case::short_row(
        assignment(vec![0, 1], vec![vec![50], vec![]]),
        ExtractionError::DivisibleCountMismatch { agent: 1, expected: 1, found: 0 }
    )]
    #[case::under_allocated(
        assignment(vec![0, 1], vec![vec![40], vec![50]]),
        ExtractionError::IncompleteDivisibleItem { item: 0, total: 90, scale: 100 }
    )]
    #[case::over_allocated(
        assignment(vec![0, 1], vec![vec![60], vec![50]]),
        ExtractionError::IncompleteDivisibleItem { item: 0, total: 110, scale: 100 }
    )]
    fn rejects_inconsistent_assignments(
        #[case] assignment: ShareAssignment,
        #[case] expected: ExtractionError,
    ) {
        let result = AllocationExtractor.extract(&table(), &assignment);
        assert_eq!(result, Err(expected));
    }

    #[test]
    fn rejects_zero_scale() {
        let mut zero = assignment(vec![0, 1], vec![vec![0], vec![0]]);
        zero.scale = 0;
        assert_eq!(
            AllocationExtractor.extract(&table(), &zero),
            Err(ExtractionError::ZeroScale)
        );
    }
}

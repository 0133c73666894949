use fairshare_application::{
    AllocationError, AllocationResponse, AllocationService, RequestParser,
};
use fairshare_division::{DivisionOptions, TieBreak};
use fairshare_domain::{AgentName, ItemName, SolveQuality, ValuationTableError};
use fairshare_infrastructure::{JsonRequestParser, MaxMinAllocationSolver};
use rstest::rstest;
use rust_decimal::Decimal;

fn allocate(
    body: &str,
    options: DivisionOptions,
) -> Result<fairshare_application::AllocationOutcome, AllocationError> {
    let request = JsonRequestParser.parse(body).expect("well-formed request");
    let solver = MaxMinAllocationSolver::new(options);
    AllocationService::new(&solver).allocate(&request)
}

const DISJOINT: &str = r#"{
    "items": [{"name": "X", "is_divisible": false}, {"name": "Y", "is_divisible": false}],
    "agents": ["A", "B"],
    "valuations": [
        {"agent": "A", "item": "X", "value": 100},
        {"agent": "A", "item": "Y", "value": 0},
        {"agent": "B", "item": "X", "value": 0},
        {"agent": "B", "item": "Y", "value": 100}
    ]
}"#;

const MIRRORED: &str = r#"{
    "items": [
        {"name": "Piano", "is_divisible": false},
        {"name": "Car", "is_divisible": false},
        {"name": "Savings", "is_divisible": true}
    ],
    "people": ["A", "B"],
    "valuations": [
        {"person": "A", "item": "Piano", "value": 80},
        {"person": "A", "item": "Car", "value": 0},
        {"person": "A", "item": "Savings", "value": 20},
        {"person": "B", "item": "Piano", "value": 0},
        {"person": "B", "item": "Car", "value": 80},
        {"person": "B", "item": "Savings", "value": 20}
    ]
}"#;

const EQUAL_DIVISIBLE: &str = r#"{
    "items": [{"name": "Land", "is_divisible": true}, {"name": "Stock", "is_divisible": true}],
    "agents": ["A", "B"],
    "valuations": [
        {"agent": "A", "item": "Land", "value": 50},
        {"agent": "A", "item": "Stock", "value": 50},
        {"agent": "B", "item": "Land", "value": 50},
        {"agent": "B", "item": "Stock", "value": 50}
    ]
}"#;

#[test]
fn disjoint_preferences_give_everyone_their_favourite() {
    let outcome = allocate(DISJOINT, DivisionOptions::default()).expect("allocation");

    assert_eq!(
        outcome.allocation.owner_of(&ItemName::new("X")),
        Some(&AgentName::new("A"))
    );
    assert_eq!(
        outcome.allocation.owner_of(&ItemName::new("Y")),
        Some(&AgentName::new("B"))
    );
    assert_eq!(outcome.report.worst_satisfaction, Decimal::ONE_HUNDRED);
    assert_eq!(outcome.quality, SolveQuality::Optimal);
}

#[test]
fn mirrored_valuations_split_the_shared_item_evenly() {
    let outcome = allocate(MIRRORED, DivisionOptions::default()).expect("allocation");

    let a = outcome.allocation.for_agent(&AgentName::new("A")).expect("A");
    let b = outcome.allocation.for_agent(&AgentName::new("B")).expect("B");
    assert_eq!(a.indivisible, vec![ItemName::new("Piano")]);
    assert_eq!(b.indivisible, vec![ItemName::new("Car")]);
    assert_eq!(a.fraction_of(&ItemName::new("Savings")), Decimal::new(5, 1));
    assert_eq!(b.fraction_of(&ItemName::new("Savings")), Decimal::new(5, 1));
    assert_eq!(outcome.report.worst_satisfaction, Decimal::from(90));

    let response = AllocationResponse::from(&outcome);
    assert_eq!(response.worst_satisfaction, 90.0);
    assert_eq!(response.allocations["A"].divisible["Savings"], 0.5);
}

#[test]
fn equal_divisible_valuations_give_equal_satisfaction() {
    let outcome = allocate(EQUAL_DIVISIBLE, DivisionOptions::default()).expect("allocation");

    for satisfaction in &outcome.report.satisfactions {
        assert_eq!(satisfaction.percentage, Decimal::from(50));
    }
    assert_eq!(outcome.report.worst_satisfaction, Decimal::from(50));
}

#[test]
fn fewest_splits_leaves_each_divisible_item_whole() {
    let outcome = allocate(
        EQUAL_DIVISIBLE,
        DivisionOptions::default().with_tie_break(TieBreak::FewestSplits),
    )
    .expect("allocation");

    for holding in outcome.allocation.iter() {
        assert_eq!(holding.divisible.len(), 1);
        assert_eq!(holding.divisible[0].fraction, Decimal::ONE);
    }
    assert_eq!(outcome.report.worst_satisfaction, Decimal::from(50));
}

#[rstest]
#[case::scale_ten(10)]
#[case::scale_thousand(1000)]
fn worst_satisfaction_does_not_depend_on_scale(#[case] scale: u32) {
    let outcome =
        allocate(MIRRORED, DivisionOptions::default().with_scale(scale)).expect("allocation");
    assert_eq!(outcome.report.worst_satisfaction, Decimal::from(90));
}

#[test]
fn empty_input_fails_instead_of_returning_an_empty_allocation() {
    let result = allocate(
        r#"{"items": [], "agents": [], "valuations": []}"#,
        DivisionOptions::default(),
    );
    assert_eq!(
        result,
        Err(AllocationError::InvalidInput(ValuationTableError::NoAgents))
    );
}

#[test]
fn invalid_scale_is_a_configuration_error() {
    let result = allocate(DISJOINT, DivisionOptions::default().with_scale(0));
    assert!(matches!(
        result,
        Err(AllocationError::InvalidSolverConfiguration(_))
    ));
}

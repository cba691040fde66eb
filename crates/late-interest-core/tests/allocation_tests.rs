use std::collections::BTreeMap;

use chrono::NaiveDate;
use late_interest_core::allocation::AllocationCalculator;
use late_interest_core::model::{NewLpCalculation, Partner};
use late_interest_core::rounding::RoundingPolicy;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn collected(name: &str, close: u32, amount: Decimal) -> NewLpCalculation {
    NewLpCalculation {
        partner_name: name.into(),
        issue_date: d(2024, 1, 15),
        commitment: dec!(1000000),
        close_number: close,
        total_catch_up: Decimal::ZERO,
        total_late_interest_due: amount,
        breakdown: vec![],
    }
}

fn partners() -> Vec<Partner> {
    vec![
        Partner::new("Partner A", d(2022, 4, 1), dec!(1000000), 1),
        Partner::new("Partner B", d(2022, 4, 1), dec!(2000000), 1),
        Partner::new("Partner C", d(2022, 4, 1), dec!(500000), 1),
        Partner::new("Partner D", d(2023, 6, 1), dec!(1500000), 2),
        Partner::new("Partner E", d(2024, 1, 15), dec!(1000000), 3),
    ]
}

#[test]
fn test_shares_proportional_to_commitment() {
    let calc = AllocationCalculator::with_rounding(RoundingPolicy::default());
    let out = calc
        .allocate(&[collected("Partner E", 3, dec!(63845.21))], &partners(), 3)
        .unwrap();

    let amounts: Vec<Decimal> = out.allocations.iter().map(|a| a.total_allocation).collect();
    assert_eq!(
        amounts,
        vec![dec!(12769.04), dec!(25538.08), dec!(6384.52), dec!(19153.56)]
    );
    assert_eq!(out.total_allocated, dec!(63845.20));
    assert!((dec!(63845.21) - out.total_allocated).abs() < dec!(0.10));
}

#[test]
fn test_partners_at_or_after_close_excluded() {
    let calc = AllocationCalculator::with_rounding(RoundingPolicy::default());
    let out = calc
        .allocate(&[collected("Partner D", 2, dec!(49465.07))], &partners(), 2)
        .unwrap();
    let names: Vec<&str> = out
        .allocations
        .iter()
        .map(|a| a.partner_name.as_str())
        .collect();
    assert_eq!(names, vec!["Partner A", "Partner B", "Partner C"]);
    assert_eq!(out.total_allocated, dec!(49465.07));
}

#[test]
fn test_collections_from_other_closes_ignored() {
    let calc = AllocationCalculator::with_rounding(RoundingPolicy::default());
    let out = calc
        .allocate(
            &[
                collected("Partner D", 2, dec!(49465.07)),
                collected("Partner E", 3, dec!(63845.21)),
            ],
            &partners(),
            2,
        )
        .unwrap();
    assert_eq!(out.total_allocated, dec!(49465.07));
}

#[test]
fn test_increase_basis_overrides_commitment() {
    let calc = AllocationCalculator::with_rounding(RoundingPolicy::default());
    let mut increases = BTreeMap::new();
    increases.insert("Partner B".to_string(), dec!(500000));
    let out = calc
        .allocate_with_increases(
            &[collected("Partner D", 2, dec!(2000))],
            &partners(),
            &increases,
            2,
        )
        .unwrap();
    // bases 1.0M / 0.5M / 0.5M
    let amounts: Vec<Decimal> = out.allocations.iter().map(|a| a.total_allocation).collect();
    assert_eq!(amounts, vec![dec!(1000.00), dec!(500.00), dec!(500.00)]);
    assert_eq!(out.allocations[1].commitment, dec!(2000000));
}

#[test]
fn test_aggregate_sums_across_closes() {
    let calc = AllocationCalculator::with_rounding(RoundingPolicy::default());
    let close2 = calc
        .allocate(&[collected("Partner D", 2, dec!(49465.07))], &partners(), 2)
        .unwrap();
    let close3 = calc
        .allocate(&[collected("Partner E", 3, dec!(63845.21))], &partners(), 3)
        .unwrap();

    let mut by_close = BTreeMap::new();
    by_close.insert(2, close2.allocations);
    by_close.insert(3, close3.allocations);
    let combined = calc.aggregate(&by_close);

    assert_eq!(combined.len(), 4);
    assert_eq!(combined[0].partner_name, "Partner A");
    assert_eq!(combined[0].total_allocation, dec!(26901.92));
    assert_eq!(combined[3].partner_name, "Partner D");
    assert_eq!(combined[3].allocation_by_admitting_close.len(), 1);
}

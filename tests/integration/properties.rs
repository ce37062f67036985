//! Invariants that hold for every valid planner input.

use stagger::planner::search::{BisectionSearch, CapitalSearch, FixedGrowthSearch};
use stagger::planner::simulation::simulate;
use stagger::types::{PlanResult, PlannerInput};

fn inputs() -> Vec<PlannerInput> {
    let mut out = Vec::new();
    for step_count in [2, 3, 5, 10] {
        for initial_leg_percent in [0.0, 25.0, 40.0, 100.0] {
            for (final_price, required_shares) in [(1530.0, 500), (1470.0, 120), (1500.0, 5_000)] {
                out.push(PlannerInput {
                    initial_capital_guess: 80_000.0,
                    spot_price: 1500.0,
                    final_price,
                    step_count,
                    initial_leg_percent,
                    breakeven_price: 1535.0,
                    option_side_max_loss: 2500.0,
                    required_shares,
                    coverage_ratio: 0.70,
                    max_iterations: 60,
                });
            }
        }
    }
    out
}

fn check_result(input: &PlannerInput, result: &PlanResult) {
    assert!(result.iterations <= input.max_iterations);
    assert!(!result.steps.is_empty());
    assert!(result.steps.len() <= input.step_count as usize);

    let gap = input.step_gap();
    for (i, step) in result.steps.iter().enumerate() {
        assert_eq!(step.step_index as usize, i + 1);
        let expected = input.spot_price + i as f64 * gap;
        assert!((step.buy_price - expected).abs() < 1e-9);
        assert_eq!(step.capital_used, step.quantity as f64 * step.buy_price);
    }

    let summed: u64 = result.steps.iter().map(|s| s.quantity).sum();
    assert_eq!(result.total_shares_acquired, summed);

    if result.covered_early {
        assert!(result.total_shares_acquired >= input.required_shares);
        // the triggering step is the last one recorded
        let before_last: u64 = summed - result.steps.last().map_or(0, |s| s.quantity);
        assert!(before_last < input.required_shares);
    } else {
        assert_eq!(result.steps.len(), input.step_count as usize);
    }
}

#[test]
fn test_fixed_growth_invariants() {
    for input in inputs() {
        let result = FixedGrowthSearch::default().search(&input);
        check_result(&input, &result);
        assert!(result.final_capital >= 80_000);
    }
}

#[test]
fn test_bisection_invariants() {
    for input in inputs() {
        let result = BisectionSearch::new(10_000_000).search(&input);
        check_result(&input, &result);
    }
}

#[test]
fn test_capital_growth_is_monotone() {
    let search = FixedGrowthSearch::default();
    let mut capital = 1_000u64;
    for _ in 0..300 {
        let next = search.next_capital(capital);
        assert!(next >= capital);
        assert_eq!(next, (capital as f64 * 1.02).floor() as u64);
        capital = next;
    }
}

#[test]
fn test_simulation_never_reads_past_trigger() {
    let input = PlannerInput {
        initial_capital_guess: 0.0,
        spot_price: 100.0,
        final_price: 110.0,
        step_count: 10,
        initial_leg_percent: 50.0,
        breakeven_price: 120.0,
        option_side_max_loss: 1_000.0,
        required_shares: 60,
        coverage_ratio: 0.70,
        max_iterations: 10,
    };
    // 5000 first leg at 100 = 50 shares; 555 per later step -> 5 shares at 101.11
    let sim = simulate(&input, 10_000);
    assert!(sim.covered_early);
    assert_eq!(sim.steps.len(), 3);
    assert_eq!(sim.total_quantity, 60);
}

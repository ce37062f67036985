//! Reference scenarios for the staggered capital planner.

use stagger::config::AppConfig;
use stagger::hedge::HedgeRequest;
use stagger::planner::search::{CapitalSearch, FixedGrowthSearch};
use stagger::planner::{plan, PlannerSettings};
use stagger::spread::{build_planner_input, ExecutionSettings, SpreadPosition};
use stagger::types::{HedgeVerdict, PlannerInput};

fn scenario_input() -> PlannerInput {
    let (_, input) = build_planner_input(
        &SpreadPosition::default(),
        &ExecutionSettings::default(),
        &PlannerSettings::default(),
    )
    .unwrap();
    input
}

#[test]
fn test_scenario_a_step_ladder() {
    let input = scenario_input();
    assert_eq!(input.spot_price, 1500.0);
    assert_eq!(input.final_price, 1530.0);
    assert_eq!(input.step_gap(), 7.5);

    let result = plan(&input);
    let prices: Vec<f64> = result.steps.iter().map(|s| s.buy_price).collect();
    assert_eq!(prices, vec![1500.0, 1507.5, 1515.0, 1522.5, 1530.0]);

    let quantities: Vec<u64> = result.steps.iter().map(|s| s.quantity).collect();
    assert_eq!(quantities, vec![30, 11, 11, 11, 11]);
    assert_eq!(result.total_shares_acquired, 74);
    assert_eq!(result.final_capital, 111_469);
    assert_eq!(result.iterations, 3);
    assert_eq!(result.verdict, HedgeVerdict::MtmPositive);
    assert!(result.equity_profit_at_breakeven >= 0.70 * 2500.0);
}

#[test]
fn test_scenario_b_single_required_share() {
    let input = PlannerInput {
        required_shares: 1,
        ..scenario_input()
    };
    let result = plan(&input);

    assert!(result.covered_early);
    assert_eq!(result.verdict, HedgeVerdict::Covered);
    assert_eq!(result.iterations, 1);
    assert_eq!(result.steps.len(), 1);
    assert_eq!(result.steps[0].step_index, 1);
    assert_eq!(result.final_capital, 107_142);
}

#[test]
fn test_scenario_c_zero_option_loss() {
    let input = PlannerInput {
        initial_capital_guess: 100_000.0,
        option_side_max_loss: 0.0,
        ..scenario_input()
    };
    let result = plan(&input);

    assert!(!result.covered_early);
    assert_eq!(result.verdict, HedgeVerdict::MtmPositive);
    assert_eq!(result.iterations, 1);
    assert_eq!(result.steps.len(), 5);
    assert_eq!(result.final_capital, 100_000);
}

#[test]
fn test_scenario_c_via_spread_with_credit_above_width() {
    // credit 25 on a 10-wide spread: no option-side loss, no lump sum
    let request = HedgeRequest {
        position: SpreadPosition {
            sell_premium: 30.0,
            buy_premium: 5.0,
            ..Default::default()
        },
        ..Default::default()
    };
    let report = request.run().unwrap();

    assert_eq!(report.economics.option_side_max_loss, 0.0);
    assert_eq!(report.economics.lump_sum_capital, 0);
    assert_eq!(report.plan.iterations, 1);
    assert_eq!(report.plan.final_capital, 0);
    assert_eq!(report.plan.total_shares_acquired, 0);
    assert_eq!(report.plan.average_buy_price, 0.0);
    assert_eq!(report.plan.steps.len(), 5);
    assert_eq!(report.plan.verdict, HedgeVerdict::MtmPositive);
}

#[test]
fn test_scenario_d_unsatisfiable_exhausts_search() {
    // breakeven below every buy price: equity loses money at breakeven
    let input = PlannerInput {
        initial_capital_guess: 100_000.0,
        breakeven_price: 1400.0,
        required_shares: 10_000_000,
        ..scenario_input()
    };
    assert_eq!(input.max_iterations, 300);

    let search = FixedGrowthSearch::default();
    let result = search.search(&input);

    let mut expected = 100_000u64;
    for _ in 0..300 {
        expected = search.next_capital(expected);
    }

    assert_eq!(result.iterations, 300);
    assert!(!result.covered_early);
    assert_eq!(result.verdict, HedgeVerdict::Insufficient);
    assert_eq!(result.final_capital, expected);
    assert!(result.simulated_capital < result.final_capital);
    assert_eq!(result.steps.len(), 5);

    // floor per iteration keeps it at or just under the compounded value
    let compounded = 100_000.0 * 1.02f64.powi(300);
    assert!(result.final_capital as f64 <= compounded);
    assert!(result.final_capital as f64 > compounded * 0.99);
}

#[test]
fn test_breakeven_below_spot_rejected_before_planning() {
    let request = HedgeRequest {
        position: SpreadPosition {
            spot_price: 1550.0,
            ..Default::default()
        },
        ..Default::default()
    };
    assert!(request.run().is_err());
}

#[test]
fn test_shipped_config_matches_defaults() {
    let cfg = AppConfig::load("config.toml").unwrap();
    assert_eq!(cfg, AppConfig::default());
}

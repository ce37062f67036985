//! Step-wise purchase simulation at a single capital level.
//!
//! Pure and deterministic: given a validated [`PlannerInput`] and a capital
//! amount, lays out the staggered buy ladder and accumulates shares until
//! either every step is bought or the required share count is reached.

use crate::types::{PlannerInput, StepAllocation};

/// Nearest-integer rounding used wherever the planner rounds.
///
/// Ties resolve to the even neighbour (42.5 -> 42, 43.5 -> 44).
pub fn round_nearest(value: f64) -> f64 {
    value.round_ties_even()
}

/// Result of simulating one capital level.
#[derive(Debug, Clone, PartialEq)]
pub struct Simulation {
    pub capital: u64,
    pub steps: Vec<StepAllocation>,
    pub total_quantity: u64,
    pub total_cost: f64,
    /// `total_cost / total_quantity`, or 0 when no share was bought.
    pub average_buy_price: f64,
    pub equity_profit_at_breakeven: f64,
    /// Required share count reached; later steps were never simulated.
    pub covered_early: bool,
}

impl Simulation {
    /// Whether the equity profit at breakeven reaches `target`.
    pub fn meets_target(&self, target: f64) -> bool {
        self.equity_profit_at_breakeven >= target
    }

    /// Whether this capital level ends the search.
    pub fn is_sufficient(&self, target: f64) -> bool {
        self.covered_early || self.meets_target(target)
    }
}

/// Simulate the staggered purchase ladder at `capital`.
///
/// Step 0 spends the rounded initial leg; every later step gets an equal
/// floor share of the remainder. Quantities round to the nearest integer,
/// so the capital used per step can over- or undershoot its budget.
pub fn simulate(input: &PlannerInput, capital: u64) -> Simulation {
    let first_leg = round_nearest(capital as f64 * (input.initial_leg_percent / 100.0)) as u64;
    let remaining = capital.saturating_sub(first_leg);
    let later_budget = remaining / u64::from(input.step_count - 1);
    let gap = input.step_gap();

    let mut steps = Vec::with_capacity(input.step_count as usize);
    let mut total_quantity: u64 = 0;
    let mut total_cost = 0.0;
    let mut covered_early = false;

    for i in 0..input.step_count {
        let price = input.spot_price + f64::from(i) * gap;
        let budget = if i == 0 { first_leg } else { later_budget };
        let quantity = round_nearest(budget as f64 / price) as u64;
        let capital_used = quantity as f64 * price;

        total_quantity += quantity;
        total_cost += capital_used;

        steps.push(StepAllocation {
            step_index: i + 1,
            buy_price: price,
            quantity,
            capital_used,
        });

        if total_quantity >= input.required_shares {
            covered_early = true;
            break;
        }
    }

    let average_buy_price = if total_quantity > 0 {
        total_cost / total_quantity as f64
    } else {
        0.0
    };
    let equity_profit_at_breakeven =
        (input.breakeven_price - average_buy_price) * total_quantity as f64;

    Simulation {
        capital,
        steps,
        total_quantity,
        total_cost,
        average_buy_price,
        equity_profit_at_breakeven,
        covered_early,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

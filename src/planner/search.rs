//! Capital search strategies.
//!
//! A search decides which capital levels to simulate and when to stop.
//! [`FixedGrowthSearch`] is the default: escalate capital by a fixed
//! percentage until the hedge is adequate or the iteration bound is hit.
//! [`BisectionSearch`] binary-searches a bounded capital range instead.

use tracing::debug;

use super::simulation::{round_nearest, simulate, Simulation};
use crate::types::{HedgeVerdict, PlanResult, PlannerInput, DEFAULT_GROWTH_RATE};

/// Strategy for locating a sufficient capital level.
pub trait CapitalSearch: Send + Sync {
    /// Short identifier used in logs and reports.
    fn name(&self) -> &'static str;

    /// Run the search to completion. Always terminates within
    /// `input.max_iterations` simulations.
    fn search(&self, input: &PlannerInput) -> PlanResult;
}

/// Turn the deciding simulation into a [`PlanResult`].
fn finish(input: &PlannerInput, sim: Simulation, final_capital: u64, iterations: u32) -> PlanResult {
    let target_profit = input.target_profit();
    let verdict = if sim.covered_early {
        HedgeVerdict::Covered
    } else if sim.meets_target(target_profit) {
        HedgeVerdict::MtmPositive
    } else {
        HedgeVerdict::Insufficient
    };

    PlanResult {
        final_capital,
        simulated_capital: sim.capital,
        equity_profit_at_breakeven: sim.equity_profit_at_breakeven,
        average_buy_price: sim.average_buy_price,
        total_shares_acquired: sim.total_quantity,
        steps: sim.steps,
        covered_early: sim.covered_early,
        iterations,
        target_profit,
        verdict,
    }
}

fn starting_capital(input: &PlannerInput) -> u64 {
    round_nearest(input.initial_capital_guess).max(0.0) as u64
}

// ---------------------------------------------------------------------------
// Fixed growth
// ---------------------------------------------------------------------------

/// Escalate capital by `growth_rate` (floored) after every failed level.
#[derive(Debug, Clone)]
pub struct FixedGrowthSearch {
    growth_rate: f64,
}

impl Default for FixedGrowthSearch {
    fn default() -> Self {
        Self {
            growth_rate: DEFAULT_GROWTH_RATE,
        }
    }
}

impl FixedGrowthSearch {
    pub fn new(growth_rate: f64) -> Self {
        Self { growth_rate }
    }

    pub fn growth_rate(&self) -> f64 {
        self.growth_rate
    }

    /// Capital for the next iteration: `floor(capital × (1 + rate))`.
    ///
    /// Never below `capital`. Small amounts (under 50 at 2%) stay put.
    pub fn next_capital(&self, capital: u64) -> u64 {
        let grown = (capital as f64 * (1.0 + self.growth_rate)).floor() as u64;
        grown.max(capital)
    }
}

impl CapitalSearch for FixedGrowthSearch {
    fn name(&self) -> &'static str {
        "fixed_growth"
    }

    fn search(&self, input: &PlannerInput) -> PlanResult {
        let target = input.target_profit();
        let mut capital = starting_capital(input);
        let mut last: Option<Simulation> = None;

        for iteration in 1..=input.max_iterations {
            let sim = simulate(input, capital);

            if sim.is_sufficient(target) {
                return finish(input, sim, capital, iteration);
            }

            debug!(
                iteration,
                capital,
                shares = sim.total_quantity,
                mtm = format!("{:.2}", sim.equity_profit_at_breakeven),
                target = format!("{:.2}", target),
                "Capital level insufficient, escalating"
            );

            capital = self.next_capital(capital);
            last = Some(sim);
        }

        match last {
            Some(sim) => finish(input, sim, capital, input.max_iterations),
            // Zero iterations requested: report the starting level as-is.
            None => finish(input, simulate(input, capital), capital, 0),
        }
    }
}

// ---------------------------------------------------------------------------
// Bisection
// ---------------------------------------------------------------------------

/// Binary search for the lowest sufficient capital in
/// `[round(initial_capital_guess), ceiling]`.
///
/// Assumes sufficiency is monotone in capital, which holds up to the
/// quantity rounding at each step. Every simulation counts against
/// `max_iterations`.
#[derive(Debug, Clone)]
pub struct BisectionSearch {
    ceiling: u64,
}

impl BisectionSearch {
    pub fn new(ceiling: u64) -> Self {
        Self { ceiling }
    }

    pub fn ceiling(&self) -> u64 {
        self.ceiling
    }
}

impl CapitalSearch for BisectionSearch {
    fn name(&self) -> &'static str {
        "bisection"
    }

    fn search(&self, input: &PlannerInput) -> PlanResult {
        let target = input.target_profit();
        let mut lo = starting_capital(input);

        let floor_sim = simulate(input, lo);
        if floor_sim.is_sufficient(target) || input.max_iterations <= 1 {
            return finish(input, floor_sim, lo, 1);
        }

        let mut hi = self.ceiling.max(lo);
        let mut best = simulate(input, hi);
        let mut iterations: u32 = 2;
        if !best.is_sufficient(target) {
            debug!(ceiling = hi, "Capital ceiling insufficient");
            return finish(input, best, hi, iterations);
        }

        // lo is always insufficient, hi always sufficient
        while hi - lo > 1 && iterations < input.max_iterations {
            let mid = lo + (hi - lo) / 2;
            let sim = simulate(input, mid);
            iterations += 1;

            debug!(iteration = iterations, lo, hi, mid, sufficient = sim.is_sufficient(target), "Bisection probe");

            if sim.is_sufficient(target) {
                hi = mid;
                best = sim;
            } else {
                lo = mid;
            }
        }

        finish(input, best, hi, iterations)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

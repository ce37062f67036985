//! Call-spread economics and planner input validation.
//!
//! Turns a short/long call pair plus execution preferences into the
//! derived figures the planner needs (breakeven, option-side max loss,
//! required shares, lump-sum capital) and rejects configurations the
//! planner cannot handle.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::planner::PlannerSettings;
use crate::types::{PlannerInput, StaggerError, MAX_STEPS, MIN_STEPS};

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// A short call spread on an underlying, sized in option lots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpreadPosition {
    /// Current spot price of the underlying.
    pub spot_price: f64,
    /// Shares per option lot.
    pub lot_size: u64,
    /// Number of option lots executed.
    pub lots: u64,
    pub sell_strike: f64,
    pub sell_premium: f64,
    pub buy_strike: f64,
    pub buy_premium: f64,
}

impl Default for SpreadPosition {
    fn default() -> Self {
        Self {
            spot_price: 1500.0,
            lot_size: 500,
            lots: 1,
            sell_strike: 1530.0,
            sell_premium: 15.0,
            buy_strike: 1540.0,
            buy_premium: 10.0,
        }
    }
}

/// How the equity purchases are staggered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionSettings {
    /// Maximum number of buy steps.
    pub steps: u32,
    /// Percentage of capital deployed at the first step.
    pub initial_leg_pct: f64,
    /// MTM coverage required, as a percentage of the option max loss.
    pub coverage_pct: f64,
    /// Price of the last buy step. Defaults to the sell strike.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_price: Option<f64>,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            steps: 5,
            initial_leg_pct: 40.0,
            coverage_pct: 70.0,
            final_price: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Economics
// ---------------------------------------------------------------------------

/// Figures derived from a [`SpreadPosition`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadEconomics {
    /// `lot_size × lots`.
    pub required_shares: u64,
    /// `sell_premium − buy_premium`.
    pub net_credit: f64,
    pub spread_width: f64,
    pub max_loss_per_share: f64,
    /// Truncated to whole currency units.
    pub option_side_max_loss: f64,
    pub breakeven: f64,
    /// `(breakeven − spot) / spot`.
    pub distance_ratio: f64,
    /// Capital that would offset the max loss if bought in one go at spot.
    pub lump_sum_capital: u64,
}

impl SpreadPosition {
    pub fn required_shares(&self) -> u64 {
        self.lot_size.saturating_mul(self.lots)
    }

    pub fn net_credit(&self) -> f64 {
        self.sell_premium - self.buy_premium
    }

    pub fn breakeven(&self) -> f64 {
        self.sell_strike + self.net_credit()
    }

    /// Derive the spread's economics. Does not validate.
    pub fn economics(&self) -> SpreadEconomics {
        let required_shares = self.required_shares();
        let net_credit = self.net_credit();
        let spread_width = (self.sell_strike - self.buy_strike).abs();
        let max_loss_per_share = (spread_width - net_credit).max(0.0);
        let option_side_max_loss = (max_loss_per_share * required_shares as f64).trunc();
        let breakeven = self.breakeven();
        let distance_ratio = (breakeven - self.spot_price) / self.spot_price;

        let lump_sum_capital = if option_side_max_loss > 0.0 && distance_ratio > 0.0 {
            (option_side_max_loss / distance_ratio).trunc() as u64
        } else {
            0
        };

        SpreadEconomics {
            required_shares,
            net_credit,
            spread_width,
            max_loss_per_share,
            option_side_max_loss,
            breakeven,
            distance_ratio,
            lump_sum_capital,
        }
    }

    pub fn validate(&self) -> Result<(), StaggerError> {
        for (name, value) in [
            ("spot_price", self.spot_price),
            ("sell_strike", self.sell_strike),
            ("sell_premium", self.sell_premium),
            ("buy_strike", self.buy_strike),
            ("buy_premium", self.buy_premium),
        ] {
            if !value.is_finite() {
                return Err(StaggerError::NotFinite(name));
            }
        }
        if self.spot_price <= 0.0 {
            return Err(StaggerError::NonPositiveSpot(self.spot_price));
        }
        if self.lot_size == 0 {
            return Err(StaggerError::OutOfRange {
                field: "lot_size",
                value: 0.0,
                expected: ">= 1",
            });
        }
        if self.lots == 0 {
            return Err(StaggerError::OutOfRange {
                field: "lots",
                value: 0.0,
                expected: ">= 1",
            });
        }

        let breakeven = self.breakeven();
        if (breakeven - self.spot_price) / self.spot_price <= 0.0 {
            return Err(StaggerError::BreakevenNotAboveSpot {
                breakeven,
                spot: self.spot_price,
            });
        }
        Ok(())
    }
}

impl ExecutionSettings {
    /// Last buy price for `position`.
    pub fn final_price_for(&self, position: &SpreadPosition) -> f64 {
        self.final_price.unwrap_or(position.sell_strike)
    }

    pub fn validate(&self, position: &SpreadPosition) -> Result<(), StaggerError> {
        if !(MIN_STEPS..=MAX_STEPS).contains(&self.steps) {
            return Err(StaggerError::InvalidStepCount(self.steps));
        }
        if !self.initial_leg_pct.is_finite() {
            return Err(StaggerError::NotFinite("initial_leg_pct"));
        }
        if !(0.0..=100.0).contains(&self.initial_leg_pct) {
            return Err(StaggerError::OutOfRange {
                field: "initial_leg_pct",
                value: self.initial_leg_pct,
                expected: "0..=100",
            });
        }
        if !self.coverage_pct.is_finite() {
            return Err(StaggerError::NotFinite("coverage_pct"));
        }
        if self.coverage_pct <= 0.0 || self.coverage_pct > 100.0 {
            return Err(StaggerError::OutOfRange {
                field: "coverage_pct",
                value: self.coverage_pct,
                expected: "(0, 100]",
            });
        }

        let final_price = self.final_price_for(position);
        if !final_price.is_finite() {
            return Err(StaggerError::NotFinite("final_price"));
        }
        if final_price <= 0.0 {
            return Err(StaggerError::NonPositiveFinalPrice(final_price));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Input construction
// ---------------------------------------------------------------------------

/// Validate everything and assemble the planner input.
///
/// The lump-sum capital seeds the search; the ladder runs from spot to
/// the final price (the sell strike unless overridden).
pub fn build_planner_input(
    position: &SpreadPosition,
    execution: &ExecutionSettings,
    planner: &PlannerSettings,
) -> Result<(SpreadEconomics, PlannerInput), StaggerError> {
    position.validate()?;
    execution.validate(position)?;
    planner.validate()?;

    let economics = position.economics();
    let input = PlannerInput {
        initial_capital_guess: economics.lump_sum_capital as f64,
        spot_price: position.spot_price,
        final_price: execution.final_price_for(position),
        step_count: execution.steps,
        initial_leg_percent: execution.initial_leg_pct,
        breakeven_price: economics.breakeven,
        option_side_max_loss: economics.option_side_max_loss,
        required_shares: economics.required_shares,
        coverage_ratio: execution.coverage_pct / 100.0,
        max_iterations: planner.max_iterations,
    };

    debug!(
        required_shares = economics.required_shares,
        breakeven = economics.breakeven,
        max_loss = economics.option_side_max_loss,
        lump_sum = economics.lump_sum_capital,
        "Planner input built"
    );

    Ok((economics, input))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

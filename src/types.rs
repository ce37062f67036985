//! Shared types for the STAGGER planner.
//!
//! These types form the data contract between the input producers
//! (config, CLI, HTTP), the planner, and the result consumers
//! (text report, CSV export). They carry no behaviour beyond
//! small derived values so every module can depend on them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Capital growth applied between fixed-growth search iterations.
pub const DEFAULT_GROWTH_RATE: f64 = 0.02;

/// Default fraction of the option-side max loss the hedge must offset.
pub const DEFAULT_COVERAGE_RATIO: f64 = 0.70;

/// Default bound on the capital search loop.
pub const DEFAULT_MAX_ITERATIONS: u32 = 300;

/// Upper bound on the capital search loop accepted from config or requests.
pub const MAX_ITERATIONS_LIMIT: u32 = 1_000;

/// Accepted range for the number of buy steps.
pub const MIN_STEPS: u32 = 2;
pub const MAX_STEPS: u32 = 10;

/// Smallest fixed-growth rate accepted (0.1% per iteration).
pub const MIN_GROWTH_RATE: f64 = 0.001;

// ---------------------------------------------------------------------------
// Planner input
// ---------------------------------------------------------------------------

/// Validated parameters for one planner invocation.
///
/// Built by [`crate::spread::build_planner_input`]; the planner assumes
/// every field already satisfies its constraint and never re-checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerInput {
    /// Starting point of the capital search (currency units).
    pub initial_capital_guess: f64,
    /// Price of the first purchase step.
    pub spot_price: f64,
    /// Price of the last purchase step. May sit above or below spot.
    pub final_price: f64,
    /// Number of purchase steps (>= 2).
    pub step_count: u32,
    /// Percentage (0–100) of capital committed at step 0.
    pub initial_leg_percent: f64,
    /// Price at which the hedged P&L is evaluated.
    pub breakeven_price: f64,
    /// Worst-case loss of the option spread being hedged.
    pub option_side_max_loss: f64,
    /// Share count that fully covers the option position.
    pub required_shares: u64,
    /// Minimum fraction of `option_side_max_loss` the hedge must offset.
    pub coverage_ratio: f64,
    /// Bound on the capital search loop.
    pub max_iterations: u32,
}

impl PlannerInput {
    /// Linear price increment between consecutive purchase steps.
    pub fn step_gap(&self) -> f64 {
        (self.final_price - self.spot_price) / f64::from(self.step_count - 1)
    }

    /// Equity profit at breakeven needed for the hedge to count as adequate.
    pub fn target_profit(&self) -> f64 {
        self.coverage_ratio * self.option_side_max_loss
    }
}

// ---------------------------------------------------------------------------
// Plan output
// ---------------------------------------------------------------------------

/// One purchase step of a simulated plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepAllocation {
    /// 1-based position in the purchase sequence.
    pub step_index: u32,
    pub buy_price: f64,
    pub quantity: u64,
    /// `quantity × buy_price`: the capital actually consumed, which may
    /// differ from the step's budget because quantities are rounded.
    pub capital_used: f64,
}

/// Outcome class of a finished plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HedgeVerdict {
    /// Required share count reached before the final step.
    Covered,
    /// Equity profit at breakeven met the coverage target.
    MtmPositive,
    /// Search exhausted without meeting either condition.
    Insufficient,
}

impl HedgeVerdict {
    /// Whether the plan hedges the spread adequately.
    pub fn is_adequate(&self) -> bool {
        !matches!(self, HedgeVerdict::Insufficient)
    }
}

impl fmt::Display for HedgeVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HedgeVerdict::Covered => write!(f, "Position became COVERED before final step"),
            HedgeVerdict::MtmPositive => write!(f, "MTM Positive at Breakeven"),
            HedgeVerdict::Insufficient => write!(f, "Hedge insufficient"),
        }
    }
}

/// Finalized output of one capital search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResult {
    /// Capital level the search settled on. After an exhausted fixed-growth
    /// search this is the capital following the last growth step.
    pub final_capital: u64,
    /// Capital the returned step sequence was simulated with.
    pub simulated_capital: u64,
    pub equity_profit_at_breakeven: f64,
    pub average_buy_price: f64,
    pub total_shares_acquired: u64,
    pub steps: Vec<StepAllocation>,
    pub covered_early: bool,
    /// Number of simulations the search ran.
    pub iterations: u32,
    /// `coverage_ratio × option_side_max_loss` for the input searched.
    pub target_profit: f64,
    pub verdict: HedgeVerdict,
}

impl PlanResult {
    /// Sum of `capital_used` over the simulated steps.
    pub fn total_capital_used(&self) -> f64 {
        self.steps.iter().map(|s| s.capital_used).sum()
    }
}

impl fmt::Display for PlanResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "capital={} steps={} shares={} avg={:.2} mtm@be={:.0} target={:.0} [{}]",
            self.final_capital,
            self.steps.len(),
            self.total_shares_acquired,
            self.average_buy_price,
            self.equity_profit_at_breakeven,
            self.target_profit,
            self.verdict,
        )
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for STAGGER.
///
/// All variants are input-validation failures raised before the planner
/// runs; the planner itself is infallible.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StaggerError {
    #[error("Step count must be between 2 and 10, got {0}")]
    InvalidStepCount(u32),

    #[error("Spot price must be positive, got {0}")]
    NonPositiveSpot(f64),

    #[error("Final buy price must be positive, got {0}")]
    NonPositiveFinalPrice(f64),

    #[error("Breakeven must be above spot price (breakeven {breakeven:.2}, spot {spot:.2})")]
    BreakevenNotAboveSpot { breakeven: f64, spot: f64 },

    #[error("{field} out of range: {value} (expected {expected})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        expected: &'static str,
    },

    #[error("{0} must be a finite number")]
    NotFinite(&'static str),

    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

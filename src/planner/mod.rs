//! Staggered capital planner: inner ladder simulation plus outer
//! capital search.
//!
//! [`plan`] runs the default fixed-growth search. [`Planner`] wraps a
//! configurable [`CapitalSearch`] for callers that load the strategy
//! from config.

pub mod search;
pub mod simulation;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::{
    PlanResult, PlannerInput, StaggerError, DEFAULT_GROWTH_RATE, DEFAULT_MAX_ITERATIONS,
    MAX_ITERATIONS_LIMIT, MIN_GROWTH_RATE,
};
use search::{BisectionSearch, CapitalSearch, FixedGrowthSearch};

/// Run the default fixed-growth (2%) capital search.
pub fn plan(input: &PlannerInput) -> PlanResult {
    FixedGrowthSearch::default().search(input)
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Planner knobs loaded from the `[planner]` config table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerSettings {
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    #[serde(default)]
    pub search: SearchSettings,
}

fn default_max_iterations() -> u32 {
    DEFAULT_MAX_ITERATIONS
}

fn default_growth_rate() -> f64 {
    DEFAULT_GROWTH_RATE
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            search: SearchSettings::default(),
        }
    }
}

impl PlannerSettings {
    pub fn validate(&self) -> Result<(), StaggerError> {
        if self.max_iterations == 0 || self.max_iterations > MAX_ITERATIONS_LIMIT {
            return Err(StaggerError::OutOfRange {
                field: "max_iterations",
                value: f64::from(self.max_iterations),
                expected: "1..=1000",
            });
        }
        self.search.validate()
    }
}

/// Which capital search to run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum SearchSettings {
    FixedGrowth {
        #[serde(default = "default_growth_rate")]
        growth_rate: f64,
    },
    Bisection {
        capital_ceiling: u64,
    },
}

impl Default for SearchSettings {
    fn default() -> Self {
        SearchSettings::FixedGrowth {
            growth_rate: DEFAULT_GROWTH_RATE,
        }
    }
}

impl SearchSettings {
    pub fn validate(&self) -> Result<(), StaggerError> {
        match self {
            SearchSettings::FixedGrowth { growth_rate } => {
                if !growth_rate.is_finite() {
                    return Err(StaggerError::NotFinite("growth_rate"));
                }
                if *growth_rate < MIN_GROWTH_RATE {
                    return Err(StaggerError::OutOfRange {
                        field: "growth_rate",
                        value: *growth_rate,
                        expected: ">= 0.001",
                    });
                }
            }
            SearchSettings::Bisection { capital_ceiling } => {
                if *capital_ceiling == 0 {
                    return Err(StaggerError::OutOfRange {
                        field: "capital_ceiling",
                        value: 0.0,
                        expected: "> 0",
                    });
                }
            }
        }
        Ok(())
    }

    /// Build the configured search strategy.
    pub fn build(&self) -> Box<dyn CapitalSearch> {
        match self {
            SearchSettings::FixedGrowth { growth_rate } => {
                Box::new(FixedGrowthSearch::new(*growth_rate))
            }
            SearchSettings::Bisection { capital_ceiling } => {
                Box::new(BisectionSearch::new(*capital_ceiling))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Planner
// ---------------------------------------------------------------------------

/// Stateless planner bound to one search strategy.
///
/// Holds no per-run state; one instance can serve any number of
/// independent invocations.
pub struct Planner {
    search: Box<dyn CapitalSearch>,
}

impl Default for Planner {
    fn default() -> Self {
        Self::new(Box::new(FixedGrowthSearch::default()))
    }
}

impl Planner {
    pub fn new(search: Box<dyn CapitalSearch>) -> Self {
        Self { search }
    }

    pub fn from_settings(settings: &SearchSettings) -> Self {
        Self::new(settings.build())
    }

    /// Name of the configured search strategy.
    pub fn strategy(&self) -> &'static str {
        self.search.name()
    }

    /// Run the configured search for `input`.
    pub fn plan(&self, input: &PlannerInput) -> PlanResult {
        let result = self.search.search(input);

        info!(
            strategy = self.search.name(),
            capital = result.final_capital,
            iterations = result.iterations,
            steps = result.steps.len(),
            shares = result.total_shares_acquired,
            avg_price = format!("{:.2}", result.average_buy_price),
            mtm_at_be = format!("{:.2}", result.equity_profit_at_breakeven),
            verdict = ?result.verdict,
            "Plan complete"
        );

        result
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

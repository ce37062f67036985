//! Hedge pipeline: spread economics → planner input → capital search.
//!
//! This is the single entry point the CLI and the HTTP surface share.
//! Each call is independent; nothing is cached between requests.

use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::planner::{Planner, PlannerSettings};
use crate::spread::{build_planner_input, ExecutionSettings, SpreadEconomics, SpreadPosition};
use crate::types::{PlanResult, PlannerInput, StaggerError};

/// Everything needed to plan one hedge.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HedgeRequest {
    #[serde(default)]
    pub position: SpreadPosition,
    #[serde(default)]
    pub execution: ExecutionSettings,
    #[serde(default)]
    pub planner: PlannerSettings,
}

impl From<&AppConfig> for HedgeRequest {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            position: cfg.position.clone(),
            execution: cfg.execution.clone(),
            planner: cfg.planner.clone(),
        }
    }
}

/// A finished plan together with the inputs that produced it.
///
/// Renderers and exporters read `economics` and `plan` verbatim and
/// never re-derive averages or profits themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HedgeReport {
    pub request: HedgeRequest,
    pub economics: SpreadEconomics,
    pub input: PlannerInput,
    /// Search strategy that produced `plan`.
    pub strategy: String,
    pub plan: PlanResult,
}

impl HedgeRequest {
    /// Validate, build the planner input, and run the configured search.
    pub fn run(&self) -> Result<HedgeReport, StaggerError> {
        let (economics, input) =
            build_planner_input(&self.position, &self.execution, &self.planner)?;

        let planner = Planner::from_settings(&self.planner.search);
        let plan = planner.plan(&input);

        Ok(HedgeReport {
            request: self.clone(),
            economics,
            input,
            strategy: planner.strategy().to_string(),
            plan,
        })
    }
}

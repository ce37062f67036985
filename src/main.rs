//! STAGGER: staggered equity hedge planner.
//!
//! Entry point. Loads configuration, initialises structured logging,
//! applies command-line overrides, and either prints a single plan or
//! serves the planner over HTTP.

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use stagger::config::AppConfig;
use stagger::dashboard::{self, routes::ServerState};
use stagger::hedge::HedgeRequest;
use stagger::planner::SearchSettings;
use stagger::report::{export, render_text};
use stagger::types::{HedgeVerdict, DEFAULT_GROWTH_RATE};

#[derive(Parser)]
#[command(name = "stagger")]
#[command(about = "Staggered equity hedge planner for short call spreads", long_about = None)]
struct Cli {
    /// Config file path (built-in defaults are used if it does not exist)
    #[arg(short, long, global = true, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a staggered buy plan and print it
    Plan(PlanArgs),
    /// Serve the planner as a JSON API
    Serve {
        /// Listen port (overrides [server].port)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SearchKind {
    FixedGrowth,
    Bisection,
}

#[derive(Args)]
struct PlanArgs {
    /// Current spot price
    #[arg(long)]
    spot: Option<f64>,
    /// Shares per option lot
    #[arg(long)]
    lot_size: Option<u64>,
    /// Number of option lots executed
    #[arg(long)]
    lots: Option<u64>,
    #[arg(long)]
    sell_strike: Option<f64>,
    #[arg(long)]
    sell_premium: Option<f64>,
    #[arg(long)]
    buy_strike: Option<f64>,
    #[arg(long)]
    buy_premium: Option<f64>,
    /// Maximum buy steps
    #[arg(long)]
    steps: Option<u32>,
    /// Initial leg percentage (0-100)
    #[arg(long)]
    initial_leg_pct: Option<f64>,
    /// MTM coverage required, percent of max option loss
    #[arg(long)]
    coverage_pct: Option<f64>,
    /// Last buy price (defaults to the sell strike)
    #[arg(long)]
    final_price: Option<f64>,
    #[arg(long)]
    max_iterations: Option<u32>,
    /// Capital search strategy
    #[arg(long, value_enum)]
    search: Option<SearchKind>,
    /// Capital growth per fixed-growth iteration (0.02 = 2%)
    #[arg(long)]
    growth_rate: Option<f64>,
    /// Upper capital bound for bisection search
    #[arg(long)]
    capital_ceiling: Option<u64>,
    /// Print the report as JSON instead of a table
    #[arg(long)]
    json: bool,
    /// Also write the plan as CSV to this path
    #[arg(long)]
    export: Option<PathBuf>,
}

impl PlanArgs {
    /// Layer command-line overrides on top of the configured request.
    fn apply(&self, request: &mut HedgeRequest) -> Result<()> {
        let position = &mut request.position;
        if let Some(v) = self.spot {
            position.spot_price = v;
        }
        if let Some(v) = self.lot_size {
            position.lot_size = v;
        }
        if let Some(v) = self.lots {
            position.lots = v;
        }
        if let Some(v) = self.sell_strike {
            position.sell_strike = v;
        }
        if let Some(v) = self.sell_premium {
            position.sell_premium = v;
        }
        if let Some(v) = self.buy_strike {
            position.buy_strike = v;
        }
        if let Some(v) = self.buy_premium {
            position.buy_premium = v;
        }

        let execution = &mut request.execution;
        if let Some(v) = self.steps {
            execution.steps = v;
        }
        if let Some(v) = self.initial_leg_pct {
            execution.initial_leg_pct = v;
        }
        if let Some(v) = self.coverage_pct {
            execution.coverage_pct = v;
        }
        if self.final_price.is_some() {
            execution.final_price = self.final_price;
        }

        if let Some(v) = self.max_iterations {
            request.planner.max_iterations = v;
        }

        let search = &mut request.planner.search;
        match self.search {
            Some(SearchKind::FixedGrowth) => {
                *search = SearchSettings::FixedGrowth {
                    growth_rate: self.growth_rate.unwrap_or(DEFAULT_GROWTH_RATE),
                };
            }
            Some(SearchKind::Bisection) => {
                let ceiling = match (self.capital_ceiling, &*search) {
                    (Some(c), _) => c,
                    (None, SearchSettings::Bisection { capital_ceiling }) => *capital_ceiling,
                    (None, _) => bail!("--capital-ceiling is required for bisection search"),
                };
                *search = SearchSettings::Bisection {
                    capital_ceiling: ceiling,
                };
            }
            None => match search {
                SearchSettings::FixedGrowth { growth_rate } => {
                    if let Some(v) = self.growth_rate {
                        *growth_rate = v;
                    }
                }
                SearchSettings::Bisection { capital_ceiling } => {
                    if let Some(v) = self.capital_ceiling {
                        *capital_ceiling = v;
                    }
                }
            },
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cli = Cli::parse();
    init_logging();

    let cfg = AppConfig::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Plan(args) => run_plan(&cfg, &args),
        Commands::Serve { port } => {
            let port = port.unwrap_or(cfg.server.port);
            let state = Arc::new(ServerState::new(cfg));
            dashboard::serve(state, port).await
        }
    }
}

/// Plan once with config + overrides, print, optionally export.
fn run_plan(cfg: &AppConfig, args: &PlanArgs) -> Result<()> {
    let mut request = HedgeRequest::from(cfg);
    args.apply(&mut request)?;

    let report = request.run()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_text(&report));
    }

    if let Some(path) = &args.export {
        export::write_csv(&report, path)?;
    }

    match report.plan.verdict {
        HedgeVerdict::Insufficient => warn!(
            iterations = report.plan.iterations,
            capital = report.plan.final_capital,
            "Hedge insufficient: coverage target not reached"
        ),
        verdict => info!(?verdict, capital = report.plan.final_capital, "Hedge adequate"),
    }

    Ok(())
}

/// Initialise the `tracing` subscriber. Logs go to stderr so `--json`
/// output on stdout stays machine-readable.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("stagger=info"));

    let json_logging = std::env::var("STAGGER_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn plan_args(extra: &[&str]) -> PlanArgs {
        let argv = ["stagger", "plan"].iter().chain(extra.iter()).copied();
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Plan(args) => args,
            Commands::Serve { .. } => panic!("expected plan subcommand"),
        }
    }

    #[test]
    fn test_no_overrides_keeps_config() {
        let mut request = HedgeRequest::default();
        plan_args(&[]).apply(&mut request).unwrap();
        assert_eq!(request, HedgeRequest::default());
    }

    #[test]
    fn test_position_and_execution_overrides() {
        let mut request = HedgeRequest::default();
        plan_args(&[
            "--spot", "1480", "--lots", "2", "--steps", "7",
            "--initial-leg-pct", "25", "--final-price", "1525", "--max-iterations", "50",
        ])
        .apply(&mut request)
        .unwrap();

        assert_eq!(request.position.spot_price, 1480.0);
        assert_eq!(request.position.lots, 2);
        assert_eq!(request.position.sell_strike, 1530.0);
        assert_eq!(request.execution.steps, 7);
        assert_eq!(request.execution.initial_leg_pct, 25.0);
        assert_eq!(request.execution.final_price, Some(1525.0));
        assert_eq!(request.planner.max_iterations, 50);
    }

    #[test]
    fn test_growth_rate_override_on_configured_search() {
        let mut request = HedgeRequest::default();
        plan_args(&["--growth-rate", "0.05"]).apply(&mut request).unwrap();
        assert_eq!(
            request.planner.search,
            SearchSettings::FixedGrowth { growth_rate: 0.05 }
        );
    }

    #[test]
    fn test_bisection_requires_ceiling() {
        let mut request = HedgeRequest::default();
        let err = plan_args(&["--search", "bisection"])
            .apply(&mut request)
            .unwrap_err();
        assert!(err.to_string().contains("--capital-ceiling"));

        plan_args(&["--search", "bisection", "--capital-ceiling", "500000"])
            .apply(&mut request)
            .unwrap();
        assert_eq!(
            request.planner.search,
            SearchSettings::Bisection { capital_ceiling: 500_000 }
        );
    }

    #[test]
    fn test_bisection_keeps_configured_ceiling() {
        let mut request = HedgeRequest::default();
        request.planner.search = SearchSettings::Bisection { capital_ceiling: 250_000 };
        plan_args(&["--search", "bisection"]).apply(&mut request).unwrap();
        assert_eq!(
            request.planner.search,
            SearchSettings::Bisection { capital_ceiling: 250_000 }
        );
    }

    #[test]
    fn test_switch_to_fixed_growth_uses_default_rate() {
        let mut request = HedgeRequest::default();
        request.planner.search = SearchSettings::Bisection { capital_ceiling: 250_000 };
        plan_args(&["--search", "fixed-growth"]).apply(&mut request).unwrap();
        assert_eq!(
            request.planner.search,
            SearchSettings::FixedGrowth { growth_rate: DEFAULT_GROWTH_RATE }
        );
    }
}

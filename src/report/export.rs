//! CSV export of a finished plan.
//!
//! Layout (flexible record lengths):
//! - `section,field,value` rows for parameters, metrics and summary
//! - a `Step,Buy Price,Quantity,Capital Used` table with one row per step

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use csv::{Terminator, WriterBuilder};
use std::path::Path;
use tracing::info;

use crate::hedge::HedgeReport;

/// Serialize `report` to CSV bytes, stamped with the current time.
pub fn export_csv(report: &HedgeReport) -> Result<Vec<u8>> {
    export_csv_at(report, Utc::now())
}

/// Serialize `report` to CSV bytes with an explicit timestamp.
pub fn export_csv_at(report: &HedgeReport, generated_at: DateTime<Utc>) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .flexible(true)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    let position = &report.request.position;
    let execution = &report.request.execution;
    let econ = &report.economics;
    let plan = &report.plan;

    writer.write_record(["section", "field", "value"])?;
    writer.write_record(["meta", "generated_at", generated_at.to_rfc3339().as_str()])?;
    writer.write_record(["meta", "strategy", report.strategy.as_str()])?;

    let parameters: [(&str, String); 13] = [
        ("spot_price", position.spot_price.to_string()),
        ("lot_size", position.lot_size.to_string()),
        ("lots", position.lots.to_string()),
        ("sell_strike", position.sell_strike.to_string()),
        ("sell_premium", position.sell_premium.to_string()),
        ("buy_strike", position.buy_strike.to_string()),
        ("buy_premium", position.buy_premium.to_string()),
        ("steps", execution.steps.to_string()),
        ("initial_leg_pct", execution.initial_leg_pct.to_string()),
        ("coverage_pct", execution.coverage_pct.to_string()),
        ("final_price", report.input.final_price.to_string()),
        ("max_iterations", report.input.max_iterations.to_string()),
        ("initial_capital_guess", report.input.initial_capital_guess.to_string()),
    ];
    for (field, value) in &parameters {
        writer.write_record(["parameters", *field, value.as_str()])?;
    }

    let metrics: [(&str, String); 6] = [
        ("required_shares", econ.required_shares.to_string()),
        ("net_credit", econ.net_credit.to_string()),
        ("breakeven", format!("{:.2}", econ.breakeven)),
        ("option_side_max_loss", econ.option_side_max_loss.to_string()),
        ("lump_sum_capital", econ.lump_sum_capital.to_string()),
        ("staggered_capital", plan.final_capital.to_string()),
    ];
    for (field, value) in &metrics {
        writer.write_record(["metrics", *field, value.as_str()])?;
    }

    let summary: [(&str, String); 8] = [
        ("average_buy_price", format!("{:.2}", plan.average_buy_price)),
        ("total_shares", plan.total_shares_acquired.to_string()),
        ("equity_mtm_at_breakeven", format!("{:.2}", plan.equity_profit_at_breakeven)),
        ("target_mtm", format!("{:.2}", plan.target_profit)),
        ("covered_early", plan.covered_early.to_string()),
        ("iterations", plan.iterations.to_string()),
        ("simulated_capital", plan.simulated_capital.to_string()),
        ("verdict", plan.verdict.to_string()),
    ];
    for (field, value) in &summary {
        writer.write_record(["summary", *field, value.as_str()])?;
    }

    writer.write_record(["Step", "Buy Price", "Quantity", "Capital Used"])?;
    for step in &plan.steps {
        writer.write_record(&[
            step.step_index.to_string(),
            format!("{:.2}", step.buy_price),
            step.quantity.to_string(),
            format!("{:.2}", step.capital_used),
        ])?;
    }

    writer.flush()?;
    writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to finish CSV export: {}", e.error()))
}

/// Write the CSV export to `path`.
pub fn write_csv(report: &HedgeReport, path: &Path) -> Result<()> {
    let bytes = export_csv(report)?;
    std::fs::write(path, &bytes)
        .with_context(|| format!("Failed to write CSV export to {}", path.display()))?;

    info!(path = %path.display(), bytes = bytes.len(), "Plan exported");
    Ok(())
}

//! Plan rendering and spreadsheet export.
//!
//! Consumers of a [`HedgeReport`]: a plain-text report for the terminal
//! and a CSV byte stream for spreadsheets. Both print the planner's
//! figures as-is.

pub mod export;

use std::fmt::Write as _;

use crate::hedge::HedgeReport;

/// Currency symbol prefixed to money amounts.
pub const CURRENCY: &str = "₹";

/// Format `value` with `decimals` places and comma thousands separators.
pub fn format_money(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Render the full terminal report: metrics, buy plan, validation.
pub fn render_text(report: &HedgeReport) -> String {
    let econ = &report.economics;
    let plan = &report.plan;
    let mut out = String::new();

    // writing into a String cannot fail
    let _ = writeln!(out, "Option & Capital Metrics");
    let _ = writeln!(out, "  {:<22}{}", "Required Shares", econ.required_shares);
    let _ = writeln!(out, "  {:<22}{:.2}", "Breakeven Price", econ.breakeven);
    let _ = writeln!(out, "  {:<22}{CURRENCY}{}", "Max Option Loss", format_money(econ.option_side_max_loss, 0));
    let _ = writeln!(out, "  {:<22}{CURRENCY}{}", "Capital (Lump Sum)", format_money(econ.lump_sum_capital as f64, 0));
    let _ = writeln!(out, "  {:<22}{CURRENCY}{}", "Capital (Staggered)", format_money(plan.final_capital as f64, 0));
    let _ = writeln!(out);

    let _ = writeln!(out, "STAGGERED BUY PLAN ({} search, {} iterations)", report.strategy, plan.iterations);
    let _ = writeln!(out, "  {:>4}  {:>14}  {:>10}  {:>16}", "Step", "Buy Price", "Quantity", "Capital Used");
    for step in &plan.steps {
        let _ = writeln!(
            out,
            "  {:>4}  {:>14}  {:>10}  {:>16}",
            step.step_index,
            format!("{CURRENCY}{}", format_money(step.buy_price, 2)),
            step.quantity,
            format!("{CURRENCY}{}", format_money(step.capital_used, 0)),
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Final Validation");
    let _ = writeln!(out, "  {:<22}{CURRENCY}{:.2}", "Avg Buy Price", plan.average_buy_price);
    let _ = writeln!(out, "  {:<22}{}", "Total Shares", plan.total_shares_acquired);
    let _ = writeln!(out, "  {:<22}{CURRENCY}{}", "Equity MTM @ BE", format_money(plan.equity_profit_at_breakeven, 0));
    let _ = writeln!(out, "  {:<22}{CURRENCY}{}", "MTM Target", format_money(plan.target_profit, 0));
    let _ = writeln!(out);
    let _ = writeln!(out, "Status: {}", plan.verdict);

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hedge::HedgeRequest;

    #[test]
    fn test_format_money_grouping() {
        assert_eq!(format_money(0.0, 0), "0");
        assert_eq!(format_money(999.0, 0), "999");
        assert_eq!(format_money(1000.0, 0), "1,000");
        assert_eq!(format_money(1507.5, 2), "1,507.50");
        assert_eq!(format_money(111_469.0, 0), "111,469");
        assert_eq!(format_money(1_234_567.891, 2), "1,234,567.89");
    }

    #[test]
    fn test_format_money_negative() {
        assert_eq!(format_money(-2500.0, 0), "-2,500");
        assert_eq!(format_money(-0.001, 2), "0.00");
    }

    #[test]
    fn test_render_default_report() {
        let report = HedgeRequest::default().run().unwrap();
        let text = render_text(&report);

        assert!(text.contains("Required Shares       500"));
        assert!(text.contains("Breakeven Price       1535.00"));
        assert!(text.contains("₹107,142"));
        assert!(text.contains("₹111,469"));
        assert!(text.contains("₹1,507.50"));
        assert!(text.contains("₹45,000"));
        assert!(text.contains("Equity MTM @ BE       ₹1,765\n"));
        assert!(text.ends_with("Status: MTM Positive at Breakeven\n"));
    }

    #[test]
    fn test_render_lists_every_step() {
        let report = HedgeRequest::default().run().unwrap();
        let text = render_text(&report);
        let rows = text
            .lines()
            .filter(|l| l.trim_start().starts_with(|c: char| c.is_ascii_digit()))
            .count();
        assert_eq!(rows, report.plan.steps.len());
    }
}

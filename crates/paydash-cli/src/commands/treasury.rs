use paydash_core::dashboard::{TreasuryPage, TreasurySummary};
use paydash_core::models::TreasuryPosition;
use serde::Serialize;

use crate::commands::common::{format_position_lines, Context};
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct TreasuryOutput<'a> {
    positions: &'a [TreasuryPosition],
    total_value: Option<f64>,
    average_apy: String,
    locked_amount: Option<f64>,
    required_amount: Option<f64>,
    deficit: Option<f64>,
}

pub async fn run_treasury(as_json: bool, context: Context) -> Result<(), CliError> {
    context.require_session()?;
    let page = TreasuryPage::new(context.guard, context.api);
    page.refresh().await?;

    let positions = page.positions().items();
    let summary = page.summary();
    if as_json {
        let output = TreasuryOutput {
            positions: &positions,
            total_value: summary.total_value,
            average_apy: summary.average_apy_display(),
            locked_amount: summary.bus_lock.as_ref().map(|lock| lock.locked_amount),
            required_amount: summary.bus_lock.as_ref().map(|lock| lock.required_amount),
            deficit: summary.bus_lock.as_ref().map(|lock| lock.deficit()),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    for line in format_summary_lines(&summary) {
        println!("{line}");
    }
    println!();
    if positions.is_empty() {
        println!("No treasury positions.");
    } else {
        for line in format_position_lines(&positions) {
            println!("{line}");
        }
    }
    Ok(())
}

pub fn format_summary_lines(summary: &TreasurySummary) -> Vec<String> {
    let mut lines = vec![
        format!(
            "Total value:  {}",
            summary
                .total_value
                .map_or_else(|| "-".to_string(), |value| format!("{value:.2}"))
        ),
        format!(
            "Average APY:  {} across {} position(s)",
            summary.average_apy_display(),
            summary.position_count
        ),
    ];
    if let Some(lock) = summary.bus_lock.as_ref() {
        lines.push(format!(
            "Bus lock:     {:.2} locked / {:.2} required, deficit {:.2}",
            lock.locked_amount,
            lock.required_amount,
            lock.deficit()
        ));
    }
    lines
}

//! Extract command - read the pay elements of a single payslip.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

use busta_core::models::config::PayrollConfig;
use busta_core::payslip::rules::format_amount;
use busta_core::payslip::{ExtractionResult, RulePayslipParser};
use busta_core::{extract_document, PayslipRecord};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Payslip PDF
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Skip OCR and use only the embedded PDF text
    #[arg(long)]
    text_only: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output, one element per row
    Csv,
    /// Plain text summary
    Text,
}

/// Serialized view of one extracted payslip.
#[derive(Serialize)]
struct PayslipReport {
    file: String,
    period: String,
    year: i32,
    month: u32,
    /// Tracked elements in ledger order, derivates included.
    tracked: Vec<(String, Decimal)>,
    /// Every scanned code and summary figure found.
    elements: BTreeMap<String, Decimal>,
    period_source: String,
    warnings: Vec<String>,
    matched_lines: usize,
    processing_time_ms: u64,
}

impl PayslipReport {
    fn new(input: &std::path::Path, result: ExtractionResult, config: &PayrollConfig) -> Self {
        let mut record: PayslipRecord = result.record;
        let elements: BTreeMap<String, Decimal> = record
            .elements()
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();

        record.compute_derivates(&config.profile, &config.tickets);
        let period = record.period();

        Self {
            file: input.display().to_string(),
            period: period.to_string(),
            year: period.year,
            month: period.month_number(),
            tracked: record.tracked_values(&config.profile),
            elements,
            period_source: result.period_source,
            warnings: result.warnings,
            matched_lines: result.matched_lines,
            processing_time_ms: result.processing_time_ms,
        }
    }
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.set_message(format!("Reading {}", args.input.display()));

    let source = super::text_source(&config, args.text_only);
    let parser = RulePayslipParser::new(&config)?;

    let input = args.input.clone();
    let result = tokio::task::spawn_blocking(move || {
        extract_document(&input, source.as_ref(), &parser)
    })
    .await??;

    pb.finish_and_clear();

    let report = PayslipReport::new(&args.input, result, &config);
    let output = format_report(&report, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    for warning in &report.warnings {
        eprintln!("{} {}", style("!").yellow(), warning);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn format_report(report: &PayslipReport, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Csv => format_csv(report),
        OutputFormat::Text => Ok(format_text(report)),
    }
}

fn format_csv(report: &PayslipReport) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["year", "month", "element", "value"])?;

    let year = report.year.to_string();
    let month = report.month.to_string();
    for (name, value) in &report.tracked {
        wtr.write_record([&year, &month, name, &value.to_string()])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(report: &PayslipReport) -> String {
    let mut output = String::new();

    output.push_str(&format!("Payslip: {}\n", report.period));
    output.push_str(&format!("File: {}\n", report.file));
    output.push('\n');

    output.push_str("Ledger elements:\n");
    for (name, value) in &report.tracked {
        output.push_str(&format!("  {:<12} {:>12}\n", name, format_amount(*value)));
    }

    let untracked: Vec<_> = report
        .elements
        .iter()
        .filter(|(name, _)| !report.tracked.iter().any(|(t, _)| t == *name))
        .collect();
    if !untracked.is_empty() {
        output.push('\n');
        output.push_str("Other codes:\n");
        for (name, value) in untracked {
            output.push_str(&format!("  {:<12} {:>12}\n", name, format_amount(*value)));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn report() -> PayslipReport {
        PayslipReport {
            file: "ottobre.pdf".to_string(),
            period: "October 2023".to_string(),
            year: 2023,
            month: 10,
            tracked: vec![
                ("attendances".to_string(), dec!(18.00)),
                ("tickets".to_string(), dec!(210.00)),
            ],
            elements: BTreeMap::from([
                ("0293".to_string(), dec!(20)),
                ("0998".to_string(), dec!(1.50)),
            ]),
            period_source: "Ottobre 2023".to_string(),
            warnings: vec![],
            matched_lines: 2,
            processing_time_ms: 1,
        }
    }

    #[test]
    fn test_csv_rows_follow_ledger_order() {
        let csv = format_csv(&report()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "year,month,element,value");
        assert_eq!(lines[1], "2023,10,attendances,18.00");
        assert_eq!(lines[2], "2023,10,tickets,210.00");
    }

    #[test]
    fn test_text_lists_untracked_codes() {
        let text = format_text(&report());
        assert!(text.starts_with("Payslip: October 2023"));
        assert!(text.contains("210,00"));
        assert!(text.contains("Other codes:"));
        assert!(text.contains("0998"));
    }
}

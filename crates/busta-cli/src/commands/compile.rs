//! Compile command - extract every payslip under a directory into the ledger.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use busta_core::batch::{BatchReport, FailedDocument};
use busta_core::ledger::Grid;
use busta_core::payslip::RulePayslipParser;
use busta_core::{discover, extract_document};

/// Arguments for the compile command.
#[derive(Args)]
pub struct CompileArgs {
    /// Existing ledger (.csv, .xlsx, .xls or .ods)
    #[arg(required = true)]
    ledger: PathBuf,

    /// Directory searched for payslips
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Glob pattern, relative to the root
    #[arg(short, long, default_value = "**/*.pdf")]
    pattern: String,

    /// Output ledger (default: <ledger>_compiled.csv next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Also write a per-document summary CSV
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Skip OCR and use only the embedded PDF text
    #[arg(long)]
    text_only: bool,
}

pub async fn run(args: CompileArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    if !args.ledger.exists() {
        anyhow::bail!("Ledger not found: {}", args.ledger.display());
    }
    let mut grid = Grid::load(&args.ledger)?;

    let files: Vec<PathBuf> = discover(&args.root, &args.pattern)?.collect();

    println!(
        "{} Found {} payslips under {}",
        style("ℹ").blue(),
        files.len(),
        args.root.display()
    );

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} payslips")?
            .progress_chars("=>-"),
    );

    let source = super::text_source(&config, args.text_only);
    let parser = Arc::new(RulePayslipParser::new(&config)?);

    info!(
        "Extracting {} documents with {} workers ({} source)",
        files.len(),
        args.jobs.max(1),
        source.backend_name()
    );

    let mut report = BatchReport::new();
    let mut outcomes = stream::iter(files)
        .map(|path| {
            let source = Arc::clone(&source);
            let parser = Arc::clone(&parser);
            async move {
                let task_path = path.clone();
                let outcome = tokio::task::spawn_blocking(move || {
                    extract_document(&task_path, source.as_ref(), parser.as_ref())
                })
                .await;
                (path, outcome)
            }
        })
        .buffer_unordered(args.jobs.max(1));

    while let Some((path, outcome)) = outcomes.next().await {
        match outcome {
            Ok(outcome) => report.record(path, outcome),
            Err(e) => report.failed.push(FailedDocument {
                path,
                error: format!("worker failed: {}", e),
            }),
        }
        pb.inc(1);
    }

    pb.finish_and_clear();

    // Ledger writes stay on this task, after every worker is done
    let summary = report.apply(&config.profile, &config.tickets, &config.layout(), &mut grid)?;

    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.ledger));
    grid.save(&output_path)?;

    if let Some(summary_path) = &args.summary {
        write_summary(summary_path, &report)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    println!(
        "{} Ledger written to {} ({} periods, {} cells)",
        style("✓").green(),
        output_path.display(),
        summary.periods.len(),
        summary.cells
    );
    println!(
        "   {} successful, {} failed in {:?}",
        style(report.extracted.len()).green(),
        style(report.failed.len()).red(),
        start.elapsed()
    );

    if !report.failed.is_empty() {
        println!();
        println!("{}", style("Failed payslips:").red());
        for failure in &report.failed {
            println!("  - {}: {}", failure.path.display(), failure.error);
        }
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn default_output_path(ledger: &Path) -> PathBuf {
    let stem = ledger
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("ledger");
    ledger.with_file_name(format!("{}_compiled.csv", stem))
}

fn write_summary(path: &Path, report: &BatchReport) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record(["file", "status", "year", "month", "warnings", "error"])?;

    for doc in &report.extracted {
        let period = doc.record.period();
        wtr.write_record([
            doc.path.display().to_string(),
            "success".to_string(),
            period.year.to_string(),
            period.month_number().to_string(),
            doc.warnings.join("; "),
            String::new(),
        ])?;
    }

    for failure in &report.failed {
        wtr.write_record([
            failure.path.display().to_string(),
            "error".to_string(),
            String::new(),
            String::new(),
            String::new(),
            failure.error.clone(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("/data/buste.xlsx")),
            PathBuf::from("/data/buste_compiled.csv")
        );
        assert_eq!(
            default_output_path(Path::new("ledger.csv")),
            PathBuf::from("ledger_compiled.csv")
        );
    }
}

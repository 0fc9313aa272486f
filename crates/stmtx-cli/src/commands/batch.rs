//! Batch command - extract transactions from many statements.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{debug, error, warn};

use stmtx_core::models::config::StmtxConfig;
use stmtx_core::models::StatementExtractionResult;
use stmtx_core::pdf::StatementDocument;
use stmtx_core::statement::DefaultStatementExtractor;

use super::{ensure_pdf, load_config, StrategyArg};
use crate::output::{format_result, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern matching statement PDFs
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of statements processed at once
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Skip the text layer and OCR every page
    #[arg(long)]
    force_ocr: bool,

    /// Line grammar to use (overrides config)
    #[arg(long, value_enum)]
    strategy: Option<StrategyArg>,
}

/// Result of processing a single file.
struct FileOutcome {
    path: PathBuf,
    result: Result<StatementExtractionResult, String>,
    processing_time_ms: u64,
}

#[derive(Serialize)]
struct SummaryRow<'a> {
    filename: &'a str,
    status: &'a str,
    statement_date: &'a str,
    transactions: Option<usize>,
    total_amount: Option<Decimal>,
    ocr_used: Option<bool>,
    processing_time_ms: u64,
    error: &'a str,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(strategy) = args.strategy {
        config.parsing.strategy = strategy.into();
    }

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    eprintln!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let results = process_all(files, &config, args.jobs, args.force_ocr, &overall_pb).await?;
    overall_pb.finish_and_clear();

    if !args.continue_on_error {
        if let Some(failure) = results.iter().find(|r| r.result.is_err()) {
            let message = failure.result.as_ref().err().map(String::as_str).unwrap_or("");
            error!("Failed to process {}: {}", failure.path.display(), message);
            anyhow::bail!("Processing failed for {}: {}", failure.path.display(), message);
        }
    }

    let successful = results.iter().filter(|r| r.result.is_ok()).count();
    let failed: Vec<&FileOutcome> = results.iter().filter(|r| r.result.is_err()).collect();

    if let Some(output_dir) = &args.output_dir {
        for outcome in &results {
            let Ok(result) = &outcome.result else {
                continue;
            };
            let output_name = outcome
                .path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("statement");

            let output_path = output_dir.join(format!("{}.{}", output_name, args.format.extension()));
            let content = format_result(result, args.format, config.parsing.date_order)?;
            fs::write(&output_path, content)?;
            debug!("Wrote output to {}", output_path.display());
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        eprintln!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    eprintln!();
    eprintln!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    eprintln!(
        "   {} successful, {} failed",
        style(successful).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        eprintln!();
        eprintln!("{}", style("Failed files:").red());
        for outcome in &failed {
            eprintln!(
                "  - {}: {}",
                outcome.path.display(),
                outcome.result.as_ref().err().map(String::as_str).unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

/// Run every file on the blocking pool, at most `jobs` at a time.
///
/// Outcomes come back in input order.
async fn process_all(
    files: Vec<PathBuf>,
    config: &StmtxConfig,
    jobs: usize,
    force_ocr: bool,
    pb: &ProgressBar,
) -> anyhow::Result<Vec<FileOutcome>> {
    let semaphore = Arc::new(Semaphore::new(jobs.max(1)));
    let mut handles = Vec::with_capacity(files.len());

    for path in files {
        let semaphore = Arc::clone(&semaphore);
        let config = config.clone();
        let pb = pb.clone();

        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await?;
            let file_start = Instant::now();

            let task_path = path.clone();
            let joined = tokio::task::spawn_blocking(move || process_single_file(&task_path, &config, force_ocr)).await;
            let result = match joined {
                Ok(result) => result.map_err(|e| e.to_string()),
                Err(e) => Err(format!("worker panicked: {}", e)),
            };

            if let Err(ref message) = result {
                warn!("Failed to process {}: {}", path.display(), message);
            }
            pb.inc(1);

            anyhow::Ok(FileOutcome {
                path,
                result,
                processing_time_ms: file_start.elapsed().as_millis() as u64,
            })
        }));
    }

    let mut outcomes = Vec::with_capacity(handles.len());
    for handle in handles {
        outcomes.push(handle.await??);
    }
    Ok(outcomes)
}

fn process_single_file(path: &Path, config: &StmtxConfig, force_ocr: bool) -> anyhow::Result<StatementExtractionResult> {
    ensure_pdf(path)?;

    let document = StatementDocument::from_path(path)?;
    let extractor = DefaultStatementExtractor::from_config(config)?;
    Ok(extractor.extract(&document, force_ocr)?)
}

fn write_summary(path: &Path, results: &[FileOutcome]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    for outcome in results {
        let filename = outcome.path.file_name().and_then(|s| s.to_str()).unwrap_or("");

        let row = match &outcome.result {
            Ok(result) => SummaryRow {
                filename,
                status: "success",
                statement_date: result.statement_date.as_deref().unwrap_or(""),
                transactions: Some(result.transaction_count()),
                total_amount: Some(result.total_amount()),
                ocr_used: Some(result.ocr_used),
                processing_time_ms: outcome.processing_time_ms,
                error: "",
            },
            Err(message) => SummaryRow {
                filename,
                status: "error",
                statement_date: "",
                transactions: None,
                total_amount: None,
                ocr_used: None,
                processing_time_ms: outcome.processing_time_ms,
                error: message,
            },
        };
        wtr.serialize(row)?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.csv");

        let results = vec![
            FileOutcome {
                path: PathBuf::from("/statements/june.pdf"),
                result: Ok(StatementExtractionResult {
                    statement_date: Some("06/30/2024".to_string()),
                    transactions: Vec::new(),
                    ocr_used: false,
                    ocr_trigger: None,
                    strategy: "generic".to_string(),
                }),
                processing_time_ms: 12,
            },
            FileOutcome {
                path: PathBuf::from("/statements/july.pdf"),
                result: Err("failed to parse PDF: bad xref".to_string()),
                processing_time_ms: 3,
            },
        ];

        write_summary(&path, &results).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(
            lines[0],
            "filename,status,statement_date,transactions,total_amount,ocr_used,processing_time_ms,error"
        );
        assert_eq!(lines[1], "june.pdf,success,06/30/2024,0,0,false,12,");
        assert_eq!(lines[2], "july.pdf,error,,,,,3,failed to parse PDF: bad xref");
    }
}

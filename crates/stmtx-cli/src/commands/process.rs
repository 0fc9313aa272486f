//! Process command - extract transactions from a single statement.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use stmtx_core::pdf::StatementDocument;
use stmtx_core::statement::DefaultStatementExtractor;

use super::{ensure_pdf, load_config, DateOrderArg, StrategyArg};
use crate::output::{format_result, print_summary, OutputFormat};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Statement PDF
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Skip the text layer and OCR every page
    #[arg(long)]
    force_ocr: bool,

    /// Line grammar to use (overrides config)
    #[arg(long, value_enum)]
    strategy: Option<StrategyArg>,

    /// How ambiguous numeric dates are read for ISO output (overrides config)
    #[arg(long, value_enum)]
    date_order: Option<DateOrderArg>,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(strategy) = args.strategy {
        config.parsing.strategy = strategy.into();
    }
    if let Some(order) = args.date_order {
        config.parsing.date_order = order.into();
    }

    ensure_pdf(&args.input)?;
    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Reading statement...");

    let document = StatementDocument::from_path(&args.input)?;
    let extractor = DefaultStatementExtractor::from_config(&config)?;

    pb.set_message("Extracting transactions...");
    let result = extractor.extract(&document, args.force_ocr);
    pb.finish_and_clear();
    let result = result?;

    let output = format_result(&result, args.format, config.parsing.date_order)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    print_summary(&result);
    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

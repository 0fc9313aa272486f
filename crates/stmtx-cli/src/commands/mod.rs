//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod process;
pub mod text;

use std::path::Path;

use clap::ValueEnum;
use tracing::debug;

use stmtx_core::models::config::{ParsingStrategy, StmtxConfig};
use stmtx_core::statement::rules::DateOrder;

/// Load the configuration named by `-c`, else the user config file, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<StmtxConfig> {
    let config = if let Some(path) = config_path {
        StmtxConfig::from_file(Path::new(path))?
    } else {
        let default_path = config::default_config_path();
        if default_path.exists() {
            debug!("Using config from {}", default_path.display());
            StmtxConfig::from_file(&default_path)?
        } else {
            StmtxConfig::default()
        }
    };

    config.validate()?;
    Ok(config)
}

/// Line grammar selection on the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum StrategyArg {
    /// Table rows for OCR'd text, generic otherwise
    Auto,
    /// Date and amount anchors with continuation lines
    Generic,
    /// OCR table rows when the first page is garbled
    TableAware,
}

impl From<StrategyArg> for ParsingStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Auto => ParsingStrategy::Auto,
            StrategyArg::Generic => ParsingStrategy::Generic,
            StrategyArg::TableAware => ParsingStrategy::TableAware,
        }
    }
}

/// Reading of ambiguous numeric dates on the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum DateOrderArg {
    /// MM/DD/YYYY
    MonthFirst,
    /// DD/MM/YYYY
    DayFirst,
}

impl From<DateOrderArg> for DateOrder {
    fn from(arg: DateOrderArg) -> Self {
        match arg {
            DateOrderArg::MonthFirst => DateOrder::MonthFirst,
            DateOrderArg::DayFirst => DateOrder::DayFirst,
        }
    }
}

/// Only PDFs carry a text layer to start from.
pub fn ensure_pdf(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    if extension != "pdf" {
        anyhow::bail!("Unsupported file format: {}", extension);
    }
    Ok(())
}

//! Text command - show the lines a statement yields before parsing.

use std::path::PathBuf;

use clap::Args;
use console::style;

use stmtx_core::pdf::StatementDocument;
use stmtx_core::text::DefaultTextAcquisition;

use super::{ensure_pdf, load_config};

/// Arguments for the text command.
#[derive(Args)]
pub struct TextArgs {
    /// Statement PDF
    #[arg(required = true)]
    input: PathBuf,

    /// Skip the text layer and OCR every page
    #[arg(long)]
    force_ocr: bool,

    /// Prefix each line with its page number
    #[arg(long)]
    pages: bool,
}

pub async fn run(args: TextArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    ensure_pdf(&args.input)?;

    let document = StatementDocument::from_path(&args.input)?;
    let acquisition = DefaultTextAcquisition::from_config(&config)?;
    let text = acquisition.acquire(&document, args.force_ocr)?;

    for line in &text.lines {
        if args.pages {
            println!("{:>5} p{:<3} {}", line.number, line.page, line.content);
        } else {
            println!("{:>5}  {}", line.number, line.content);
        }
    }

    match text.trigger {
        Some(trigger) => eprintln!(
            "{} {} lines from OCR ({:?})",
            style("ℹ").blue(),
            text.lines.len(),
            trigger
        ),
        None => eprintln!(
            "{} {} lines from the text layer",
            style("ℹ").blue(),
            text.lines.len()
        ),
    }

    Ok(())
}

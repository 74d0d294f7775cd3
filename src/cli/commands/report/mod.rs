//! `telconova report` command - Order statistics and exports

mod export;
mod summary;

use clap::Subcommand;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use crate::cli::GlobalOpts;

pub use export::ExportArgs;
pub use summary::SummaryArgs;

#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Totals by status, activity and priority
    Summary(SummaryArgs),

    /// Export orders as CSV
    Export(ExportArgs),
}

pub fn run(cmd: ReportCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ReportCommands::Summary(args) => summary::run(args, global),
        ReportCommands::Export(args) => export::run(args, global),
    }
}

/// Write report content to a file, or stdout when no path is given
pub(crate) fn write_output(content: &str, output_path: Option<PathBuf>, global: &GlobalOpts) -> Result<()> {
    match output_path {
        Some(path) => {
            let file = File::create(&path).into_diagnostic()?;
            let mut writer = BufWriter::new(file);
            writer.write_all(content.as_bytes()).into_diagnostic()?;
            writer.flush().into_diagnostic()?;
            if !global.quiet {
                println!("Report written to: {}", path.display());
            }
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}

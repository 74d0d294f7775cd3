//! CSV export of the filtered order list

use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::commands::order::FilterArgs;
use crate::cli::helpers::open_store;
use crate::cli::GlobalOpts;
use crate::core::query::{enrich, filter_orders};
use crate::core::report::write_orders_csv;
use crate::entities::{Client, WorkOrder};

use super::write_output;

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub filter: FilterArgs,
}

pub fn run(args: ExportArgs, global: &GlobalOpts) -> Result<()> {
    let (_project, store) = open_store(global)?;
    let orders: Vec<WorkOrder> = store.load();
    let clients: Vec<Client> = store.load();

    let enriched = enrich(&orders, &clients);
    let rows = filter_orders(&enriched, &args.filter.to_filter());
    tracing::debug!(total = enriched.len(), exported = rows.len(), "exporting orders");

    let mut buffer = Vec::new();
    write_orders_csv(&rows, &mut buffer).into_diagnostic()?;
    let content = String::from_utf8(buffer).into_diagnostic()?;

    write_output(&content, args.output, global)
}

//! Order summary report

use miette::Result;
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{effective_format, open_store, print_json, print_yaml};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::report::{order_stats, CategoryCount, OrderStats};
use crate::core::Config;
use crate::entities::WorkOrder;

use super::write_output;

#[derive(clap::Args, Debug)]
pub struct SummaryArgs {
    /// Output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(args: SummaryArgs, global: &GlobalOpts) -> Result<()> {
    let (project, store) = open_store(global)?;
    let config = Config::load_for(Some(&project));
    let orders: Vec<WorkOrder> = store.load();
    let stats = order_stats(&orders);

    match effective_format(global.format, &config, OutputFormat::Md) {
        OutputFormat::Json => print_json(&stats),
        OutputFormat::Yaml => print_yaml(&stats),
        _ => write_output(&render_markdown(&stats), args.output, global),
    }
}

fn category_table(title: &str, counts: &[CategoryCount], with_share: bool) -> String {
    let mut builder = Builder::default();
    if with_share {
        builder.push_record([title, "Órdenes", "%"]);
    } else {
        builder.push_record([title, "Órdenes"]);
    }
    for c in counts {
        if with_share {
            builder.push_record([
                c.label.to_string(),
                c.count.to_string(),
                format!("{:.1}%", c.percentage),
            ]);
        } else {
            builder.push_record([c.label.to_string(), c.count.to_string()]);
        }
    }
    builder.build().with(Style::markdown()).to_string()
}

fn render_markdown(stats: &OrderStats) -> String {
    let mut output = String::new();
    output.push_str("# Resumen de órdenes\n\n");

    let mut summary = Builder::default();
    summary.push_record(["Métrica", "Valor"]);
    summary.push_record(["Total de órdenes", &stats.total.to_string()]);
    summary.push_record(["Activas", &stats.active().to_string()]);
    summary.push_record(["Cerradas", &stats.closed().to_string()]);
    output.push_str(&summary.build().with(Style::markdown()).to_string());

    output.push_str("\n\n## Por estado\n\n");
    output.push_str(&category_table("Estado", &stats.by_status, false));

    output.push_str("\n\n## Por actividad\n\n");
    output.push_str(&category_table("Actividad", &stats.by_activity, true));

    output.push_str("\n\n## Por prioridad\n\n");
    output.push_str(&category_table("Prioridad", &stats.by_priority, false));
    output.push('\n');
    output
}

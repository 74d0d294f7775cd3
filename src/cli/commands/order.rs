//! `telconova order` command - Work order management

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{effective_format, open_store, print_json, print_yaml};
use crate::cli::table::{CellValue, ColumnDef, TableConfig, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::query::{enrich, EnrichedOrder};
use crate::core::validation::validate_work_order_form;
use crate::core::{Config, OrderFilter, OrderPage, OrderQuery, Session, WorkOrderRegistry};
use crate::entities::{Activity, Client, NewWorkOrder, OrderChange, OrderStatus, Priority, WorkOrder};

#[derive(Subcommand, Debug)]
pub enum OrderCommands {
    /// List work orders, filtered and paginated
    List(ListArgs),

    /// Show an order with its client
    Show(ShowArgs),

    /// Open a new work order
    New(NewArgs),

    /// Change an order's activity, priority or status
    Edit(EditArgs),

    /// Delete a work order
    Delete(DeleteArgs),
}

/// Filters shared by listings and exports
#[derive(clap::Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Text matched against order number, client name and description
    #[arg(long, short = 's', default_value = "")]
    pub search: String,

    /// Only orders in this status
    #[arg(long, short = 'S', value_enum)]
    pub status: Option<OrderStatus>,

    /// Only orders of this activity
    #[arg(long, short = 'a', value_enum)]
    pub activity: Option<Activity>,

    /// Only orders of this priority
    #[arg(long, short = 'p', value_enum)]
    pub priority: Option<Priority>,
}

impl FilterArgs {
    pub fn to_filter(&self) -> OrderFilter {
        OrderFilter {
            text: self.search.clone(),
            status: self.status,
            activity: self.activity,
            priority: self.priority,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Page to show (1-based, clamped to the last page)
    #[arg(long, short = 'P', default_value_t = 1)]
    pub page: usize,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Order id or number (7, 007, #007)
    pub order: String,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Id of the client receiving the service
    #[arg(long, short = 'c', default_value = "")]
    pub client: String,

    #[arg(long, short = 'a', value_enum)]
    pub activity: Option<Activity>,

    #[arg(long, short = 'p', value_enum)]
    pub priority: Option<Priority>,

    /// Work description
    #[arg(long, short = 'd', default_value = "")]
    pub description: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Order id or number (7, 007, #007)
    pub order: String,

    #[arg(long, short = 'a', value_enum)]
    pub activity: Option<Activity>,

    #[arg(long, short = 'p', value_enum)]
    pub priority: Option<Priority>,

    #[arg(long, short = 'S', value_enum)]
    pub status: Option<OrderStatus>,

    /// Why the order changes (required, written to the log)
    #[arg(long, short = 'r', default_value = "")]
    pub reason: String,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Order id or number (7, 007, #007)
    pub order: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Columns shown by order listings
const ORDER_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("number", "#", 6),
    ColumnDef::new("client", "CLIENTE", 28),
    ColumnDef::new("activity", "ACTIVIDAD", 15),
    ColumnDef::new("priority", "PRIORIDAD", 11),
    ColumnDef::new("status", "ESTADO", 13),
    ColumnDef::new("date", "FECHA", 12),
    ColumnDef::new("description", "DESCRIPCIÓN", 40),
];

/// Run an order subcommand
pub fn run(cmd: OrderCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        OrderCommands::List(args) => run_list(args, global),
        OrderCommands::Show(args) => run_show(args, global),
        OrderCommands::New(args) => run_new(args, global),
        OrderCommands::Edit(args) => run_edit(args, global),
        OrderCommands::Delete(args) => run_delete(args, global),
    }
}

fn order_row(row: &EnrichedOrder<'_>) -> TableRow {
    let order = row.order;
    TableRow::new(order.id.clone())
        .cell("number", CellValue::OrderNumber(order.order_number.clone()))
        .cell("client", CellValue::Text(row.client_name().to_string()))
        .cell("activity", CellValue::Activity(order.activity))
        .cell("priority", CellValue::Priority(order.priority))
        .cell("status", CellValue::Status(order.status))
        .cell("date", CellValue::Date(order.created_at))
        .cell("description", CellValue::Text(order.description.clone()))
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let (project, store) = open_store(global)?;
    let config = Config::load_for(Some(&project));
    let orders: Vec<WorkOrder> = store.load();
    let clients: Vec<Client> = store.load();

    let mut query = OrderQuery::with_filter(args.filter.to_filter());
    query.set_page(args.page);
    let page = query.run(&orders, &clients);

    match effective_format(global.format, &config, OutputFormat::Tsv) {
        OutputFormat::Json => print_json(&page),
        OutputFormat::Yaml => print_yaml(&page),
        OutputFormat::Tsv => {
            if page.rows.is_empty() {
                println!("No se encontraron órdenes");
                return Ok(());
            }
            let rows: Vec<TableRow> = page.rows.iter().map(order_row).collect();
            TableFormatter::new(ORDER_COLUMNS, "order")
                .with_config(TableConfig::for_pipe())
                .output(&rows, OutputFormat::Tsv);
            if !global.quiet {
                print_page_footer(&page);
            }
            Ok(())
        }
        format => {
            let rows: Vec<TableRow> = page.rows.iter().map(order_row).collect();
            TableFormatter::new(ORDER_COLUMNS, "order").output(&rows, format);
            Ok(())
        }
    }
}

fn print_page_footer(page: &OrderPage<'_>) {
    let info = &page.info;
    println!();
    println!(
        "Mostrando {}-{} de {} órdenes (página {} de {})",
        style(info.range_start).cyan(),
        style(info.range_end).cyan(),
        style(info.total_count).cyan(),
        info.current_page,
        info.total_pages
    );
    if info.has_previous() {
        println!(
            "Use {} for the previous page",
            style(format!("--page {}", info.current_page - 1)).yellow()
        );
    }
    if info.has_next() {
        println!(
            "Use {} for the next page",
            style(format!("--page {}", info.current_page + 1)).yellow()
        );
    }
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let (project, mut store) = open_store(global)?;
    let config = Config::load_for(Some(&project));
    let clients: Vec<Client> = store.load();
    let registry = WorkOrderRegistry::open(&mut store);

    let order = registry
        .find(&args.order)
        .ok_or_else(|| miette::miette!("No work order found matching '{}'", args.order))?;
    let detail = enrich(std::slice::from_ref(order), &clients)[0];

    match effective_format(global.format, &config, OutputFormat::Auto) {
        OutputFormat::Json => print_json(&detail),
        OutputFormat::Yaml => print_yaml(&detail),
        OutputFormat::Id => {
            println!("{}", order.id);
            Ok(())
        }
        _ => {
            print_order_detail(&detail);
            Ok(())
        }
    }
}

fn print_order_detail(detail: &EnrichedOrder<'_>) {
    let order = detail.order;
    println!(
        "{} {}",
        style("Orden").bold(),
        style(format!("#{}", order.order_number)).cyan().bold()
    );
    println!("  {:<14} {}", "ID:", order.id);
    println!("  {:<14} {}", "Estado:", order.status);
    println!("  {:<14} {}", "Actividad:", order.activity);
    println!("  {:<14} {}", "Prioridad:", order.priority);
    println!("  {:<14} {}", "Responsable:", order.responsible_user_id);
    println!(
        "  {:<14} {}",
        "Asignada a:",
        order.owner_user_id.as_deref().unwrap_or("-")
    );
    println!("  {:<14} {}", "Creada:", order.created_at.format("%Y-%m-%d %H:%M"));
    println!("  {:<14} {}", "Actualizada:", order.updated_at.format("%Y-%m-%d %H:%M"));
    println!();
    println!("{}", style("Descripción").bold());
    println!("  {}", order.description);
    println!();
    println!("{}", style("Cliente").bold());
    match detail.client {
        Some(client) => {
            println!("  {:<14} {}", "Nombre:", client.name);
            println!("  {:<14} {}", "Identificación:", client.identification);
            println!("  {:<14} {}", "Teléfono:", client.phone);
            println!("  {:<14} {}", "Dirección:", client.address);
        }
        None => println!("  {}", style(detail.client_name()).yellow()),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    validate_work_order_form(
        args.activity.map_or("", |a| a.label()),
        args.priority.map_or("", |p| p.label()),
        &args.client,
        &args.description,
    )
    .into_result("work order")?;

    let (Some(activity), Some(priority)) = (args.activity, args.priority) else {
        return Err(miette::miette!("activity and priority are required"));
    };

    let (project, mut store) = open_store(global)?;
    let clients: Vec<Client> = store.load();
    if !clients.iter().any(|c| c.id == args.client) {
        tracing::warn!(client_id = %args.client, "new order references an unknown client");
    }

    let responsible = Session::open(&mut store)
        .user()
        .map(|u| u.id)
        .unwrap_or_else(|| Config::load_for(Some(&project)).user());

    let mut registry = WorkOrderRegistry::open(&mut store);
    let order = registry
        .create(
            NewWorkOrder {
                client_id: args.client,
                activity,
                priority,
                description: args.description,
            },
            responsible,
        )
        .into_diagnostic()?;

    if global.quiet {
        println!("{}", order.order_number);
    } else {
        println!(
            "{} Orden creada: {} ({}, {})",
            style("✓").green(),
            style(format!("#{}", order.order_number)).cyan(),
            order.activity,
            order.priority
        );
    }
    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let (_project, mut store) = open_store(global)?;
    let mut registry = WorkOrderRegistry::open(&mut store);

    let id = registry
        .find(&args.order)
        .map(|o| o.id.clone())
        .ok_or_else(|| miette::miette!("No work order found matching '{}'", args.order))?;

    let change = OrderChange {
        activity: args.activity,
        priority: args.priority,
        status: args.status,
    };
    let updated = registry
        .update(&id, &change, &args.reason)?
        .ok_or_else(|| miette::miette!("No work order found matching '{}'", args.order))?;

    if !global.quiet {
        println!(
            "{} Orden {} actualizada: {} / {} / {}",
            style("✓").green(),
            style(format!("#{}", updated.order_number)).cyan(),
            updated.activity,
            updated.priority,
            updated.status
        );
    }
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let (_project, mut store) = open_store(global)?;
    let mut registry = WorkOrderRegistry::open(&mut store);

    let (id, number) = registry
        .find(&args.order)
        .map(|o| (o.id.clone(), o.order_number.clone()))
        .ok_or_else(|| miette::miette!("No work order found matching '{}'", args.order))?;

    if !args.yes {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(format!("¿Eliminar la orden #{}?", number))
            .default(false)
            .interact()
            .into_diagnostic()?;
        if !confirmed {
            println!("Cancelled.");
            return Ok(());
        }
    }

    registry.delete(&id).into_diagnostic()?;
    if !global.quiet {
        println!(
            "{} Orden {} eliminada",
            style("✓").green(),
            style(format!("#{}", number)).cyan()
        );
    }
    Ok(())
}

//! `telconova client` command - Client management

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{effective_format, open_store, print_json, print_yaml};
use crate::cli::table::{CellValue, ColumnDef, TableConfig, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::validation::validate_client_form;
use crate::core::{ClientRegistry, Config};
use crate::entities::{Client, ClientDraft};

#[derive(Subcommand, Debug)]
pub enum ClientCommands {
    /// List all clients
    List,

    /// Show a client's details
    Show(ShowArgs),

    /// Find clients by partial name or identification
    Search(SearchArgs),

    /// Register a new client
    New(NewArgs),

    /// Update a client's fields
    Edit(EditArgs),
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Client id
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct SearchArgs {
    /// Part of the client's name (case-insensitive)
    #[arg(long, short = 'n', default_value = "")]
    pub name: String,

    /// Part of the identification number
    #[arg(long = "id", short = 'i', default_value = "")]
    pub identification: String,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Full name
    #[arg(long, short = 'n', default_value = "")]
    pub name: String,

    /// Identification number (digits only, at least 6)
    #[arg(long = "identification", short = 'd', default_value = "")]
    pub identification: String,

    /// Contact phone (at least 10 digits)
    #[arg(long, short = 'p', default_value = "")]
    pub phone: String,

    /// Service address
    #[arg(long, short = 'a', default_value = "")]
    pub address: String,

    /// Prompt for each field
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Client id
    pub id: String,

    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[arg(long = "identification", short = 'd')]
    pub identification: Option<String>,

    #[arg(long, short = 'p')]
    pub phone: Option<String>,

    #[arg(long, short = 'a')]
    pub address: Option<String>,
}

/// Columns shown by client listings
const CLIENT_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 17),
    ColumnDef::new("name", "NOMBRE", 28),
    ColumnDef::new("identification", "IDENTIFICACIÓN", 16),
    ColumnDef::new("phone", "TELÉFONO", 18),
    ColumnDef::new("address", "DIRECCIÓN", 32),
];

/// Run a client subcommand
pub fn run(cmd: ClientCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ClientCommands::List => run_list(global),
        ClientCommands::Show(args) => run_show(args, global),
        ClientCommands::Search(args) => run_search(args, global),
        ClientCommands::New(args) => run_new(args, global),
        ClientCommands::Edit(args) => run_edit(args, global),
    }
}

fn client_row(client: &Client) -> TableRow {
    TableRow::new(client.id.clone())
        .cell("id", CellValue::Id(client.id.clone()))
        .cell("name", CellValue::Text(client.name.clone()))
        .cell("identification", CellValue::Text(client.identification.clone()))
        .cell("phone", CellValue::Text(client.phone.clone()))
        .cell("address", CellValue::Text(client.address.clone()))
}

fn output_clients(clients: &[&Client], config: &Config, global: &GlobalOpts) -> Result<()> {
    match effective_format(global.format, config, OutputFormat::Tsv) {
        OutputFormat::Json => print_json(clients),
        OutputFormat::Yaml => print_yaml(clients),
        format => {
            let rows: Vec<TableRow> = clients.iter().map(|c| client_row(c)).collect();
            let table_config = if global.quiet {
                TableConfig::for_pipe()
            } else {
                TableConfig::default()
            };
            TableFormatter::new(CLIENT_COLUMNS, "client")
                .with_config(table_config)
                .output(&rows, format);
            Ok(())
        }
    }
}

fn output_client(client: &Client, config: &Config, global: &GlobalOpts) -> Result<()> {
    match effective_format(global.format, config, OutputFormat::Yaml) {
        OutputFormat::Json => print_json(client),
        OutputFormat::Id => {
            println!("{}", client.id);
            Ok(())
        }
        OutputFormat::Tsv | OutputFormat::Csv | OutputFormat::Md => {
            output_clients(&[client], config, global)
        }
        _ => print_yaml(client),
    }
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let (project, mut store) = open_store(global)?;
    let config = Config::load_for(Some(&project));
    let registry = ClientRegistry::open(&mut store);

    if registry.all().is_empty() {
        println!("No clients found.");
        return Ok(());
    }
    let clients: Vec<&Client> = registry.all().iter().collect();
    output_clients(&clients, &config, global)
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let (project, mut store) = open_store(global)?;
    let config = Config::load_for(Some(&project));
    let registry = ClientRegistry::open(&mut store);

    let client = registry
        .get(&args.id)
        .ok_or_else(|| miette::miette!("No client found with id '{}'", args.id))?;
    output_client(client, &config, global)
}

fn run_search(args: SearchArgs, global: &GlobalOpts) -> Result<()> {
    let (project, mut store) = open_store(global)?;
    let config = Config::load_for(Some(&project));
    let registry = ClientRegistry::open(&mut store);

    let matches = registry.search_all(&args.name, &args.identification);
    if matches.is_empty() {
        println!("No se encontró ningún cliente");
        return Ok(());
    }
    output_clients(&matches, &config, global)
}

fn prompt(label: &str, initial: &str) -> Result<String> {
    dialoguer::Input::<String>::new()
        .with_prompt(label)
        .with_initial_text(initial)
        .allow_empty(true)
        .interact_text()
        .into_diagnostic()
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let draft = if args.interactive {
        ClientDraft {
            name: prompt("Nombre completo", &args.name)?,
            identification: prompt("Identificación", &args.identification)?,
            phone: prompt("Teléfono", &args.phone)?,
            address: prompt("Dirección", &args.address)?,
        }
    } else {
        ClientDraft {
            name: args.name,
            identification: args.identification,
            phone: args.phone,
            address: args.address,
        }
    };

    validate_client_form(
        &draft.name,
        &draft.identification,
        &draft.phone,
        &draft.address,
    )
    .into_result("client")?;

    let (_project, mut store) = open_store(global)?;
    let mut registry = ClientRegistry::open(&mut store);
    let client = registry.create(draft).into_diagnostic()?;

    if global.quiet {
        println!("{}", client.id);
    } else {
        println!(
            "{} Cliente registrado: {} ({})",
            style("✓").green(),
            style(&client.name).cyan(),
            client.id
        );
    }
    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let (_project, mut store) = open_store(global)?;
    let mut registry = ClientRegistry::open(&mut store);

    let current = registry
        .get(&args.id)
        .ok_or_else(|| miette::miette!("No client found with id '{}'", args.id))?;

    let mut draft = current.to_draft();
    if let Some(name) = args.name {
        draft.name = name;
    }
    if let Some(identification) = args.identification {
        draft.identification = identification;
    }
    if let Some(phone) = args.phone {
        draft.phone = phone;
    }
    if let Some(address) = args.address {
        draft.address = address;
    }

    validate_client_form(
        &draft.name,
        &draft.identification,
        &draft.phone,
        &draft.address,
    )
    .into_result("client")?;

    let updated = registry
        .update(&args.id, draft)
        .into_diagnostic()?
        .ok_or_else(|| miette::miette!("No client found with id '{}'", args.id))?;

    if !global.quiet {
        println!(
            "{} Cliente actualizado: {}",
            style("✓").green(),
            style(&updated.name).cyan()
        );
    }
    Ok(())
}

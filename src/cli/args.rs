//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    auth::AuthCommands, client::ClientCommands, completions::CompletionsArgs, init::InitArgs,
    order::OrderCommands, report::ReportCommands,
};

#[derive(Parser)]
#[command(name = "telconova")]
#[command(author, version, about = "Telecom field service client and work order manager")]
#[command(long_about = "Register clients, open and track service work orders, and review order reports. Data lives in a project-local store under .telconova/.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging on stderr)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .telconova/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new Telconova project
    Init(InitArgs),

    /// Client management
    #[command(subcommand)]
    Client(ClientCommands),

    /// Work order management
    #[command(subcommand)]
    Order(OrderCommands),

    /// Order statistics and exports
    #[command(subcommand)]
    Report(ReportCommands),

    /// Sign in, register and manage the local session
    #[command(subcommand)]
    Auth(AuthCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (yaml for show, tsv for list)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}

//! `telconova init` command - Initialize a new Telconova project

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::Path;

use crate::cli::GlobalOpts;
use crate::core::project::{Project, ProjectError};
use crate::core::seed::seed_demo_data;
use crate::core::EntityStore;

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Reinitialize even if .telconova/ already exists (stored data is kept)
    #[arg(long)]
    pub force: bool,

    /// Load the demo clients and work orders
    #[arg(long)]
    pub seed: bool,
}

pub fn run(args: InitArgs, global: &GlobalOpts) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
        if !global.quiet {
            println!(
                "{} Created directory {}",
                style("✓").green(),
                style(path.display()).cyan()
            );
        }
    }

    let project = if args.force {
        Project::init_force(&path)
    } else {
        Project::init(&path)
    };

    let project = match project {
        Ok(project) => project,
        Err(ProjectError::AlreadyExists(path)) => {
            println!(
                "{} Telconova project already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!(
                "Use {} to reinitialize",
                style("telconova init --force").yellow()
            );
            return Ok(());
        }
        Err(e) => return Err(miette::miette!("{}", e)),
    };

    if !global.quiet {
        println!(
            "{} Initialized Telconova project at {}",
            style("✓").green(),
            style(project.root().display()).cyan()
        );
        println!();
        println!("Created project structure:");
        print_structure(project.root());
    }

    if args.seed {
        let mut store = EntityStore::open(&project);
        let summary = seed_demo_data(&mut store).map_err(|e| miette::miette!("{}", e))?;
        if summary.is_empty() {
            println!(
                "{} Demo data skipped, the store already has clients and orders",
                style("!").yellow()
            );
        } else {
            println!(
                "{} Loaded {} demo client(s) and {} demo order(s)",
                style("✓").green(),
                style(summary.clients).cyan(),
                style(summary.work_orders).cyan()
            );
        }
    }

    if !global.quiet {
        println!();
        println!("Next steps:");
        println!(
            "  {} Register your first client",
            style("telconova client new").yellow()
        );
        println!(
            "  {} Open a work order",
            style("telconova order new").yellow()
        );
        println!(
            "  {} Sign in to the service",
            style("telconova auth login").yellow()
        );
    }
    Ok(())
}

fn print_structure(root: &Path) {
    let entries = [".telconova/", ".telconova/config.yaml", ".telconova/store/"];

    for entry in entries {
        if root.join(entry).exists() {
            let prefix = if entry.ends_with('/') { "📁" } else { "📄" };
            println!("  {} {}", prefix, style(entry).dim());
        }
    }
}

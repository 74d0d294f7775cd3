use clap::Parser;
use miette::Result;
use telconova::cli::{Cli, Commands, GlobalOpts};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_logging(&global);

    match cli.command {
        Commands::Init(args) => telconova::cli::commands::init::run(args, &global),
        Commands::Client(cmd) => telconova::cli::commands::client::run(cmd, &global),
        Commands::Order(cmd) => telconova::cli::commands::order::run(cmd, &global),
        Commands::Report(cmd) => telconova::cli::commands::report::run(cmd, &global),
        Commands::Auth(cmd) => telconova::cli::commands::auth::run(cmd, &global),
        Commands::Completions(args) => telconova::cli::commands::completions::run(args),
    }
}

/// Log to stderr; `RUST_LOG` wins over `--verbose`
fn init_logging(global: &GlobalOpts) {
    let default_level = if global.verbose { "warn,telconova=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

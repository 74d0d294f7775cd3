//! `telconova auth` command - Gateway sign-in and local session

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{effective_format, open_store, print_json, print_yaml};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::auth::{verify_code, Registration};
use crate::core::{AuthError, Config, HttpAuthGateway, Session, SessionError};
use crate::entities::UserProfile;

#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Sign in and store the session
    Login(LoginArgs),

    /// Create an account and store the session
    Register(RegisterArgs),

    /// Refresh and show the signed-in profile
    Me,

    /// Forget the stored session
    Logout,

    /// Check an account verification code
    Verify(VerifyArgs),
}

#[derive(clap::Args, Debug)]
pub struct LoginArgs {
    #[arg(long, short = 'e', default_value = "")]
    pub email: String,

    /// Password (prompted when omitted)
    #[arg(long, env = "TELCONOVA_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct RegisterArgs {
    /// Full name
    #[arg(long, short = 'n', default_value = "")]
    pub name: String,

    /// Identification number (digits only, at least 6)
    #[arg(long = "identification", short = 'd', default_value = "")]
    pub identification: String,

    #[arg(long, short = 'e', default_value = "")]
    pub email: String,

    /// Password, at least 8 characters (prompted when omitted)
    #[arg(long, env = "TELCONOVA_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct VerifyArgs {
    /// Code received after registering
    pub code: String,
}

pub fn run(cmd: AuthCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        AuthCommands::Login(args) => run_login(args, global),
        AuthCommands::Register(args) => run_register(args, global),
        AuthCommands::Me => run_me(global),
        AuthCommands::Logout => run_logout(global),
        AuthCommands::Verify(args) => run_verify(args, global),
    }
}

fn read_password(given: Option<String>, confirm: bool) -> Result<String> {
    if let Some(password) = given {
        return Ok(password);
    }
    let mut prompt = dialoguer::Password::new().with_prompt("Contraseña");
    if confirm {
        prompt = prompt.with_confirmation("Confirme la contraseña", "Las contraseñas no coinciden");
    }
    prompt.interact().into_diagnostic()
}

/// Replace gateway failures with the message agents expect
fn explain(err: SessionError) -> miette::Report {
    match err {
        SessionError::Auth(auth) => {
            tracing::debug!(error = %auth, "gateway call failed");
            let hint = match auth {
                AuthError::Connection(_) => "check api_url or TELCONOVA_API_URL",
                _ => "",
            };
            if hint.is_empty() {
                miette::miette!("{}", auth.user_message())
            } else {
                miette::miette!(help = hint, "{}", auth.user_message())
            }
        }
        other => miette::Report::new(other),
    }
}

fn gateway(config: &Config) -> Result<HttpAuthGateway> {
    HttpAuthGateway::new(config.api_url()).map_err(|e| miette::miette!("{}", e.user_message()))
}

fn print_profile(user: &UserProfile, config: &Config, global: &GlobalOpts) -> Result<()> {
    match effective_format(global.format, config, OutputFormat::Auto) {
        OutputFormat::Json => print_json(user),
        OutputFormat::Yaml => print_yaml(user),
        OutputFormat::Id => {
            println!("{}", user.id);
            Ok(())
        }
        _ => {
            println!("  {:<8} {}", "Nombre:", style(&user.name).cyan());
            println!("  {:<8} {}", "Email:", user.email);
            println!("  {:<8} {}", "Rol:", user.role);
            println!("  {:<8} {}", "ID:", user.id);
            Ok(())
        }
    }
}

fn run_login(args: LoginArgs, global: &GlobalOpts) -> Result<()> {
    let (project, mut store) = open_store(global)?;
    let config = Config::load_for(Some(&project));
    let password = read_password(args.password, false)?;

    let gateway = gateway(&config)?;
    let user = Session::open(&mut store)
        .login(&gateway, &args.email, &password)
        .map_err(explain)?;

    if !global.quiet {
        println!(
            "{} Sesión iniciada como {}",
            style("✓").green(),
            style(&user.name).cyan()
        );
    }
    Ok(())
}

fn run_register(args: RegisterArgs, global: &GlobalOpts) -> Result<()> {
    let (project, mut store) = open_store(global)?;
    let config = Config::load_for(Some(&project));
    let password = read_password(args.password, true)?;

    let registration = Registration {
        name: args.name,
        email: args.email,
        password,
        identification: args.identification,
    };

    let gateway = gateway(&config)?;
    let user = Session::open(&mut store)
        .register(&gateway, &registration)
        .map_err(explain)?;

    if !global.quiet {
        println!(
            "{} Cuenta creada para {}",
            style("✓").green(),
            style(&user.name).cyan()
        );
        println!(
            "Verify the account with {}",
            style("telconova auth verify <CODE>").yellow()
        );
    }
    Ok(())
}

fn run_me(global: &GlobalOpts) -> Result<()> {
    let (project, mut store) = open_store(global)?;
    let config = Config::load_for(Some(&project));

    let gateway = gateway(&config)?;
    let user = Session::open(&mut store).refresh(&gateway).map_err(explain)?;
    print_profile(&user, &config, global)
}

fn run_logout(global: &GlobalOpts) -> Result<()> {
    let (_project, mut store) = open_store(global)?;
    let mut session = Session::open(&mut store);
    let was_signed_in = session.user().is_some();
    session.logout().into_diagnostic()?;

    if !global.quiet {
        if was_signed_in {
            println!("{} Sesión cerrada", style("✓").green());
        } else {
            println!("No active session.");
        }
    }
    Ok(())
}

fn run_verify(args: VerifyArgs, global: &GlobalOpts) -> Result<()> {
    if !verify_code(&args.code) {
        return Err(miette::miette!(
            help = "the code has 6 digits",
            "Código de verificación inválido"
        ));
    }
    if !global.quiet {
        println!("{} Cuenta verificada", style("✓").green());
    }
    Ok(())
}

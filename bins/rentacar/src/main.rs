//! Rentacar CLI
//!
//! Terminal front end for the car-rental backend: sign in, then manage the
//! fleet, brands, customers and rentals.

use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use rentacar_api_client::LOGIN_ROUTE;
use rentacar_cli::OutputFormat;
use rentacar_telemetry::{TelemetryConfig, Timer};
use std::path::PathBuf;
use std::process::ExitCode;

mod app;
mod commands;
mod settings;

use app::App;
use commands::brands::BrandsCommand;
use commands::cars::CarsCommand;
use commands::clients::ClientsCommand;
use commands::rentals::RentalsCommand;
use settings::Settings;

/// Manage a car-rental backend from the terminal
#[derive(Parser)]
#[command(name = "rentacar")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Settings file (defaults to ./rentacar.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session
    Login {
        /// Account e-mail
        email: String,

        /// Account password
        #[arg(long, env = "RENTACAR_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Close the session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Manage vehicles
    #[command(subcommand)]
    Cars(CarsCommand),

    /// Manage vehicle brands
    #[command(subcommand)]
    Brands(BrandsCommand),

    /// Manage customers
    #[command(subcommand)]
    Clients(ClientsCommand),

    /// Manage rentals
    #[command(subcommand)]
    Rentals(RentalsCommand),
}

impl Commands {
    /// Route the command stands for; sign-in must not redirect to itself
    fn route(&self) -> &'static str {
        match self {
            Self::Login { .. } => LOGIN_ROUTE,
            _ => "/",
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = Settings::load(cli.config.as_deref())?;

    let telemetry = TelemetryConfig::from_verbosity(cli.verbose).with_format(settings.log_format);
    if let Err(e) = rentacar_telemetry::init_with_config(telemetry) {
        eprintln!("{} {}", "Warning:".yellow(), e);
    }

    let app = App::new(&settings, cli.format, cli.command.route())?;
    let _timer = Timer::start("command");

    match cli.command {
        Commands::Login { email, password } => commands::auth::login(&app, &email, &password).await,
        Commands::Logout => commands::auth::logout(&app).await,
        Commands::Whoami => commands::auth::whoami(&app).await,
        Commands::Cars(command) => commands::cars::run(&app, command).await,
        Commands::Brands(command) => commands::brands::run(&app, command).await,
        Commands::Clients(command) => commands::clients::run(&app, command).await,
        Commands::Rentals(command) => commands::rentals::run(&app, command).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_rental_create() {
        let cli = Cli::try_parse_from([
            "rentacar", "-f", "json", "rentals", "create", "--client", "1", "--car", "2", "--start",
            "2025-06-01", "--end", "2025-06-03",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(cli.command, Commands::Rentals(RentalsCommand::Create { car: 2, .. })));
    }

    #[test]
    fn test_parse_rejects_bad_date() {
        let parsed = Cli::try_parse_from([
            "rentacar", "rentals", "create", "--client", "1", "--car", "2", "--start", "tomorrow",
            "--end", "2025-06-03",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_login_runs_on_login_route() {
        let login = Cli::try_parse_from(["rentacar", "login", "ana@example.com", "--password", "x"]).unwrap();
        assert_eq!(login.command.route(), LOGIN_ROUTE);

        let whoami = Cli::try_parse_from(["rentacar", "whoami"]).unwrap();
        assert_eq!(whoami.command.route(), "/");
    }
}

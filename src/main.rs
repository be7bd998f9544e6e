// Entrypoint for the orecast command line client.
// - Parses arguments, sets up logging and loads the configuration.
// - Builds one `ApiClient` and hands it to the selected command.
// - Every failure prints `ERROR <message>` and exits with status 1.

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use orecast_cli::api::ApiClient;
use orecast_cli::commands::{self, dbs::DbsCommand, meta::MetaCommand, s3::S3Command, site::SiteCommand};
use orecast_cli::config::OreConfig;
use orecast_cli::ui::{self, DialoguerTerminal};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// orecast command line client
#[derive(Parser, Debug)]
#[command(name = "orecast", version, propagate_version = true)]
struct Cli {
    /// Config file (default is $HOME/.orecast.yaml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase verbosity (-v: requests, -vv: response bodies)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Obtain an OreCast token and print it
    Token,
    /// OreCast site command
    #[command(subcommand)]
    Site(SiteCommand),
    /// OreCast meta command
    #[command(subcommand)]
    Meta(MetaCommand),
    /// OreCast data-bookkeeping system command
    #[command(subcommand)]
    Dbs(DbsCommand),
    /// OreCast s3 command
    #[command(subcommand)]
    S3(S3Command),
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("orecast_cli={level},orecast={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = OreConfig::load(cli.config.as_deref())?;
    let mut api = ApiClient::new(config, Box::new(DialoguerTerminal::new()))?;

    let outcomes = match cli.command {
        Commands::Token => {
            let token = commands::token::execute(&mut api)?;
            println!("{}", token);
            Vec::new()
        }
        Commands::Site(cmd) => commands::site::execute(&mut api, cmd)?,
        Commands::Meta(cmd) => commands::meta::execute(&mut api, cmd)?,
        Commands::Dbs(cmd) => {
            commands::dbs::execute(&api, cmd)?;
            Vec::new()
        }
        Commands::S3(cmd) => commands::s3::execute(&mut api, cmd)?,
    };
    for outcome in &outcomes {
        ui::report(outcome);
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        ui::report_error(&e);
        std::process::exit(1);
    }
}

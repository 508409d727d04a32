use anyhow::Result;
use apidex::core::log::init_logging;
use clap::{CommandFactory, Parser, Subcommand};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for apidex::AppCommand {
    fn from(cmd: Commands) -> apidex::AppCommand {
        match cmd {
            Commands::Convert { amount, from, to } => {
                apidex::AppCommand::Convert { amount, from, to }
            }
            Commands::Rates { base } => apidex::AppCommand::Rates { base },
            Commands::Countries { region, name } => apidex::AppCommand::Countries { region, name },
            Commands::Movies { title, page } => apidex::AppCommand::Movies { title, page },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Convert an amount between two currencies
    Convert {
        /// Amount in the source currency
        #[arg(allow_negative_numbers = true)]
        amount: f64,
        /// Source currency code, e.g. USD
        from: String,
        /// Target currency code; defaults to the configured home currency
        to: Option<String>,
    },
    /// Display all exchange rates for a base currency
    Rates {
        /// Base currency code, e.g. USD
        base: String,
    },
    /// Look up countries by region or name
    Countries {
        /// Filter by region, e.g. europe
        #[arg(long, conflicts_with = "name")]
        region: Option<String>,
        /// Search by country name
        #[arg(long)]
        name: Option<String>,
    },
    /// Search movies by title
    Movies {
        /// Title to search for
        title: String,
        /// Result page to display
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => apidex::cli::setup::setup(),
        Some(cmd) => apidex::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

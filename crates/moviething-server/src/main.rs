use clap::{ArgAction, Parser, Subcommand};
use color_eyre::eyre::eyre;
use movie_log_config::{Config, PathManager};
use std::path::PathBuf;

mod commands;
mod http;
mod logging;

#[derive(Parser)]
#[command(name = "moviething")]
#[command(about = "MovieThing - a personal movie viewing log")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to a TOML config file (defaults to <config dir>/moviething/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    #[command(long_about = "Connect to the movie log database and serve the listing, search, details, entry and Letterboxd export endpoints. Startup fails if any required setting is missing or the database is unreachable.")]
    Serve {
        /// Override the configured listen port
        #[arg(long)]
        port: Option<u16>,

        /// Also write logs to the default rotating log file when none is configured
        #[arg(long, action = ArgAction::SetTrue)]
        log_to_file: bool,
    },
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the merged configuration (masks sensitive data)
    #[command(long_about = "Display the configuration after defaults, the config file and environment variables are merged. Passwords and API keys are masked unless --full is given.")]
    Show {
        /// Show secrets unmasked
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())
        .map_err(|e| eyre!("Failed to load configuration: {}", e))?;

    match cli.command {
        Commands::Serve { port, log_to_file } => {
            let log_file = config
                .logging
                .file
                .clone()
                .or_else(|| log_to_file.then(|| PathManager::default().server_log_file()));
            logging::init_logging_with_file(cli.verbose, cli.quiet, log_file)
                .map_err(|e| eyre!("{}", e))?;
            commands::serve::run_serve(config, port).await
        }
        Commands::Config { cmd } => {
            logging::init_logging(cli.verbose, cli.quiet).map_err(|e| eyre!("{}", e))?;
            commands::config::run_config(cmd, &config)
        }
    }
}

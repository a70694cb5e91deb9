mod check_config_cmd;
mod lookup_cmd;
mod runtime;
mod scan_cmd;
mod serve_cmd;
mod stats_cmd;
mod terminal_output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "spamshot")]
#[command(about = "Spamshot: collects spam text screenshots and logs the numbers in them")]
#[command(version)]
struct Cli {
    /// Config file (default: $SPAMSHOT_CONFIG_DIR/config.yaml or ~/.spamshot/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the Telegram bot
    Serve,
    /// Read one screenshot from disk and print what was extracted
    Scan {
        image: PathBuf,
        /// Override the configured minimum token confidence
        #[arg(long)]
        min_confidence: Option<f32>,
    },
    /// Show reporting totals and the most reported numbers
    Stats {
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
    /// Show the reports filed against one number
    Lookup { number: String },
    /// Load, validate, and print the effective config
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = runtime::config_path(cli.config);
    let config = spamshot_config::load_and_prepare(&config_path).await?;

    match cli.command {
        Commands::Serve => {
            runtime::init_logging(&config, config.log_level())?;
            serve_cmd::run(config).await
        }
        Commands::Scan {
            image,
            min_confidence,
        } => {
            runtime::init_logging(&config, "warn")?;
            scan_cmd::run(&config, &image, min_confidence).await
        }
        Commands::Stats { limit } => stats_cmd::run(&config, limit),
        Commands::Lookup { number } => lookup_cmd::run(&config, &number),
        Commands::CheckConfig => check_config_cmd::run(&config_path, &config).await,
    }
}

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use colored::*;

use bulletin_cli::config::Config;

#[derive(Parser)]
#[command(name = "bulletin")]
#[command(about = "Sprint bulletin and roadmap backlog server")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Override the listen port
        #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
        port: Option<u16>,
    },
    /// Rebuild initiatives from the roadmap workbook
    Reseed,
    /// Replace the roadmap workbook and reseed
    Import {
        /// Path to an .xlsx workbook
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    bulletin_cli::init_tracing();

    let cli = Cli::parse();

    if let Err(e) = handle_command(cli.command).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

async fn handle_command(command: Commands) -> anyhow::Result<()> {
    let mut config = Config::from_env()?;

    match command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.port = port;
            }
            bulletin_cli::run_server(config).await
        }
        Commands::Reseed => {
            let total = bulletin_cli::reseed(&config).await?;
            println!("{} Reseeded {} initiatives", "✓".green(), total);
            Ok(())
        }
        Commands::Import { file } => {
            let total = bulletin_cli::import(&config, &file).await?;
            println!(
                "{} Imported {} initiatives from {}",
                "✓".green(),
                total,
                file.display()
            );
            Ok(())
        }
    }
}

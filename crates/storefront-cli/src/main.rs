//! Storefront CLI
//!
//! Administrative command-line interface for a storefront database

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use storefront_core::logging_facility::{self, Profile};
use storefront_store::{DbConfig, Storefront};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "storefront")]
#[command(about = "Storefront - inspect and migrate a storefront database", long_about = None)]
struct Cli {
    /// Database file (created and migrated on first use)
    #[arg(long, env = "STOREFRONT_DB", default_value = "storefront.db")]
    db: PathBuf,

    /// Logging profile: dev, prod or test
    #[arg(long, env = "STOREFRONT_LOG", default_value = "dev")]
    log: Profile,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending migrations and list the applied ones
    Migrate,
    /// List every entity of a kind
    List(commands::list::ListArgs),
    /// Describe one entity
    Show(commands::show::ShowArgs),
}

fn main() {
    let cli = Cli::parse();
    logging_facility::init(cli.log);

    let storefront = Storefront::new(DbConfig::file(&cli.db));
    let result = match cli.command {
        Commands::Migrate => commands::migrate::execute(&storefront),
        Commands::List(args) => commands::list::execute(&storefront, args),
        Commands::Show(args) => commands::show::execute(&storefront, args),
    };

    match result {
        Ok(output) => print!("{}", output),
        Err(e) => {
            tracing::error!(component = module_path!(), error = %e, "command failed");
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "cashcard-api")]
#[command(about = "Cash Card API - owner-scoped cash card records over HTTP")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve(commands::serve::ServeArgs),

    #[command(about = "Create the database schema, optionally loading sample cards")]
    Migrate(commands::migrate::MigrateArgs),

    #[command(about = "Print a bcrypt hash for use in CASHCARD_USERS")]
    HashPassword(commands::password::HashPasswordArgs),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        None => commands::serve::handle(commands::serve::ServeArgs::default()).await,
        Some(Commands::Serve(args)) => commands::serve::handle(args).await,
        Some(Commands::Migrate(args)) => commands::migrate::handle(args, output_format).await,
        Some(Commands::HashPassword(args)) => commands::password::handle(args, output_format),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::serve::StoreKind;

    #[test]
    fn parses_subcommands() {
        let cli = Cli::try_parse_from(["cashcard-api", "serve", "--store", "memory"]).unwrap();
        match cli.command {
            Some(Commands::Serve(args)) => assert_eq!(args.store, Some(StoreKind::Memory)),
            _ => panic!("expected serve"),
        }

        let cli = Cli::try_parse_from(["cashcard-api", "--json", "migrate", "--seed"]).unwrap();
        assert!(matches!(OutputFormat::from_cli(&cli), OutputFormat::Json));
        match cli.command {
            Some(Commands::Migrate(args)) => assert!(args.seed),
            _ => panic!("expected migrate"),
        }
    }

    #[test]
    fn defaults_to_serve() {
        let cli = Cli::try_parse_from(["cashcard-api"]).unwrap();
        assert!(cli.command.is_none());
    }
}

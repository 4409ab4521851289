use clap::Args;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config;
use crate::database::fixtures::sample_cash_cards;
use crate::database::DatabaseManager;

#[derive(Debug, Args)]
pub struct MigrateArgs {
    #[arg(long, help = "Also load the sample cash cards (ids 99-102)")]
    pub seed: bool,
}

pub async fn handle(args: MigrateArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(&config::config().database).await?;
    DatabaseManager::ensure_schema(&pool).await?;

    let seeded = if args.seed {
        DatabaseManager::seed(&pool, &sample_cash_cards()).await?
    } else {
        0
    };
    pool.close().await;

    output_success(&output_format, "Schema ready", Some(json!({ "seeded": seeded })))
}

use anyhow::Context;
use clap::Args;
use serde_json::json;

use crate::auth::hash_password;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config;

#[derive(Debug, Args)]
pub struct HashPasswordArgs {
    #[arg(help = "Plaintext password")]
    pub password: String,

    #[arg(long, help = "bcrypt cost (defaults to SECURITY_BCRYPT_COST)")]
    pub cost: Option<u32>,
}

pub fn handle(args: HashPasswordArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let cost = args.cost.unwrap_or(config::config().security.bcrypt_cost);
    let hash = hash_password(&args.password, cost).context("could not hash password")?;
    output_success(&output_format, "Password hashed", Some(json!({ "hash": hash })))
}

//! Look up a patient from the terminal.

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use rxboard_core::LookupService;

use crate::output;

#[derive(Args)]
pub struct PatientArgs {
    /// Patient identifier
    pub pid: String,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn execute(args: PatientArgs, redis_url: &str) -> Result<()> {
    let store = Arc::new(super::connect_store(redis_url).await?);
    let service = LookupService::new(store);
    let outcome = service.lookup(&args.pid).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output::outcome_json(&outcome))?);
    } else {
        output::print_lookup(&outcome);
    }
    Ok(())
}

//! Print the persisted payload.

use anyhow::Result;
use colored::Colorize;
use rxboard_core::store::PayloadStore;

pub async fn execute(redis_url: &str) -> Result<()> {
    let store = super::connect_store(redis_url).await?;
    match store.find_latest().await? {
        Some(payload) => println!("{}", serde_json::to_string_pretty(&payload)?),
        None => println!("{}", "No data has been published yet.".dimmed()),
    }
    Ok(())
}

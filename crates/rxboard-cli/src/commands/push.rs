//! Publish a payload to a running display server.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use rxboard_core::notifier::DisplayNotifier;

#[derive(Args)]
pub struct PushArgs {
    /// JSON file to publish, or `-` for stdin
    pub file: PathBuf,

    /// Display server URL
    #[arg(long, env = "RXBOARD_WEB_URL", default_value = "http://127.0.0.1:4000")]
    pub url: String,
}

pub async fn execute(args: PushArgs) -> Result<()> {
    let text = if args.file.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read payload from stdin")?;
        buf
    } else {
        std::fs::read_to_string(&args.file)
            .with_context(|| format!("Failed to read {}", args.file.display()))?
    };
    let payload: serde_json::Value =
        serde_json::from_str(&text).context("Payload is not valid JSON")?;

    let notifier = DisplayNotifier::with_url(&args.url);
    notifier.push(&payload).await?;

    println!("{} Published to {}", "✓".green(), notifier.base_url());
    Ok(())
}

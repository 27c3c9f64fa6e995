//! Patient lookup server command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use rxboard_core::LookupService;
use rxboard_web::config::DEFAULT_LOOKUP_PORT;
use rxboard_web::state::LookupState;
use rxboard_web::ServerConfig;

#[derive(Args)]
pub struct LookupArgs {
    /// Port to listen on
    #[arg(long, default_value_t = DEFAULT_LOOKUP_PORT)]
    pub port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Also write logs to a file
    #[arg(long)]
    pub log: bool,

    /// Log file path (used with --log)
    #[arg(long, default_value = "rxboard-lookup.log")]
    pub log_file: PathBuf,
}

pub async fn execute(args: LookupArgs, redis_url: &str) -> Result<()> {
    let store = Arc::new(super::connect_store(redis_url).await?);
    let state = LookupState::new(LookupService::new(store));

    println!();
    println!("  {} {}", "rxboard".cyan().bold(), "Patient Lookup".bold());
    println!();
    println!("  {}  http://{}:{}", "Lookup".green(), args.host, args.port);
    println!();
    println!("  {}", "Ctrl+C to stop".dimmed());
    println!();

    rxboard_web::run_lookup_server(state, ServerConfig::new(&args.host, args.port)).await?;

    Ok(())
}

//! CLI command definitions and handlers.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

pub mod latest;
pub mod lookup;
pub mod patient;
pub mod push;
pub mod serve;

/// Pharmacy display board
#[derive(Parser)]
#[command(name = "rxboard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Redis connection URL
    #[arg(long, global = true, env = "REDIS_URL", default_value = "redis://127.0.0.1:6379")]
    pub redis_url: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the display board server
    Serve(serve::ServeArgs),

    /// Run the patient lookup server
    Lookup(lookup::LookupArgs),

    /// Print the persisted payload
    Latest,

    /// Publish a payload to a running display server
    Push(push::PushArgs),

    /// Look up a patient and their family relationships
    Patient(patient::PatientArgs),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Serve(args) => serve::execute(args, &self.redis_url).await,
            Commands::Lookup(args) => lookup::execute(args, &self.redis_url).await,
            Commands::Latest => latest::execute(&self.redis_url).await,
            Commands::Push(args) => push::execute(args).await,
            Commands::Patient(args) => patient::execute(args, &self.redis_url).await,
        }
    }
}

/// Connect to Redis. The servers refuse to start without it.
pub async fn connect_store(redis_url: &str) -> Result<rxboard_core::store::RedisStore> {
    let pool = rxboard_redis::init_pool(redis_url)
        .await
        .with_context(|| format!("Failed to connect to Redis at {}", redis_url))?;
    Ok(rxboard_core::store::RedisStore::new(pool))
}

//! Display board server command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use rxboard_core::announce::Announcer;
use rxboard_core::Broadcaster;
use rxboard_web::config::DEFAULT_DISPLAY_PORT;
use rxboard_web::state::DisplayState;
use rxboard_web::ServerConfig;

#[derive(Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long, default_value_t = DEFAULT_DISPLAY_PORT)]
    pub port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Disable the floating alert area and its toggle
    #[arg(long)]
    pub no_floating_area: bool,

    /// Directory of static files served alongside the board
    #[arg(long)]
    pub public_dir: Option<PathBuf>,

    /// Text-to-speech command for /play-sound; the text is appended as the last argument
    #[arg(long, env = "RXBOARD_ANNOUNCE_COMMAND")]
    pub announce_command: Option<String>,

    /// Also write logs to a file
    #[arg(long)]
    pub log: bool,

    /// Log file path (used with --log)
    #[arg(long, default_value = "rxboard-serve.log")]
    pub log_file: PathBuf,
}

pub async fn execute(args: ServeArgs, redis_url: &str) -> Result<()> {
    let store = Arc::new(super::connect_store(redis_url).await?);

    let announcer = args
        .announce_command
        .as_deref()
        .map(Announcer::from_command_line)
        .transpose()?;

    let broadcaster = Arc::new(Broadcaster::new(store, !args.no_floating_area));
    let state = DisplayState::new(broadcaster, announcer);
    let config = ServerConfig::new(&args.host, args.port).with_public_dir(args.public_dir);

    println!();
    println!("  {} {}", "rxboard".cyan().bold(), "Display Server".bold());
    println!();
    println!("  {}      http://{}:{}", "Board".green(), args.host, args.port);
    println!("  {}  ws://{}:{}/ws", "WebSocket".green(), args.host, args.port);
    println!(
        "  {}    {}",
        "Floating".green(),
        if args.no_floating_area { "disabled" } else { "enabled" }
    );
    println!();
    println!("  {}", "Ctrl+C to stop".dimmed());
    println!();

    rxboard_web::run_display_server(state, config).await?;

    Ok(())
}

//! Member Count Bot - Main Entry Point
//!
//! A Telegram bot that polls a web page for a member count and keeps
//! a channel status message updated with the latest value.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use member_count_bot::bot::Bot;
use member_count_bot::config::{BotConfig, TelegramConfig};

/// Telegram bot for live member count updates.
#[derive(Parser, Debug)]
#[command(name = "member_count_bot")]
#[command(about = "Keep a Telegram channel message updated with a scraped member count")]
#[command(version)]
struct Args {
    /// Path to the JSON configuration file.
    #[arg(short, long, default_value = "config.json")]
    config: String,

    /// Path to the .env file for environment variables.
    #[arg(long, default_value = ".env")]
    env_file: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Generate an example configuration file and exit.
    #[arg(long)]
    generate_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level);

    // Handle example config generation
    if args.generate_config {
        return generate_example_config();
    }

    // Load environment variables
    if let Err(e) = dotenvy::from_filename(&args.env_file) {
        debug!("Could not load .env file ({}): {}", args.env_file, e);
    }

    // Load and validate configurations
    let config =
        BotConfig::load_from_file(&args.config).context("Failed to load configuration")?;
    config
        .validate()
        .context("Configuration validation failed")?;

    let telegram = TelegramConfig::from_env()
        .context("Failed to load Telegram API credentials from environment")?;

    info!(
        "Loaded configuration with {} metric source(s)",
        config.sources.len()
    );

    Bot::new(config, telegram).run().await
}

/// Initializes the logging subsystem.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Generates an example configuration file.
fn generate_example_config() -> Result<()> {
    let example = BotConfig::default();
    example.save_to_file("config.example.json")?;

    println!("✓ Example configuration written to: config.example.json");
    println!("\nTo use this bot:");
    println!("1. Copy config.example.json to config.json");
    println!("2. Fill in your bot token, channel and metric sources");
    println!("3. Create a .env file with TG_API_ID and TG_API_HASH");
    println!("4. Run: member_count_bot");

    Ok(())
}

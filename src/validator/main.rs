//! Standalone validator for bot configuration files.
//!
//! Checks a JSON configuration file for the member count bot and
//! reports every failing field at once, instead of stopping at the
//! first one the way bot startup does.

use std::process::ExitCode;

use clap::Parser;

use member_count_bot::config::{format_poll_rate, BotConfig};

/// Bot configuration validator.
#[derive(Parser, Debug)]
#[command(name = "validate_config")]
#[command(about = "Validates configuration files for the member count bot")]
#[command(version)]
struct Args {
    /// Path to the JSON configuration file to validate.
    #[arg(short, long, default_value = "config.json")]
    file: String,

    /// Generate an example configuration file at the specified path.
    #[arg(long)]
    generate_example: Option<String>,

    /// Show the configured metric sources.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Handle example generation
    if let Some(output_path) = args.generate_example {
        return generate_example(&output_path);
    }

    // Validate the configuration file
    validate_config(&args.file, args.verbose)
}

fn generate_example(output_path: &str) -> ExitCode {
    let example = BotConfig::default();

    match example.save_to_file(output_path) {
        Ok(()) => {
            println!("✓ Example configuration written to: {output_path}");
            println!("Fill in the placeholder token, channel and source URL before running the bot.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Failed to write example file: {e}");
            ExitCode::FAILURE
        }
    }
}

fn validate_config(path: &str, verbose: bool) -> ExitCode {
    println!("Validating: {path}\n");

    let config = match BotConfig::load_from_file(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("✗ Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    if verbose {
        for source in &config.sources {
            println!(
                "[{}] {} (selector: '{}')",
                source.label, source.url, source.css_selector
            );
        }
        println!();
    }

    let errors = config.validate_all();

    if errors.is_empty() {
        println!("✓ Configuration is valid!");
        println!(
            "  {} source(s), polled every {}",
            config.sources.len(),
            format_poll_rate(config.poll_rate)
        );
        ExitCode::SUCCESS
    } else {
        for error in &errors {
            println!("✗ {error}");
        }
        println!("\n✗ Validation failed: {} error(s)", errors.len());
        ExitCode::FAILURE
    }
}

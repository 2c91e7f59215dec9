pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "shipquote",
    about = "Shipquote operator CLI",
    long_about = "Price shipments offline against a rule snapshot and inspect effective configuration.",
    after_help = "Examples:\n  shipquote price --weight 12.5 --area \"Koh Samui\" --rules rules.json\n  shipquote config"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Price one shipment against a JSON rules file and print the breakdown")]
    Price {
        #[arg(long, help = "Shipment weight in kilograms")]
        weight: String,
        #[arg(long, help = "Destination area label")]
        area: String,
        #[arg(long, help = "Path to a JSON array of pricing rules")]
        rules: PathBuf,
        #[arg(long, help = "RFC 3339 timestamp to price at (defaults to now)")]
        at: Option<String>,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Price { weight, area, rules, at } => {
            commands::price::run(commands::price::PriceArgs { weight, area, rules, at })
        }
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use accessaid::cli::args::{Cli, Commands};
use accessaid::cli::commands;
use accessaid::config::Config;
use accessaid::error::AccessAidError;
use accessaid::logging;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(e.exit_code());
    }
}

fn run() -> Result<(), AccessAidError> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = Config::load()?;
    let format = cli.output.unwrap_or(config.general.default_output);

    let output = match cli.command {
        Commands::Sync(args) => commands::sync(&config, args.command, format)?,
        Commands::Voice(args) => commands::voice(&config.voice, args.command, format)?,
        Commands::Reminder(args) => commands::reminder(args.command, format)?,
        Commands::Completions { shell } => commands::completions(shell)?,
    };

    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}

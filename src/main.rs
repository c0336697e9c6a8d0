//! rusty-latte command-line tool.

use clap::Parser;
use rusty_latte::config::Settings;
use rusty_latte::logging;

mod cli;
mod commands;

use crate::cli::{Cli, Command};

fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    logging::init(logging::level_for(cli.verbose, cli.quiet));

    let settings = match Settings::load(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(error) => {
            eprintln!("error: {error}");
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Stats(args) => commands::run_stats(&args, &settings),
        Command::Compare(args) => commands::run_compare(&args),
        Command::Describe(args) => commands::run_describe(&args),
        Command::Top(args) => commands::run_top(&args, &settings),
        Command::Filter(args) => commands::run_filter(args),
        Command::FilterColumn(args) => commands::run_filter_column(&args),
        Command::VizTop(args) => commands::run_viz_top(&args, &settings),
        Command::VizMeans(args) => commands::run_viz_means(&args, &settings),
        Command::VizExtremes(args) => commands::run_viz_extremes(&args, &settings),
        Command::Summarize(args) => commands::run_summarize(&args, &settings),
        Command::Ask(args) => commands::run_ask(&args, &settings),
    };

    if let Err(error) = result {
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }
}

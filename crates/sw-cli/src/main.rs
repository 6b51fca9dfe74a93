//! Stepwise CLI - step-by-step database schema migrations

use anyhow::Result;
use clap::Parser;
use sw_core::Direction;

mod cli;
mod commands;
mod context;

use cli::Cli;
use commands::common::exit_code_for;
use commands::{history, init, list, migrate, version};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    if let Err(err) = run(&cli) {
        eprintln!("Error: {err:#}");
        std::process::exit(exit_code_for(&err));
    }
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        cli::Commands::Init => init::execute(&cli.global),
        cli::Commands::Up(args) => migrate::execute(
            &cli.global,
            Direction::Up,
            args.to.as_deref(),
            args.dry_run,
        ),
        cli::Commands::Down(args) => migrate::execute(
            &cli.global,
            Direction::Down,
            args.to.as_deref(),
            args.dry_run,
        ),
        cli::Commands::Version => version::execute(&cli.global),
        cli::Commands::List(args) => list::execute(args, &cli.global),
        cli::Commands::History(args) => history::execute(args, &cli.global),
    }
}

/// Log to stderr at info, or debug with `--verbose`. `RUST_LOG` wins when set.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

//! `kiln` binary entry point: parse arguments, set up logging, dispatch.

use std::process::ExitCode;

use clap::Parser;
use kiln_cli::{cli, commands, error, logger, ui};

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    let result = match args.command {
        cli::Command::Build(build_args) => commands::build::execute(build_args).await,
        cli::Command::Check(check_args) => commands::check::execute(check_args).await,
        cli::Command::Init(init_args) => commands::init::execute(init_args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error::report(err);
            ExitCode::FAILURE
        }
    }
}

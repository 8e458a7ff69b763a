mod commands;
mod config;
mod terminal;

use std::process::ExitCode;

use commands::{CommandLine, Commands, compile, scan};
use netry_common::config::ScanConfig;
use netry_common::scan::Outcome;
use terminal::{print, spinner};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let commands = CommandLine::parse_args();

    spinner::init_logging(commands.verbose, commands.quiet);

    match commands.command {
        Commands::Scan(args) => {
            print::header("starting scanner", commands.quiet);
            let cfg: ScanConfig = config::resolve(&args)?;
            let outcome: Outcome = scan::scan(&cfg, args.no_input, commands.quiet).await?;
            Ok(if outcome.is_complete() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Commands::Compile(args) => {
            print::header("compiling directives", commands.quiet);
            let cfg: ScanConfig = config::resolve(&args)?;
            compile::compile(&cfg, commands.quiet)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

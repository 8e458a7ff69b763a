pub mod compile;
pub mod scan;

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use netry_common::directive::ScanMode;

#[derive(Parser)]
#[command(name = "netry")]
#[command(version, about = "Shorthand front end for nmap with streaming results.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Less output (-q hides headers, -qq hides host details)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub quiet: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a scan and stream the hosts it finds
    #[command(alias = "s")]
    Scan(ScanArgs),
    /// Print the scanner command line without running it
    #[command(alias = "c")]
    Compile(ScanArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct ScanArgs {
    /// Targets: a | b | c (private networks), f:<file>, n:<spec> or r:<count>
    #[arg(short, long, env = "NETRY_TARGETS")]
    pub targets: Option<String>,

    /// Ports: t:<top count>, r:<start>-<end> or p:<ratio>
    #[arg(short, long, env = "NETRY_PORTS")]
    pub ports: Option<String>,

    /// Extra probes, comma separated: os, tr, v:<0-9>, s:<script>
    #[arg(short, long, env = "NETRY_INFO")]
    pub info: Option<String>,

    /// Scan preset: default, discover, full, os or traceroute
    #[arg(short, long, env = "NETRY_MODE")]
    pub mode: Option<ScanMode>,

    /// Give up after this many seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Scanner executable
    #[arg(long, value_name = "PATH")]
    pub scanner: Option<PathBuf>,

    /// Config file (defaults to ~/.netry.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Do not listen for 'q' on the terminal
    #[arg(long)]
    pub no_input: bool,

    /// Arguments handed to the scanner unchanged
    #[arg(last = true, value_name = "SCANNER ARGS")]
    pub passthrough: Vec<String>,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

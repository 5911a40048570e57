use std::path::PathBuf;

use crate::{
    Result,
    env::{self, TraceMode},
    group_options::{Executed, Project},
    logger,
    report::ReportFormatter,
    task::TaskState,
};
use clap::Parser;
use itertools::Itertools;

mod apply;
mod check;
mod config;
mod list;

#[derive(clap::Parser)]
#[clap(name = "fmtgate", version = env!("CARGO_PKG_VERSION"), about = env!("CARGO_PKG_DESCRIPTION"))]
struct Cli {
    /// Run as if started in this directory
    #[clap(short = 'C', long, global = true, value_name = "DIR")]
    cd: Option<PathBuf>,
    /// Path to the config file
    #[clap(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Enables verbose output
    #[clap(short, long, global = true, action = clap::ArgAction::Count, overrides_with = "quiet")]
    verbose: u8,
    /// Only print warnings and errors
    #[clap(short, long, global = true, overrides_with = "verbose")]
    quiet: bool,
    /// Enable tracing spans
    #[clap(long, global = true)]
    trace: bool,
    /// Output traces as JSON Lines (requires --trace)
    #[clap(long, global = true, requires = "trace")]
    json: bool,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    Apply(Box<apply::Apply>),
    Check(Box<check::Check>),
    Config(Box<config::Config>),
    List(Box<list::List>),
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();

    let trace_mode = match (args.trace, args.json) {
        (true, true) => TraceMode::Json,
        (true, false) => TraceMode::Text,
        _ => *env::FMTGATE_TRACE,
    };
    if trace_mode != TraceMode::Off {
        crate::trace::init_tracing(trace_mode == TraceMode::Json)?;
    } else {
        let level = match args.verbose {
            0 if args.quiet => Some(log::LevelFilter::Warn),
            0 => None,
            1 => Some(log::LevelFilter::Debug),
            _ => Some(log::LevelFilter::Trace),
        };
        logger::init(level);
    }

    // absolute so config discovery can walk above a relative -C
    let cwd = match args.cd {
        Some(dir) => std::path::absolute(dir)?,
        None => std::env::current_dir()?,
    };
    let project = Project {
        cwd,
        config_path: args.config,
    };
    match args.command {
        Commands::Apply(cmd) => cmd.run(&project).await,
        Commands::Check(cmd) => cmd.run(&project).await,
        Commands::Config(cmd) => cmd.run(&project),
        Commands::List(cmd) => cmd.run(&project),
    }
}

/// Prints each group's diagnostics to stderr and returns the run's state.
fn print_summary(executed: &Executed) -> TaskState {
    for record in executed.summary.records() {
        if let Some(report) = &record.report {
            let (text, _) = ReportFormatter.render(report);
            if !text.is_empty() {
                eprintln!("{text}");
            }
        }
        info!("{}: {}", record.name, record.state);
    }
    let counts = executed
        .summary
        .counts()
        .into_iter()
        .filter(|(_, n)| *n > 0)
        .map(|(state, n)| format!("{n} {state}"))
        .join(", ");
    debug!("tasks: {counts}");
    executed.summary.state
}

fn exit_for(state: TaskState) {
    if state == TaskState::Failed {
        std::process::exit(1);
    }
}

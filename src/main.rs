use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tidywatch::{Reporter, WatchPlan, daemon};

/// Keep directories continuously organized.
#[derive(Debug, Parser)]
#[command(name = "tidywatch", version, about)]
struct Cli {
    /// Watch-list file: one "<path> file_type" or "<path> date [<year>]"
    /// command per line.
    watch_list: PathBuf,

    /// Sort every configured directory once and exit instead of watching.
    #[arg(long)]
    once: bool,

    /// Suppress everything except errors.
    #[arg(long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let reporter = if cli.quiet {
        Reporter::silent()
    } else {
        Reporter::new()
    };

    let plan = match WatchPlan::load(&cli.watch_list) {
        Ok(plan) => plan,
        Err(e) => {
            reporter.error(&format!("invalid watch list: {}", e));
            return ExitCode::FAILURE;
        }
    };

    let result = if cli.once {
        daemon::run_once(&plan, &reporter)
    } else {
        daemon::run(&plan, &reporter)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            reporter.error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

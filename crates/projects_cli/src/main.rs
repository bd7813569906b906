//! Interactive project planner.
//!
//! # Responsibility
//! - Parse process configuration (database path, logging).
//! - Wire the SQLite repository into the service and run the menu on stdio.

mod menu;

use clap::Parser;
use log::info;
use menu::Menu;
use projects_core::{
    core_version, default_log_level, init_logging, ProjectService, SqliteConnectionProvider,
    SqliteProjectRepository,
};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "projects", version, about = "Plan DIY projects stored in SQLite")]
struct Args {
    /// SQLite database file; created and migrated on first use.
    #[arg(long, env = "PROJECTS_DB", default_value = "projects.sqlite3")]
    db: PathBuf,

    /// trace|debug|info|warn|error. Defaults to debug in debug builds.
    #[arg(long, env = "PROJECTS_LOG_LEVEL")]
    log_level: Option<String>,

    /// Directory for rolling log files. Logging is off when omitted.
    #[arg(long, env = "PROJECTS_LOG_DIR")]
    log_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Some(log_dir) = &args.log_dir {
        let level = args.log_level.as_deref().unwrap_or(default_log_level());
        let log_dir = std::path::absolute(log_dir).unwrap_or_else(|_| log_dir.clone());
        if let Err(err) = init_logging(level, &log_dir.to_string_lossy()) {
            eprintln!("warning: logging disabled: {err}");
        }
    }
    info!(
        "event=cli_start module=cli status=ok version={}",
        core_version()
    );

    let provider = SqliteConnectionProvider::new(&args.db);
    let repo = match SqliteProjectRepository::try_new(provider) {
        Ok(repo) => repo,
        Err(err) => {
            eprintln!("error: cannot open `{}`: {err}", args.db.display());
            return ExitCode::FAILURE;
        }
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut menu = Menu::new(ProjectService::new(repo), stdin.lock(), stdout.lock());
    match menu.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

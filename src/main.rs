// src/main.rs
//
// Binary entry point: argument parsing, logging setup, and session bootstrap
// over the simulated driver.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use canconsole::{logging, ConsoleConfig, Session, SessionExit, SimCanDriver};

#[derive(Parser)]
#[command(
    name = "canconsole",
    version,
    about = "Interactive session console for multi-device CAN interface hardware."
)]
struct Args {
    /// Path to a TOML config file (all keys optional).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Append session diagnostics to this file. They always go to stderr;
    /// this additionally tees them.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Number of simulated devices to present (overrides the config file).
    #[arg(long)]
    sim_devices: Option<usize>,
}

fn run(args: Args) -> Result<SessionExit, String> {
    if let Some(path) = &args.log_file {
        logging::start_session_log(path)?;
    }

    let mut config = match &args.config {
        Some(path) => ConsoleConfig::load(path)?,
        None => ConsoleConfig::default(),
    };
    if let Some(n) = args.sim_devices {
        config.sim_devices = n;
    }

    let driver = SimCanDriver::with_devices(config.sim_devices);
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut session = Session::new(driver, config, stdin.lock(), stdout.lock());
    let exit = session
        .run()
        .map_err(|e| format!("Session I/O error: {}", e));
    logging::stop_session_log();
    exit
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(SessionExit::Clean) => ExitCode::SUCCESS,
        Ok(SessionExit::UnexpectedInput) => ExitCode::from(1),
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::from(2)
        }
    }
}

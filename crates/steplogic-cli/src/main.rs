//! StepLogic CLI entry point.
//!
//! Exits with [`steplogic_cli::EXIT_FAILURE`] when the input, configuration
//! or report cannot be handled and with [`steplogic_cli::EXIT_REJECTED`]
//! when `--strict` finds errors in the program.

use std::{process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info};

use steplogic_cli::{
    Args, EXIT_REJECTED, exit_code,
    error_adapter::{render_reportables, to_reportables},
};

fn main() {
    // Install miette's pretty panic hook early for better panic reports
    miette::set_panic_hook();

    let args = Args::parse();
    init_logger(&args.log_level);

    info!(input = args.input, strict = args.strict; "Starting StepLogic");
    debug!(args:?; "Parsed arguments");

    if let Err(err) = steplogic_cli::run(&args) {
        let reports = render_reportables(&to_reportables(&err));
        for report in &reports {
            error!("{report}");
        }

        let code = exit_code(&err);
        if code == EXIT_REJECTED {
            error!(errors = reports.len(); "Program rejected in strict mode");
        }
        process::exit(code);
    }

    info!(input = args.input; "Completed successfully");
}

/// Initialize env_logger, falling back to `warn` for an unknown level name.
fn init_logger(level: &str) {
    let log_level = LevelFilter::from_str(level).unwrap_or_else(|_| {
        eprintln!("Invalid log level: {level}. Using 'warn' instead.");
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();
}

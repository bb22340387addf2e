//! pycheckers CLI binary entry point.
//! Resolves options, runs the requested checkers and prints their findings.

use clap::Parser;
use pycheckers::cli::Cli;
use pycheckers::config::{apply_config_cascade, Options};
use pycheckers::error::{Error, Result};
use pycheckers::exec::{ExecContext, SystemExecutor};
use pycheckers::project::{expand_home, guess_virtualenv};
use pycheckers::{orchestrate, output};
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> ExitCode {
    // stdout belongs to the diagnostics
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{}", e.to_diagnostic_line(&cli.file.to_string_lossy()));
            ExitCode::FAILURE
        }
    }
}

/// Returns the number of diagnostics printed.
fn run(cli: &Cli) -> Result<usize> {
    if !cli.file.exists() {
        return Err(Error::MissingSource(cli.file.clone()));
    }
    let mut options = cli.to_options();
    let applied = apply_config_cascade(&mut options, &cli.file)?;
    debug!(?applied, "config files applied");

    let exec = search_context(&options, &cli.file);
    let report = orchestrate::run_checkers(
        &options.checkers(),
        &cli.file,
        &options,
        &SystemExecutor,
        &exec,
    )?;
    output::print_report(&report, cli.output.as_deref().unwrap_or("human"));
    Ok(report.total())
}

/// The process search path with the file's virtualenv in front: the
/// explicit `venv_path`, else a virtualenvwrapper environment named after
/// a directory on the file's path.
fn search_context(options: &Options, file: &Path) -> ExecContext {
    let exec = ExecContext::from_process_env();
    let venv = options
        .venv_path()
        .map(|p| expand_home(&p.to_string_lossy()))
        .or_else(|| {
            guess_virtualenv(file, &expand_home(&options.venv_root())).map(|(_, venv)| venv)
        });
    match venv {
        Some(venv) => {
            info!(venv = %venv.display(), "using virtualenv");
            exec.with_prepended(venv.join("bin"))
        }
        None => exec,
    }
}

//! Run the requested checkers on one file and collect their outcomes.
//!
//! Every checker is validated and configured before the first subprocess
//! starts, so an unknown name or a missing config file aborts the whole
//! run. Outcomes are returned in request order in both execution modes.

use crate::checkers::{validate_checkers, Checker, CheckerConfig, RunEnv, Runner};
use crate::config::Options;
use crate::error::Result;
use crate::exec::{ExecContext, Executor};
use crate::models::{Report, RunOutcome};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::path::Path;
use tracing::{info, warn};

pub fn run_checkers(
    names: &[String],
    filepath: &Path,
    options: &Options,
    executor: &dyn Executor,
    exec: &ExecContext,
) -> Result<Report> {
    let prepared = validate_checkers(names)?
        .into_iter()
        .map(|checker| {
            let config = CheckerConfig::resolve(checker.as_ref(), options)?;
            Ok((checker, config))
        })
        .collect::<Result<Vec<_>>>()?;

    let run_one = |(checker, config): (Box<dyn Checker>, CheckerConfig)| -> RunOutcome {
        let env = RunEnv::new(config, options, executor, exec);
        Runner::new(checker, env).run(filepath)
    };

    let runs: Vec<RunOutcome> = if options.multi_thread() {
        let threads = num_cpus::get() + 1;
        match ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => {
                info!(threads, checkers = prepared.len(), "running checkers in parallel");
                pool.install(|| prepared.into_par_iter().map(run_one).collect())
            }
            Err(e) => {
                warn!(error = %e, "thread pool unavailable, running sequentially");
                prepared.into_iter().map(run_one).collect()
            }
        }
    } else {
        info!(checkers = prepared.len(), "running checkers sequentially");
        prepared.into_iter().map(run_one).collect()
    };

    Ok(Report { runs })
}

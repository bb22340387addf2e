//! pycheckers core library.
//!
//! Runs several external Python checkers on one file and normalizes their
//! output into flycheck-style diagnostic lines.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Options, defaults and the `.pycheckers` config cascade.
//! - `project`: VCS root, branch and virtualenv discovery.
//! - `exec`: Subprocess execution behind an explicit search path.
//! - `checkers`: The checker trait, the concrete checkers and the run contract.
//! - `orchestrate`: Parallel or sequential execution of the requested checkers.
//! - `models`: Diagnostics, per-checker outcomes and the report.
//! - `output`: Human/JSON printers.
pub mod checkers;
pub mod cli;
pub mod config;
pub mod error;
pub mod exec;
pub mod models;
pub mod orchestrate;
pub mod output;
pub mod project;
pub mod version;

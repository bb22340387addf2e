//! End-to-end runs of the binary against fake checker scripts.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("bin")).unwrap();
        fs::create_dir_all(dir.path().join("home")).unwrap();
        fs::create_dir_all(dir.path().join("proj")).unwrap();
        Self { dir }
    }

    /// Install an executable shell script named `name` on the fake PATH.
    fn tool(&self, name: &str, body: &str) -> &Self {
        let path = self.dir.path().join("bin").join(name);
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        self
    }

    fn source(&self, name: &str) -> PathBuf {
        let path = self.dir.path().join("proj").join(name);
        fs::write(&path, "import os\n").unwrap();
        path
    }

    fn write(&self, relative: &str, text: &str) {
        fs::write(self.dir.path().join(relative), text).unwrap();
    }

    fn run(&self, args: &[&str], file: &Path) -> Output {
        Command::new(env!("CARGO_BIN_EXE_pycheckers"))
            .args(args)
            .arg(file)
            .env("PATH", self.dir.path().join("bin"))
            .env("HOME", self.dir.path().join("home"))
            .env_remove("RUST_LOG")
            .output()
            .unwrap()
    }
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

const ECHO_LAST: &str = "for last; do :; done";

#[test]
fn findings_are_printed_and_exit_nonzero() {
    let sb = Sandbox::new();
    sb.tool(
        "pep8",
        &format!(
            "{}\necho \"$last:3:80: E501 line too long (88 > 79 characters)\"\nexit 1",
            ECHO_LAST
        ),
    );
    let file = sb.source("app.py");
    let out = sb.run(&["-c", "pep8"], &file);
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(
        stdout(&out),
        format!(
            "WARNING E501:pep8: line too long (88 > 79 characters) at {} line 3,80.\n",
            file.display()
        )
    );
}

#[test]
fn clean_run_exits_zero() {
    let sb = Sandbox::new();
    sb.tool("pyflakes", "exit 0");
    let file = sb.source("app.py");
    let out = sb.run(&["-c", "pyflakes"], &file);
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(stdout(&out), "");
}

#[test]
fn missing_checker_is_reported_inline() {
    let sb = Sandbox::new();
    let file = sb.source("app.py");
    let out = sb.run(&["-c", "pylint", "--multi-thread", "no"], &file);
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(
        stdout(&out),
        format!(
            "ERROR :pylint: Checker not found on PATH, unable to check at {} line 1.\n",
            file.display()
        )
    );
}

#[test]
fn unknown_checker_is_fatal() {
    let sb = Sandbox::new();
    sb.tool("pyflakes", "echo should-not-run; exit 0");
    let file = sb.source("app.py");
    let out = sb.run(&["-c", "pyflakes,nope"], &file);
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(stdout(&out), "");
    assert!(stderr(&out).contains(&format!(
        "ERROR :pycheckers:Unknown checker nope. Expected one of pyflakes, flake8, pep8, pylint, mypy2, mypy3, bandit at {} line 1.",
        file.display()
    )));
}

#[test]
fn missing_source_is_fatal() {
    let sb = Sandbox::new();
    let file = sb.dir.path().join("proj").join("gone.py");
    let out = sb.run(&["-c", "pyflakes"], &file);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("ERROR :pycheckers:Can't find source file"));
}

#[test]
fn config_file_overrides_cli() {
    let sb = Sandbox::new();
    sb.tool(
        "pep8",
        &format!("{}\necho \"$last:1:1: X100 args $*\"", ECHO_LAST),
    );
    sb.write(
        "proj/.pycheckers",
        "[DEFAULT]\ncheckers = pep8\nmax_line_length = 100\n",
    );
    let file = sb.source("app.py");
    let out = sb.run(&["-c", "pylint", "--max-line-length", "90"], &file);
    let text = stdout(&out);
    assert!(text.starts_with("WARNING X100:pep8: args --repeat --max-line-length 100 "));
    assert_eq!(text.lines().count(), 1);
}

#[test]
fn json_output_groups_by_checker() {
    let sb = Sandbox::new();
    sb.tool(
        "pep8",
        &format!("{}\necho \"$last:2:1: W291 trailing whitespace\"", ECHO_LAST),
    );
    sb.tool("pyflakes", "exit 0");
    let file = sb.source("app.py");
    let out = sb.run(&["-c", "pyflakes,pep8", "--output", "json"], &file);
    let value: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(value["runs"][0]["checker"], "pyflakes");
    assert_eq!(value["runs"][0]["count"], 0);
    assert_eq!(value["runs"][1]["diagnostics"][0]["error_number"], "W291");
    assert_eq!(value["summary"]["warnings"], 1);
}

//! Run the external keyword-driven test runner with project defaults.
//!
//! Thin shim over the `robot` CLI: fills in `--outputdir report` and the
//! default suite `robot/bank_suite.robot` unless the caller supplied their
//! own, then hands over. Build: `cargo build --bin run-robot`.

use std::process::{exit, Command};

const DEFAULT_OUTPUT_DIR: &str = "report";
const DEFAULT_SUITE: &str = "robot/bank_suite.robot";

/// Apply the runner argument defaults.
///
/// `--outputdir report` is prepended unless an outputdir is already present
/// (either `--outputdir x` or `--outputdir=x`); the default suite is
/// appended unless some argument already names a `.robot`/`.robot.txt`
/// suite file.
fn default_args(args: Vec<String>) -> Vec<String> {
    let mut args = args;

    let has_output_dir = args
        .iter()
        .any(|a| a == "--outputdir" || a.starts_with("--outputdir="));
    if !has_output_dir {
        let mut with_defaults =
            vec!["--outputdir".to_string(), DEFAULT_OUTPUT_DIR.to_string()];
        with_defaults.append(&mut args);
        args = with_defaults;
    }

    let has_suite = args
        .iter()
        .any(|a| a.ends_with(".robot") || a.ends_with(".robot.txt"));
    if !has_suite {
        args.push(DEFAULT_SUITE.to_string());
    }

    args
}

fn main() {
    let _guard = bank_lib::init_logging();

    let args = default_args(std::env::args().skip(1).collect());
    tracing::info!("Delegating to robot with args: {:?}", args);

    match Command::new("robot").args(&args).status() {
        Ok(status) => exit(status.code().unwrap_or(1)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            eprintln!(
                "Robot Framework not found. Install: pip install robotframework (detail: {e})"
            );
            exit(1);
        }
        Err(e) => {
            eprintln!("Failed to run robot: {e}");
            exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_args_gets_both_defaults() {
        assert_eq!(
            default_args(vec![]),
            args(&["--outputdir", "report", "robot/bank_suite.robot"])
        );
    }

    #[test]
    fn test_explicit_outputdir_is_kept() {
        assert_eq!(
            default_args(args(&["--outputdir", "out"])),
            args(&["--outputdir", "out", "robot/bank_suite.robot"])
        );
        assert_eq!(
            default_args(args(&["--outputdir=out"])),
            args(&["--outputdir=out", "robot/bank_suite.robot"])
        );
    }

    #[test]
    fn test_explicit_suite_suppresses_default_suite() {
        assert_eq!(
            default_args(args(&["suites/smoke.robot"])),
            args(&["--outputdir", "report", "suites/smoke.robot"])
        );
        assert_eq!(
            default_args(args(&["suites/smoke.robot.txt"])),
            args(&["--outputdir", "report", "suites/smoke.robot.txt"])
        );
    }

    #[test]
    fn test_other_flags_pass_through_after_outputdir_default() {
        assert_eq!(
            default_args(args(&["--loglevel", "DEBUG"])),
            args(&[
                "--outputdir",
                "report",
                "--loglevel",
                "DEBUG",
                "robot/bank_suite.robot"
            ])
        );
    }
}

//! Integration tests for CLI argument handling
//!
//! Tests the subcommand surface against the built binary.

use std::process::Command;

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_lookout"))
        .args(args)
        .output()
        .expect("Failed to execute lookout")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(
        output.status.success(),
        "Expected --help to exit successfully"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("lookout"), "Help should mention lookout");
    assert!(stdout.contains("geo"), "Help should list the geo command");
    assert!(
        stdout.contains("weather"),
        "Help should list the weather command"
    );
    assert!(
        stdout.contains("market"),
        "Help should list the market command"
    );
}

#[test]
fn test_missing_subcommand_fails() {
    let output = run_cli(&[]);
    assert!(
        !output.status.success(),
        "Expected bare invocation to fail with usage"
    );
}

#[test]
fn test_unknown_subcommand_fails() {
    let output = run_cli(&["tides"]);
    assert!(!output.status.success(), "Expected unknown subcommand to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("tides") || stderr.contains("unrecognized"),
        "Should print error message about the unknown subcommand: {}",
        stderr
    );
}

#[test]
fn test_geo_help_mentions_ip_argument() {
    let output = run_cli(&["geo", "--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("IP"), "geo help should describe the IP argument");
}

#[cfg(test)]
mod unit_tests {
    //! Unit tests for CLI parsing that don't require running the binary

    use clap::Parser;
    use lookout::cli::{Cli, Command};

    #[test]
    fn test_cli_parse_weather_defaults_location_to_none() {
        let cli = Cli::parse_from(["lookout", "weather"]);
        match cli.command {
            Command::Weather { location } => assert!(location.is_none()),
            other => panic!("Expected weather command, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_all_without_flags() {
        let cli = Cli::parse_from(["lookout", "all"]);
        match cli.command {
            Command::All { ip, location } => {
                assert!(ip.is_none());
                assert!(location.is_none());
            }
            other => panic!("Expected all command, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_cache_file_before_subcommand() {
        let cli = Cli::parse_from(["lookout", "--cache-file", "/tmp/c.json", "geo"]);
        assert!(cli.cache_file.is_some());
    }
}

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use std::path::PathBuf;

#[test]
fn cli_parse_watch_defaults() {
    match parse(&["reqwatch", "watch"]) {
        CliCommand::Watch { input, tabs } => {
            assert!(input.is_none());
            assert!(tabs.is_none());
        }
        _ => panic!("expected Watch"),
    }
}

#[test]
fn cli_parse_watch_with_files() {
    match parse(&["reqwatch", "watch", "--input", "events.jsonl", "--tabs", "tabs.json"]) {
        CliCommand::Watch { input, tabs } => {
            assert_eq!(input, Some(PathBuf::from("events.jsonl")));
            assert_eq!(tabs, Some(PathBuf::from("tabs.json")));
        }
        _ => panic!("expected Watch with files"),
    }
}

#[test]
fn cli_parse_check_headers_repeat() {
    match parse(&[
        "reqwatch",
        "check",
        "https://cdn.example.com/a.bin",
        "--header",
        "Content-Type: video/mp4",
        "-H",
        "Content-Length: 10",
    ]) {
        CliCommand::Check {
            url,
            method,
            headers,
        } => {
            assert_eq!(url, "https://cdn.example.com/a.bin");
            assert_eq!(method, "GET");
            assert_eq!(headers, vec!["Content-Type: video/mp4", "Content-Length: 10"]);
        }
        _ => panic!("expected Check"),
    }
}

#[test]
fn cli_parse_check_method() {
    match parse(&["reqwatch", "check", "https://a.example/x", "--method", "POST"]) {
        CliCommand::Check { method, headers, .. } => {
            assert_eq!(method, "POST");
            assert!(headers.is_empty());
        }
        _ => panic!("expected Check with --method"),
    }
}

#[test]
fn cli_parse_check_requires_url() {
    assert!(Cli::try_parse_from(["reqwatch", "check"]).is_err());
}

#[test]
fn cli_parse_global_config() {
    let cli = Cli::try_parse_from(["reqwatch", "config-path", "--config", "/tmp/rw.toml"]).unwrap();
    assert_eq!(cli.config, Some(PathBuf::from("/tmp/rw.toml")));
    assert!(matches!(cli.command, CliCommand::ConfigPath));
}

#[test]
fn cli_parse_completions() {
    match parse(&["reqwatch", "completions", "bash"]) {
        CliCommand::Completions { shell } => assert_eq!(shell, clap_complete::Shell::Bash),
        _ => panic!("expected Completions"),
    }
}

//! Tests for `srcfetch ensure`.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use std::path::PathBuf;

#[test]
fn cli_parse_ensure_defaults() {
    match parse(&["srcfetch", "ensure", "a.tar.gz", "http://x/a.tar.gz"]) {
        CliCommand::Ensure {
            name,
            url,
            ensure,
            checksum,
            digest_url,
            digest_string,
            digest_type,
            timeout,
            src_target,
            allow_insecure,
            follow_redirects,
        } => {
            assert_eq!(name, "a.tar.gz");
            assert_eq!(url, "http://x/a.tar.gz");
            assert_eq!(ensure, "present");
            assert!(checksum.is_none());
            assert!(digest_url.is_none());
            assert!(digest_string.is_none());
            assert!(digest_type.is_none());
            assert!(timeout.is_none());
            assert!(src_target.is_none());
            assert!(allow_insecure.is_none());
            assert!(follow_redirects.is_none());
        }
        _ => panic!("expected Ensure"),
    }
}

#[test]
fn cli_parse_ensure_all_flags() {
    match parse(&[
        "srcfetch",
        "ensure",
        "a.zip",
        "https://x/a.zip",
        "--ensure",
        "absent",
        "--checksum",
        "false",
        "--digest-url",
        "https://x/SHA256SUMS",
        "--digest-string",
        "abc",
        "--digest-type",
        "sha256",
        "--timeout",
        "30",
        "--src-target",
        "/opt/src",
        "--allow-insecure",
        "--follow-redirects",
    ]) {
        CliCommand::Ensure {
            ensure,
            checksum,
            digest_url,
            digest_string,
            digest_type,
            timeout,
            src_target,
            allow_insecure,
            follow_redirects,
            ..
        } => {
            assert_eq!(ensure, "absent");
            assert_eq!(checksum, Some(false));
            assert_eq!(digest_url.as_deref(), Some("https://x/SHA256SUMS"));
            assert_eq!(digest_string.as_deref(), Some("abc"));
            assert_eq!(digest_type.as_deref(), Some("sha256"));
            assert_eq!(timeout, Some(30));
            assert_eq!(src_target, Some(PathBuf::from("/opt/src")));
            assert_eq!(allow_insecure, Some(true));
            assert_eq!(follow_redirects, Some(true));
        }
        _ => panic!("expected Ensure"),
    }
}

#[test]
fn cli_parse_ensure_requires_url() {
    assert!(Cli::try_parse_from(["srcfetch", "ensure", "a.tar.gz"]).is_err());
}

#[test]
fn cli_parse_ensure_rejects_non_bool_checksum() {
    assert!(Cli::try_parse_from([
        "srcfetch",
        "ensure",
        "a",
        "http://x/a",
        "--checksum",
        "maybe"
    ])
    .is_err());
}

#[test]
fn cli_parse_ensure_switches_can_be_turned_off() {
    match parse(&[
        "srcfetch",
        "ensure",
        "a",
        "http://x/a",
        "--allow-insecure=false",
        "--follow-redirects=false",
    ]) {
        CliCommand::Ensure {
            allow_insecure,
            follow_redirects,
            ..
        } => {
            assert_eq!(allow_insecure, Some(false));
            assert_eq!(follow_redirects, Some(false));
        }
        _ => panic!("expected Ensure"),
    }
}

#[test]
fn cli_parse_ensure_switch_before_positionals() {
    match parse(&[
        "srcfetch",
        "ensure",
        "--follow-redirects",
        "a",
        "http://x/a",
    ]) {
        CliCommand::Ensure {
            name,
            follow_redirects,
            ..
        } => {
            assert_eq!(name, "a");
            assert_eq!(follow_redirects, Some(true));
        }
        _ => panic!("expected Ensure"),
    }
}
